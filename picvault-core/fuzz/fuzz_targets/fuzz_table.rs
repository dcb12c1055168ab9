#![no_main]

//! Fuzz target for record table parsing
//!
//! Writes arbitrary bytes as the table file and loads it. Malformed rows must
//! surface as errors; anything that does load must survive a rewrite.
//!
//! Run with: cargo +nightly fuzz run fuzz_table

use libfuzzer_sys::fuzz_target;
use picvault_core::{CsvTable, RecordTable};

fuzz_target!(|data: &[u8]| {
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let path = dir.path().join("data.csv");
    if std::fs::write(&path, data).is_err() {
        return;
    }

    let table = CsvTable::new(&path);
    if let Ok(records) = table.read_table() {
        table.write_table(&records).expect("loaded records must be writable");
        let reread = table.read_table().expect("rewritten table must load");
        assert_eq!(reread.len(), records.len());
    }
});
