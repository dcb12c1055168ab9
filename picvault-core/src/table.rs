//! Tabular persistence of records.
//!
//! The on-disk table is CSV with a fixed header of the seven record columns.
//! Every value is text: the ciphertext is base64 (standard alphabet), the UUID
//! is hyphenated, access is `public`/`private`.
//!
//! Writes never touch the live file in place. The whole table is written to a
//! temporary file in the same directory and renamed over the old one, so a
//! crash mid-write leaves the previous table intact.

use std::cell::{Cell, RefCell};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, VaultError};
use crate::record::{AccessCredential, Record, TagList};

/// Column names, in on-disk order.
pub const COLUMNS: [&str; 7] = [
    "image_name",
    "image_code",
    "image_keywords",
    "image_features",
    "image_access",
    "user_pass",
    "unique_uuid",
];

/// Read/write access to the persisted record table.
pub trait RecordTable {
    /// Return every stored record in table order. An absent table is empty, not an error.
    fn read_table(&self) -> Result<Vec<Record>>;

    /// Replace the stored table wholesale.
    fn write_table(&self, records: &[Record]) -> Result<()>;
}

/// Text form of one record, field for field.
#[derive(Debug, Serialize, Deserialize)]
struct TableRow {
    image_name: String,
    image_code: String,
    image_keywords: String,
    image_features: String,
    image_access: String,
    user_pass: String,
    unique_uuid: String,
}

impl From<&Record> for TableRow {
    fn from(record: &Record) -> Self {
        Self {
            image_name: record.image_name.clone(),
            image_code: BASE64.encode(&record.image_code),
            image_keywords: record.image_keywords.to_field(),
            image_features: record.image_features.to_field(),
            image_access: record.image_access.as_str().to_string(),
            user_pass: record.user_pass.to_field(),
            unique_uuid: record.unique_uuid.hyphenated().to_string(),
        }
    }
}

impl TableRow {
    /// Convert back into a record. `line` is used only for error context.
    fn into_record(self, line: u64) -> Result<Record> {
        let context = |column: &str| format!("table line {line}, column {column}");

        let image_code = BASE64
            .decode(self.image_code.as_bytes())
            .map_err(|e| VaultError::format(context("image_code"), e))?;
        let image_access = self
            .image_access
            .parse()
            .map_err(|e| VaultError::format(context("image_access"), e))?;
        let user_pass = AccessCredential::from_field(&self.user_pass)
            .map_err(|e| VaultError::format(context("user_pass"), e))?;
        let unique_uuid = Uuid::parse_str(&self.unique_uuid)
            .map_err(|e| VaultError::format(context("unique_uuid"), e))?;

        Ok(Record {
            image_name: self.image_name,
            image_code,
            image_keywords: TagList::from_field(&self.image_keywords),
            image_features: TagList::from_field(&self.image_features),
            image_access,
            user_pass,
            unique_uuid,
        })
    }
}

/// CSV file implementation of [`RecordTable`].
#[derive(Debug, Clone)]
pub struct CsvTable {
    location: PathBuf,
}

impl CsvTable {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    fn parent_dir(&self) -> PathBuf {
        match self.location.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl RecordTable for CsvTable {
    fn read_table(&self) -> Result<Vec<Record>> {
        let file = match File::open(&self.location) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.location.display(), "No record table yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(VaultError::io(&self.location, e)),
        };

        let mut reader = csv::Reader::from_reader(file);
        let headers = reader
            .headers()
            .map_err(|e| VaultError::format("table header", e))?;
        if headers.is_empty() {
            debug!(path = %self.location.display(), "Record table is blank, starting empty");
            return Ok(Vec::new());
        }
        if !headers.iter().eq(COLUMNS.iter().copied()) {
            let found: Vec<&str> = headers.iter().collect();
            return Err(VaultError::format(
                "table header",
                format!("expected {}, found {}", COLUMNS.join(","), found.join(",")),
            ));
        }

        let headers = headers.clone();
        let mut raw = csv::StringRecord::new();
        let mut records = Vec::new();
        loop {
            let more = reader.read_record(&mut raw).map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                VaultError::format(format!("table line {line}"), e)
            })?;
            if !more {
                break;
            }
            // Physical line the record starts on; quoted cells may span several
            let line = raw.position().map(|p| p.line()).unwrap_or_default();
            let row: TableRow = raw
                .deserialize(Some(&headers))
                .map_err(|e| VaultError::format(format!("table line {line}"), e))?;
            records.push(row.into_record(line)?);
        }

        debug!(path = %self.location.display(), records = records.len(), "Loaded record table");
        Ok(records)
    }

    fn write_table(&self, records: &[Record]) -> Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir).map_err(|e| VaultError::io(&dir, e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| VaultError::io(&dir, e))?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut tmp);
            writer
                .write_record(COLUMNS)
                .map_err(|e| VaultError::format("table header", e))?;
            for record in records {
                writer
                    .serialize(TableRow::from(record))
                    .map_err(|e| VaultError::format(format!("row {:?}", record.image_name), e))?;
            }
            writer
                .flush()
                .map_err(|e| VaultError::io(&self.location, e))?;
        }
        tmp.flush()
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| VaultError::io(&self.location, e))?;

        tmp.persist(&self.location)
            .map_err(|e| VaultError::io(&self.location, e.error))?;

        info!(path = %self.location.display(), records = records.len(), "Persisted record table");
        Ok(())
    }
}

/// In-memory table for tests and throwaway sessions.
///
/// Counts writes so callers can assert how often a table was rewritten.
#[derive(Debug, Default)]
pub struct MemoryTable {
    records: RefCell<Vec<Record>>,
    writes: Cell<usize>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: RefCell::new(records),
            writes: Cell::new(0),
        }
    }

    /// Number of `write_table` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn snapshot(&self) -> Vec<Record> {
        self.records.borrow().clone()
    }
}

impl RecordTable for MemoryTable {
    fn read_table(&self) -> Result<Vec<Record>> {
        Ok(self.snapshot())
    }

    fn write_table(&self, records: &[Record]) -> Result<()> {
        *self.records.borrow_mut() = records.to_vec();
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
