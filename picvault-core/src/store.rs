//! In-memory view of all records, backed by a [`RecordTable`].

use tracing::debug;

use crate::config::RepositoryConfig;
use crate::error::Result;
use crate::record::Record;
use crate::table::{CsvTable, RecordTable};

/// All known records plus the table they are persisted to.
///
/// Appends only touch memory; `persist` rewrites the whole table, so callers
/// batch their appends and persist once.
#[derive(Debug)]
pub struct RecordStore<T: RecordTable = CsvTable> {
    table: T,
    records: Vec<Record>,
}

impl RecordStore<CsvTable> {
    /// Open the CSV table named by the configuration.
    pub fn open(config: &RepositoryConfig) -> Result<Self> {
        Self::load(CsvTable::new(&config.table_location))
    }
}

impl<T: RecordTable> RecordStore<T> {
    /// Load the current table (empty when none exists yet).
    pub fn load(table: T) -> Result<Self> {
        let records = table.read_table()?;
        debug!(records = records.len(), "Record store loaded");
        Ok(Self { table, records })
    }

    /// Records in table order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Exact match on the full `image_name` of every record.
    pub fn exists(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.image_name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.image_name == name)
    }

    /// Add a record in memory. Uniqueness is the caller's responsibility.
    pub fn append(&mut self, record: Record) {
        debug!(name = %record.image_name, uuid = %record.unique_uuid, "Appending record");
        self.records.push(record);
    }

    /// Write the full table back.
    pub fn persist(&self) -> Result<()> {
        self.table.write_table(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn table(&self) -> &T {
        &self.table
    }
}
