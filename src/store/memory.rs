use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use crate::error::{Result, TurkError};
use crate::store::{new_columns, Record, TabularStore};

/// In-memory table with the same column-widening rules as `CsvStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Vec<Record>,
    columns: Vec<String>,
    fail_next: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(rows: Vec<Record>) -> Self {
        let columns = new_columns(&[], &rows);
        Self {
            rows,
            columns,
            fail_next: Arc::default(),
        }
    }

    /// Switch that makes the next `append` fail with an I/O error.
    pub fn failure_switch(&self) -> Arc<AtomicBool> {
        self.fail_next.clone()
    }
}

#[async_trait]
impl TabularStore for MemoryStore {
    fn records(&self) -> &[Record] {
        &self.rows
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn append(&mut self, records: Vec<Record>) -> Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(TurkError::io(
                PathBuf::from("<memory>"),
                io::Error::other("injected append failure"),
            ));
        }
        let added = new_columns(&self.columns, &records);
        self.columns.extend(added);
        self.rows.extend(records);
        Ok(())
    }
}
