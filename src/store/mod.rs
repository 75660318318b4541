use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use crate::error::Result;

pub mod csv_store;
pub mod memory;

pub use csv_store::CsvStore;
pub use memory::MemoryStore;

/// 一行记录：列名 -> 值，保持列顺序
pub type Record = IndexMap<String, String>;

// --- Interfaces ---

/// Append-only table of completed records whose column set may only grow.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Every record persisted so far, in write order.
    fn records(&self) -> &[Record];

    /// The Column Set: every column ever written, in first-seen order.
    fn columns(&self) -> &[String];

    /// Persist `records`. Must not return until the data is durable, and must
    /// leave `records()`/`columns()` untouched when it fails.
    async fn append(&mut self, records: Vec<Record>) -> Result<()>;
}

/// Columns used by `records` that are not in `known`, in first-seen order.
pub fn new_columns(known: &[String], records: &[Record]) -> Vec<String> {
    let known: HashSet<&str> = known.iter().map(String::as_str).collect();
    let mut added = IndexSet::new();
    for record in records {
        for key in record.keys() {
            if !known.contains(key.as_str()) {
                added.insert(key.clone());
            }
        }
    }
    added.into_iter().collect()
}
