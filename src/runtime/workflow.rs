use crate::error::{Result, TurkError};
use crate::store::csv_store;
use crate::store::{Record, TabularStore};
use std::path::Path;
use tracing::{info, warn};

/// 工作流状态：全部任务 + 已完成记录
///
/// Batches are derived from the completed count alone, so resuming assumes
/// the task file keeps its order between runs.
pub struct Workflow {
    tasks: Vec<Record>,
    store: Box<dyn TabularStore>,
}

impl Workflow {
    pub fn new(tasks: Vec<Record>, store: Box<dyn TabularStore>) -> Self {
        if store.records().len() > tasks.len() {
            warn!(
                finished = store.records().len(),
                tasks = tasks.len(),
                "Output has more records than there are tasks"
            );
        }
        Self { tasks, store }
    }

    /// Load tasks from `tasks_path`, which must exist.
    pub fn open(tasks_path: &Path, store: Box<dyn TabularStore>) -> Result<Self> {
        std::fs::metadata(tasks_path).map_err(|e| TurkError::io(tasks_path, e))?;
        let (tasks, _) = csv_store::load(tasks_path)?;
        info!(
            tasks = tasks.len(),
            finished = store.records().len(),
            "Workflow loaded"
        );
        Ok(Self::new(tasks, store))
    }

    pub fn tasks(&self) -> &[Record] {
        &self.tasks
    }

    pub fn finished(&self) -> &[Record] {
        self.store.records()
    }

    pub fn remaining(&self) -> usize {
        self.tasks.len().saturating_sub(self.finished().len())
    }

    pub fn has_more(&self) -> bool {
        self.finished().len() < self.tasks.len()
    }

    /// `(finished, total)`
    pub fn progress(&self) -> (usize, usize) {
        (self.finished().len(), self.tasks.len())
    }

    /// The next `size` unfinished tasks, clamped to what remains. Empty once
    /// every task is finished.
    pub fn next_batch(&self, size: usize) -> &[Record] {
        let size = size.min(self.remaining());
        if size == 0 {
            return &[];
        }
        let start = self.finished().len();
        &self.tasks[start..start + size]
    }

    /// Persist `records`; the finished count only moves once the store has
    /// made them durable.
    pub async fn commit(&mut self, records: Vec<Record>) -> Result<()> {
        self.store.append(records).await
    }
}
