use crate::compiler::loader::load_template;
use crate::compiler::template::Template;
use crate::config::Config;
use crate::error::{Result, TurkError};
use crate::render::render;
use crate::runtime::workflow::Workflow;
use crate::store::{CsvStore, Record};
use crate::submission::decode_complete;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Hidden field carrying the completed count a page was rendered against.
pub const OFFSET_FIELD: &str = "localturk_offset";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Batch { html: String, offset: usize, size: usize },
    Done,
}

/// Render/submit boundary used by the transport.
///
/// All access to the workflow goes through one lock: a batch is computed
/// and a submission is written to disk and counted inside the same critical
/// section.
pub struct TurkService {
    template: Template,
    workflow: Mutex<Workflow>,
    batch_size: usize,
}

impl TurkService {
    pub fn new(template: Template, workflow: Workflow, batch_size: usize) -> Self {
        Self {
            template,
            workflow: Mutex::new(workflow),
            batch_size: batch_size.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let template = load_template(&config.template)?;
        let store = CsvStore::open(&config.outputs)?;
        let workflow = Workflow::open(&config.tasks, Box::new(store))?;
        Ok(Self::new(template, workflow, config.batch_size))
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub async fn progress(&self) -> (usize, usize) {
        self.workflow.lock().await.progress()
    }

    pub async fn render_next(&self) -> Page {
        let workflow = self.workflow.lock().await;
        let batch = workflow.next_batch(self.batch_size);
        if batch.is_empty() {
            return Page::Done;
        }

        let (done, total) = workflow.progress();
        let mut html = String::from("<!doctype html><html><body><form action=/submit method=post>\n");
        html.push_str(&format!("<p>Completed: {done} / {total}</p>\n"));
        html.push_str(&format!("<input type=hidden name={OFFSET_FIELD} value={done} />\n"));
        html.push_str(&render(&self.template, batch));
        html.push_str("<hr/><input type=submit />\n");
        html.push_str("</form></body></html>\n");

        Page::Batch {
            html,
            offset: done,
            size: batch.len(),
        }
    }

    /// Decode and commit one submitted page. Returns the number of records
    /// saved. On error nothing is written and the completed count is
    /// unchanged.
    pub async fn submit(&self, mut form: Record) -> Result<usize> {
        let offset = form.shift_remove(OFFSET_FIELD);

        let mut workflow = self.workflow.lock().await;
        let expected = workflow.finished().len();
        if let Some(offset) = offset {
            let submitted: usize = offset.trim().parse().map_err(|_| {
                TurkError::SchemaGap(format!("invalid {OFFSET_FIELD} value '{offset}'"))
            })?;
            if submitted != expected {
                warn!(submitted, expected, "Rejected submission for a batch that was already saved");
                return Err(TurkError::StaleBatch { submitted, expected });
            }
        }
        let records = decode_complete(&form, workflow.remaining())?;

        let count = records.len();
        let saved = serde_json::to_string(&records).unwrap_or_default();
        workflow.commit(records).await?;
        info!(count, "Saved {}", saved);
        Ok(count)
    }
}
