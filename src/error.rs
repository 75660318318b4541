use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TurkError {
    /// 模板中的 repeat 标记数量不合法 (只允许 0 或 2 个)
    #[error("failed to parse localturk repeat markers: found {markers}, expected 0 or 2")]
    Parse { markers: usize },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Submitted field set cannot be mapped back onto a batch.
    #[error("malformed submission: {0}")]
    SchemaGap(String),

    #[error("stale batch: submitted for offset {submitted}, but {expected} records are already completed")]
    StaleBatch { submitted: usize, expected: usize },
}

impl TurkError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TurkError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        TurkError::Csv {
            path: path.into(),
            source,
        }
    }

    /// Errors caused by the request itself rather than by the server's files.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TurkError::SchemaGap(_) | TurkError::StaleBatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, TurkError>;
