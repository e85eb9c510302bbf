use thiserror::Error;

use crate::record::RecordBatch;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("The selector you are trying to scrape for is invalid. Selector: {0}")]
    ParseMissingSelector(String),

    #[error("Couldn't read stored snapshot: {0}")]
    StoreRead(StoreError),

    /// The merged batch is kept so the write can be retried by the caller.
    #[error("Couldn't write {target}: {source}")]
    StoreWrite {
        target: String,
        source: StoreError,
        merged: Box<RecordBatch>,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Yaml Error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    /// The merged batch that was computed before a failed write, if any.
    pub fn merged(&self) -> Option<&RecordBatch> {
        match self {
            Error::StoreWrite { merged, .. } => Some(merged),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no snapshot stored for period {0}")]
    NotFound(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}
