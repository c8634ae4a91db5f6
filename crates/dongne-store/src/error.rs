use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("baseline I/O error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("baseline JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("baseline write task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
