use thiserror::Error;

#[derive(Debug, Error)]
pub enum CkrvError {
    #[error("invalid event kind: {0}")]
    InvalidEventKind(String),

    #[error("invalid task status: {0}")]
    InvalidTaskStatus(String),

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CkrvError>;
