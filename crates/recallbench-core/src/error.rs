use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("memory service unreachable: {0}")]
    Transport(String),

    #[error("memory service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The service answered but reported `ok: false`.
    #[error("memory service rejected request: {0}")]
    Rejected(String),
}

pub type BenchResult<T> = Result<T, BenchError>;
