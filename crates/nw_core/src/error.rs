use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("network error calling news API: {0}")]
    TransientNetwork(#[source] reqwest::Error),

    #[error("news API returned HTTP {status}")]
    UpstreamStatus { status: u16 },

    #[error("malformed news API response: {reason}; payload: {payload}")]
    MalformedResponse { reason: String, payload: String },

    #[error("schema provisioning failed: {0}")]
    Schema(String),

    #[error("constraint violation on row {index} (date={date}, url={url}): {reason}")]
    ConstraintViolation {
        index: usize,
        date: String,
        url: String,
        reason: String,
    },

    #[error("handoff error: {0}")]
    Handoff(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("external error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Whether the host scheduler should consider the run worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::TransientNetwork(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
