use thiserror::Error;

#[derive(Error, Debug)]
pub enum NemgateError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Node {url} answered with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("All {attempts} attempts failed, last error: {last}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        last: Box<NemgateError>,
    },

    #[error("Page cursor did not advance: previous {previous}, page starts at {found}")]
    NonMonotonicCursor { previous: u64, found: u64 },

    #[error("Invalid deadline: {0}")]
    InvalidDeadline(String),

    #[error("Network context should only be initialized once")]
    AlreadyInitialized,

    #[error("Network context is not initialized, call bootstrap() with a network type first")]
    NotInitialized,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NemgateError {
    /// Whether the failure comes from the node or the network rather than
    /// from the request itself.
    ///
    /// Only consulted by the dispatcher when it runs with
    /// `RetryPolicy::TransientOnly`; the default policy retries everything.
    pub fn is_transient(&self) -> bool {
        match self {
            NemgateError::Transport(_)
            | NemgateError::Timeout(_)
            | NemgateError::InvalidResponse(_)
            | NemgateError::JsonSerialization(_)
            | NemgateError::Io(_) => true,
            NemgateError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, NemgateError>;
