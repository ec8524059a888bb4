use thiserror::Error;

/// Error type for the gNMI reverse bridge.
///
/// `Config` and `Dial` are fatal at startup; everything else is scoped to one
/// retry iteration and recovered by the orchestrator restarting the session
/// pair.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("error dialing {endpoint}: {source}")]
    Dial {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("stream error: {0}")]
    Stream(#[from] tonic::Status),

    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("subscribe stream closed by target")]
    StreamClosed,

    #[error("session cancelled: sibling session exited")]
    Cancelled,

    #[error("session task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<tonic::metadata::errors::InvalidMetadataValue> for Error {
    fn from(e: tonic::metadata::errors::InvalidMetadataValue) -> Self {
        Error::Config(format!("invalid credential metadata: {e}"))
    }
}

impl Error {
    /// True for errors that abort startup rather than trigger a retry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Dial { .. })
    }
}

/// Result type alias using the bridge's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
