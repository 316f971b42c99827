use thiserror::Error;

/// Everything a [`Client`](crate::Client) call can fail with.
#[derive(Error, Debug)]
pub enum StratusError {
    #[error("Search failed: {message} ({url})")]
    SearchFailure { message: String, url: String },
    #[error("Document update failed: {message} ({url})")]
    WriteFailure {
        message: String,
        url: String,
        body: String,
    },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Compilation error: {0}")]
    Compilation(#[from] crate::filter::CompileError),
    #[error("Domain discovery for `{domain}` failed: {cause}")]
    DomainDiscovery {
        domain: String,
        cause: anyhow::Error,
    },
    #[error("Transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StratusError>;
