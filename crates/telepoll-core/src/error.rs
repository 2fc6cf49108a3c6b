use thiserror::Error;

/// Failure of a single request to the Bot API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, request timeout, etc.
    #[error("network error: {0}")]
    Network(String),

    /// The server replied, but not with a well-formed API envelope.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The API answered `ok: false` (bad token, rate limit, bad request...).
    #[error("api error {code}: {description}")]
    Api {
        /// `error_code` from the envelope, 0 when the server omitted it.
        code: i64,
        description: String,
        /// Seconds to wait before retrying, when the API asked for it.
        retry_after: Option<u64>,
    },
}

impl TransportError {
    /// Whether the API rejected the bot token. Retrying will not help.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { code: 401, .. })
    }
}

/// Error raised by a handler while processing one update.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler failed: {0}")]
    Failed(String),

    /// An API call made from inside the handler failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl HandlerError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Fatal outcome of a polling session.
#[derive(Debug, Error)]
pub enum PollError {
    /// The transport failed more times in a row than the configured threshold.
    #[error("giving up after {attempts} consecutive transport failures: {last}")]
    TooManyFailures {
        attempts: u32,
        last: TransportError,
    },

    /// The handler's start hook failed before the first fetch.
    #[error("handler start-up failed: {0}")]
    Startup(#[source] HandlerError),
}

/// Errors outside the poll loop: configuration and offset storage.
#[derive(Debug, Error)]
pub enum TelepollError {
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
