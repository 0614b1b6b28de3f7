//! Error types for the logging facility

pub type Result<T> = std::result::Result<T, LogError>;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// IO error with file context
    #[error("IO error while {operation} '{path}': {source}")]
    IoOperation {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A handler without a formatter cannot render records and is rejected
    /// at attach time.
    #[error("handler has no formatter")]
    NoFormatter,

    /// Template contains no recognizable tokens
    #[error("invalid format template string: '{0}'")]
    InvalidTemplate(String),

    /// Template references a token name that does not exist
    #[error("unknown format template token: '{0}'")]
    UnknownToken(String),

    /// Render-time formatter failure
    #[error("formatter error: {0}")]
    Formatter(String),
}

impl LogError {
    /// Create an IO error with file context
    pub fn io_operation(
        operation: impl Into<String>,
        path: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LogError::IoOperation {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create an invalid-template error
    pub fn invalid_template(template: impl Into<String>) -> Self {
        LogError::InvalidTemplate(template.into())
    }

    /// Create an unknown-token error
    pub fn unknown_token(token: impl Into<String>) -> Self {
        LogError::UnknownToken(token.into())
    }

    /// Create a render-time formatter error
    pub fn formatter(message: impl Into<String>) -> Self {
        LogError::Formatter(message.into())
    }
}
