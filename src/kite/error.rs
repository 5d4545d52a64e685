use thiserror::Error;

#[derive(Debug, Error)]
pub enum KiteError {
    #[error("missing credentials: set {0}")]
    MissingCredentials(&'static str),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("retryable status {status}: {preview}")]
    Retryable { status: u16, preview: String },

    #[error("kite api error {status} ({error_type}): {message}")]
    Api {
        status: u16,
        error_type: String,
        message: String,
    },

    #[error("parse error: {0}")]
    Parse(String),
}

impl KiteError {
    /// Rate limits, server errors and transport failures are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            KiteError::Retryable { .. } => true,
            KiteError::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for KiteError {
    fn from(err: serde_json::Error) -> Self {
        KiteError::Parse(err.to_string())
    }
}

impl From<csv::Error> for KiteError {
    fn from(err: csv::Error) -> Self {
        KiteError::Parse(err.to_string())
    }
}
