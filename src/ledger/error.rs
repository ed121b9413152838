use thiserror::Error;

/// Errors talking to the ledger service.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid ledger URL: {0}")]
    Url(String),

    #[error("Request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl LedgerError {
    pub(crate) fn http(endpoint: &str, source: reqwest::Error) -> Self {
        LedgerError::Http {
            endpoint: endpoint.to_string(),
            source,
        }
    }

    pub(crate) fn decode(endpoint: &str, message: impl ToString) -> Self {
        LedgerError::Decode {
            endpoint: endpoint.to_string(),
            message: message.to_string(),
        }
    }
}
