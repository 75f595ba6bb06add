use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ExchangeError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Exchange API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("SimpleSwap API key not configured")]
    MissingApiKey,

    #[error("Exchange {0} not found")]
    NotFound(String),
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ExchangeError::Decode(err.to_string())
        } else {
            ExchangeError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::Decode(err.to_string())
    }
}

pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
