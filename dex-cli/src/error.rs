//! Structured error types for the DEX CLI

use thiserror::Error;

use lib_client::ClientError;
use lib_exchange::ExchangeError;
use lib_governance::GovernanceError;
use lib_positions::PositionError;

#[derive(Error, Debug)]
pub enum CliError {
    // Configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Missing setting '{0}': pass it as a flag or set it in the config file")]
    MissingSetting(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Library errors
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Position(#[from] PositionError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    // I/O and serialization
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<String> for CliError {
    fn from(s: String) -> Self {
        CliError::Other(s)
    }
}

impl From<&str> for CliError {
    fn from(s: &str) -> Self {
        CliError::Other(s.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
