use thiserror::Error;

/// Errors returned by the nowcast computations.
#[derive(Debug, Error, PartialEq)]
pub enum NowcastError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl NowcastError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        NowcastError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, NowcastError>;
