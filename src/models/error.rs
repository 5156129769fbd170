use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Display, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum SError {
    #[display("backend call failed: {_0}")]
    Backend(String),
    #[display("{_0}")]
    Timeout(String),
    #[display("storage error: {_0}")]
    Storage(String),
    #[display("storage quota exceeded: {_0}")]
    QuotaExceeded(String),
    #[display("parse error: {_0}")]
    ParseError(String),
    #[display("io error: {_0}")]
    IOError(String),
    #[display("network error: {_0}")]
    Network(String),
    #[display("async runtime error: {_0}")]
    AsyncRuntimeError(String),
    #[display("unexpected error: {_0:?}")]
    Unexpected(Option<String>),
}

impl std::error::Error for SError {}

impl From<std::io::Error> for SError {
    fn from(e: std::io::Error) -> Self {
        SError::IOError(e.to_string())
    }
}

impl From<serde_json::Error> for SError {
    fn from(e: serde_json::Error) -> Self {
        SError::ParseError(e.to_string())
    }
}

impl From<reqwest::Error> for SError {
    fn from(e: reqwest::Error) -> Self {
        SError::Network(e.to_string())
    }
}

impl From<tokio::task::JoinError> for SError {
    fn from(e: tokio::task::JoinError) -> Self {
        SError::AsyncRuntimeError(e.to_string())
    }
}
