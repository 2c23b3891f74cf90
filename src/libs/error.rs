//! Error taxonomy for library operations.
//!
//! Three kinds reach the caller:
//!
//! - **Store errors**: reported by the row store and passed through unchanged.
//! - **Validation errors**: detected before the store is contacted.
//! - **Authorization errors**: detected after a fetch; no mutation is attempted.
//!
//! Authentication failures are deliberately a single variant so the message
//! never reveals whether the username exists.

use crate::api::StoreError;
use crate::libs::messages::Message;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Validation(Message),

    #[error("{0}")]
    Unauthorized(Message),

    #[error("{}", Message::InvalidCredentials)]
    AuthenticationFailed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed row: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(message: Message) -> Self {
        Error::Validation(message)
    }

    pub fn required(field: &str) -> Self {
        Error::Validation(Message::FieldRequired(field.to_string()))
    }

    /// The message carried by a validation or authorization error, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Error::Validation(message) | Error::Unauthorized(message) => Some(message),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
