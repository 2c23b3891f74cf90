//! The `{data, error}` envelope handed to presentation layers.
//!
//! Library calls return `Result`; this converts one into the two-field shape
//! where exactly one side is set. An empty list is valid `data`.

use super::error::Error;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl ToString) -> Self {
        Self {
            data: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl<T> From<Result<T, Error>> for ApiResponse<T> {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(data) => ApiResponse::ok(data),
            Err(error) => ApiResponse::err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::messages::Message;

    #[test]
    fn empty_lists_are_data_not_errors() {
        let response: ApiResponse<Vec<i32>> = Ok(vec![]).into();
        assert!(response.is_ok());
        assert_eq!(serde_json::to_value(&response).unwrap(), serde_json::json!({"data": [], "error": null}));
    }

    #[test]
    fn errors_carry_only_the_message() {
        let response: ApiResponse<()> = Err(Error::Validation(Message::PasswordTooShort(6))).into();
        assert_eq!(response.data, None);
        assert_eq!(response.error.as_deref(), Some("New password must be at least 6 characters long"));
    }
}
