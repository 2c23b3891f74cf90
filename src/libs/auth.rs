//! Credential checks.
//!
//! Passwords are compared as stored, by exact string equality. The stored
//! value is never returned to callers: rows are decoded into [`User`], which
//! has no password field.

use super::error::{Error, Result};
use super::messages::Message;
use super::user::User;
use crate::api::{from_row, Query, RowStore, Table};
use serde_json::Value;
use tracing::{debug, warn};

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub const USER_COLUMNS: &[&str] = &["user_id", "username", "role", "created_at"];
const CREDENTIAL_COLUMNS: &[&str] = &["user_id", "username", "password", "role", "created_at"];

/// Looks the user up by exact username and compares the password.
///
/// Every failure, including store errors and unknown usernames, yields
/// [`Error::AuthenticationFailed`].
pub async fn authenticate<S: RowStore>(store: &S, username: &str, password: &str) -> Result<User> {
    let query = Query::new(Table::Users)
        .columns(CREDENTIAL_COLUMNS)
        .eq("username", username);

    let mut row = match store.fetch_one(&query).await {
        Ok(row) => row,
        Err(error) => {
            debug!("login lookup failed: {}", error);
            return Err(Error::AuthenticationFailed);
        }
    };

    let matches = matches!(row.remove("password"), Some(Value::String(stored)) if stored == password);
    if !matches {
        warn!(username, "password mismatch");
        return Err(Error::AuthenticationFailed);
    }

    from_row(row).map_err(|_| Error::AuthenticationFailed)
}

/// Local checks for a password change, run before the store is contacted.
pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<()> {
    if current.is_empty() {
        return Err(Error::required("current password"));
    }
    if new.is_empty() {
        return Err(Error::required("new password"));
    }
    validate_new_password(new)?;
    if new != confirm {
        return Err(Error::validation(Message::PasswordConfirmationMismatch));
    }
    if new == current {
        return Err(Error::validation(Message::PasswordUnchanged));
    }
    Ok(())
}

pub fn validate_new_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::validation(Message::PasswordTooShort(MIN_PASSWORD_LENGTH)));
    }
    Ok(())
}

/// Fails with [`Message::AdminRequired`] unless the user is an admin.
pub fn require_admin(user: &User) -> Result<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(Error::Unauthorized(Message::AdminRequired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<()>) -> Message {
        result.unwrap_err().message().cloned().unwrap()
    }

    #[test]
    fn password_change_rules_apply_in_order() {
        assert_eq!(message(validate_password_change("", "abcdef", "abcdef")), Message::FieldRequired("current password".to_string()));
        assert_eq!(message(validate_password_change("old", "", "")), Message::FieldRequired("new password".to_string()));
        assert_eq!(message(validate_password_change("old", "abc", "abc")), Message::PasswordTooShort(6));
        assert_eq!(message(validate_password_change("old", "abcdef", "abcdeg")), Message::PasswordConfirmationMismatch);
        assert_eq!(message(validate_password_change("abcdef", "abcdef", "abcdef")), Message::PasswordUnchanged);
        assert!(validate_password_change("old", "abcdef", "abcdef").is_ok());
    }

    #[test]
    fn length_counts_characters() {
        assert!(validate_new_password("密码密码密码").is_ok());
        assert!(validate_new_password("密码").is_err());
    }
}
