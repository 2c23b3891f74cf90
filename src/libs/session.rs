//! CLI login session.
//!
//! After a successful login the sanitized [`User`] is written to the data
//! directory; later commands read it back to know who is acting and which
//! role-gated commands they may run. Logging out removes the file.

use super::auth;
use super::data_storage::DataStorage;
use super::error::{Error, Result};
use super::messages::Message;
use super::user::User;
use std::fs;
use std::io::ErrorKind;

pub const SESSION_FILE_NAME: &str = "session.json";

pub struct Session;

impl Session {
    pub fn save(user: &User) -> Result<()> {
        let path = DataStorage::new().get_path(SESSION_FILE_NAME)?;
        fs::write(path, serde_json::to_string_pretty(user)?)?;
        Ok(())
    }

    /// The logged-in user, if any.
    pub fn load() -> Result<Option<User>> {
        let path = DataStorage::new().get_path(SESSION_FILE_NAME)?;
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// The logged-in user, or an authorization error.
    pub fn current() -> Result<User> {
        Self::load()?.ok_or(Error::Unauthorized(Message::NotLoggedIn))
    }

    /// The logged-in user, provided they are an admin.
    pub fn admin() -> Result<User> {
        let user = Self::current()?;
        auth::require_admin(&user)?;
        Ok(user)
    }

    /// Removes the session. Returns `false` when nobody was logged in.
    pub fn clear() -> Result<bool> {
        let path = DataStorage::new().get_path(SESSION_FILE_NAME)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }
}
