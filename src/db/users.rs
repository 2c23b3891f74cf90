//! Account storage, password checks and username rules.

use crate::api::{from_row, to_row, Query, RowStore, Select, StoreError, Table};
use crate::libs::auth::{self, USER_COLUMNS};
use crate::libs::error::{Error, Result};
use crate::libs::messages::Message;
use crate::libs::row_id::RowId;
use crate::libs::user::{NewUser, Role, User, UserUpdate, UsernameAvailability};
use serde_json::Value;

/// User accounts, the login gate and self-service profile changes.
pub struct Users<'a, S: RowStore> {
    store: &'a S,
}

impl<'a, S: RowStore> Users<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn by_id(user_id: &RowId) -> Query {
        Query::new(Table::Users).eq("user_id", user_id)
    }

    /// All users, newest first.
    pub async fn list(&self) -> Result<Vec<User>> {
        let query = Query::new(Table::Users)
            .columns(USER_COLUMNS)
            .order_by("created_at", false);
        self.store.fetch(&query).await?.into_iter().map(from_row).collect()
    }

    pub async fn get(&self, user_id: &RowId) -> Result<User> {
        let row = self.store.fetch_one(&Self::by_id(user_id).columns(USER_COLUMNS)).await?;
        from_row(row)
    }

    pub async fn count(&self) -> Result<usize> {
        let query = Query::new(Table::Users).columns(&["user_id"]);
        Ok(self.store.fetch(&query).await?.len())
    }

    pub async fn create(&self, user: &NewUser) -> Result<User> {
        if user.username.trim().is_empty() {
            return Err(Error::required("username"));
        }
        if user.password.is_empty() {
            return Err(Error::required("password"));
        }

        let mut row = to_row(user)?;
        row.insert("username".to_string(), Value::from(user.username.trim()));
        let row = self
            .store
            .insert(Table::Users, row, &Select::columns(USER_COLUMNS))
            .await?;
        from_row(row)
    }

    /// Admin update. An empty password leaves the stored one unchanged.
    pub async fn update(&self, user_id: &RowId, update: &UserUpdate) -> Result<User> {
        let mut update = update.clone();
        if update.password.as_deref().is_some_and(str::is_empty) {
            update.password = None;
        }
        if let Some(username) = update.username.take() {
            let username = username.trim();
            if username.is_empty() {
                return Err(Error::required("username"));
            }
            update.username = Some(username.to_string());
        }
        if update.username.is_none() && update.password.is_none() && update.role.is_none() {
            return self.get(user_id).await;
        }

        let rows = self.store.update(&Self::by_id(user_id), to_row(&update)?).await?;
        let row = rows.into_iter().next().ok_or(StoreError::NotFound)?;
        from_row(row)
    }

    /// Deletes the user and returns the removed account.
    pub async fn delete(&self, user_id: &RowId) -> Result<User> {
        let rows = self.store.delete(&Self::by_id(user_id)).await?;
        let row = rows.into_iter().next().ok_or(StoreError::NotFound)?;
        from_row(row)
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        auth::authenticate(self.store, username, password).await
    }

    /// Whether `username` is free, ignoring the account `exclude`.
    pub async fn check_username_availability(
        &self,
        username: &str,
        exclude: Option<&RowId>,
    ) -> Result<UsernameAvailability> {
        let mut query = Query::new(Table::Users).columns(&["user_id"]).eq("username", username);
        if let Some(user_id) = exclude {
            query = query.neq("user_id", user_id);
        }
        let taken = !self.store.fetch(&query).await?.is_empty();

        let message = if taken {
            Message::UsernameTaken
        } else {
            Message::UsernameAvailable
        };
        Ok(UsernameAvailability {
            available: !taken,
            message: message.to_string(),
        })
    }

    /// Renames the user's own account.
    pub async fn update_profile(&self, user_id: &RowId, username: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::required("username"));
        }

        let current = self.get(user_id).await?;
        if current.username == username {
            return Err(Error::validation(Message::UsernameUnchanged));
        }
        if !self.check_username_availability(username, Some(user_id)).await?.available {
            return Err(Error::validation(Message::UsernameTaken));
        }

        let update = UserUpdate {
            username: Some(username.to_string()),
            ..Default::default()
        };
        let rows = self.store.update(&Self::by_id(user_id), to_row(&update)?).await?;
        let row = rows.into_iter().next().ok_or(StoreError::NotFound)?;
        from_row(row)
    }

    /// Changes the user's own password after verifying the current one.
    pub async fn change_password(&self, user_id: &RowId, current: &str, new: &str, confirm: &str) -> Result<()> {
        auth::validate_password_change(current, new, confirm)?;

        let row = self
            .store
            .fetch_one(&Self::by_id(user_id).columns(&["user_id", "password"]))
            .await?;
        if row.get("password").and_then(Value::as_str) != Some(current) {
            return Err(Error::validation(Message::CurrentPasswordIncorrect));
        }

        let update = UserUpdate {
            password: Some(new.to_string()),
            ..Default::default()
        };
        self.store.update(&Self::by_id(user_id), to_row(&update)?).await?;
        Ok(())
    }

    /// Creates the first administrator of an empty store.
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<Option<User>> {
        if self.count().await? > 0 {
            return Ok(None);
        }
        auth::validate_new_password(password)?;
        self.create(&NewUser::new(username, password, Role::Admin)).await.map(Some)
    }
}
