//! Row store contract.
//!
//! Every repository in [`crate::db`] talks to storage through [`RowStore`]:
//! a small, backend-neutral vocabulary of tables, filters, column selections,
//! many-to-one embeds, ordering and limits. Two implementations exist:
//!
//! - [`rest::RestStore`]: a PostgREST-compatible HTTP endpoint (Supabase and friends)
//! - [`crate::db::local::LocalStore`]: an embedded SQLite file with the same schema
//!
//! [`Store`] picks one of them from the saved configuration.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskboard::api::{Filter, Query, RowStore, Table};
//!
//! # async fn demo(store: &impl RowStore) -> Result<(), taskboard::api::StoreError> {
//! let query = Query::new(Table::Tasks)
//!     .columns(&["task_id", "title"])
//!     .filter(Filter::search(&["title", "description"], "report"))
//!     .order_by("created_at", false);
//! let rows = store.fetch(&query).await?;
//! # Ok(())
//! # }
//! ```

pub mod rest;

use crate::db::local::LocalStore;
use crate::libs::config::{Backend, Config};
use crate::libs::error::Error;
use crate::libs::messages::Message;
use rest::RestStore;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A row as exchanged with the store: column name to JSON value, plus one
/// nested object (or null) per requested embed.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Categories,
    Tasks,
}

const USER_COLUMNS: &[&str] = &["user_id", "username", "password", "role", "created_at"];
const CATEGORY_COLUMNS: &[&str] = &["category_id", "name", "description", "color", "creator_id", "created_at"];
const TASK_COLUMNS: &[&str] = &[
    "task_id",
    "title",
    "description",
    "status",
    "priority",
    "due_date",
    "category_id",
    "assignee_id",
    "creator_id",
    "created_at",
    "updated_at",
];

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Categories => "categories",
            Table::Tasks => "tasks",
        }
    }

    pub fn primary_key(&self) -> &'static str {
        match self {
            Table::Users => "user_id",
            Table::Categories => "category_id",
            Table::Tasks => "task_id",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Users => USER_COLUMNS,
            Table::Categories => CATEGORY_COLUMNS,
            Table::Tasks => TASK_COLUMNS,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    /// Fails with [`StoreError::UnknownColumn`] for names outside the schema.
    pub fn check_column(&self, column: &str) -> Result<(), StoreError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(StoreError::UnknownColumn(format!("{}.{}", self.name(), column)))
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Row predicate. A query's filters are combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Equality. `Eq(col, Value::Null)` matches null columns.
    Eq(String, Value),
    Neq(String, Value),
    Gte(String, Value),
    /// Case-insensitive substring match.
    ILike(String, String),
    /// Any of the nested filters.
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Filter::Eq(column.to_string(), value.into())
    }

    pub fn neq(column: &str, value: impl Into<Value>) -> Self {
        Filter::Neq(column.to_string(), value.into())
    }

    pub fn gte(column: &str, value: impl Into<Value>) -> Self {
        Filter::Gte(column.to_string(), value.into())
    }

    /// Case-insensitive substring search across several columns.
    pub fn search(columns: &[&str], term: &str) -> Self {
        Filter::Or(
            columns
                .iter()
                .map(|column| Filter::ILike(column.to_string(), term.to_string()))
                .collect(),
        )
    }

    /// Every column name the filter refers to.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Filter::Eq(column, _) | Filter::Neq(column, _) | Filter::Gte(column, _) | Filter::ILike(column, _) => {
                vec![column.as_str()]
            }
            Filter::Or(filters) => filters.iter().flat_map(Filter::columns).collect(),
        }
    }
}

/// Backslash-escapes `%`, `_` and `\` so `term` matches itself inside a LIKE pattern.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Many-to-one join: `via` on the base table references the primary key of
/// `table`. The resolved row appears under `alias`, or null when `via` is null
/// or dangling.
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub alias: String,
    pub table: Table,
    pub via: String,
    pub columns: Vec<String>,
}

impl Embed {
    pub fn new(alias: &str, table: Table, via: &str, columns: &[&str]) -> Self {
        Self {
            alias: alias.to_string(),
            table,
            via: via.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Column projection. No columns means every column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub columns: Vec<String>,
    pub embeds: Vec<Embed>,
}

impl Select {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn columns(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            embeds: Vec::new(),
        }
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn is_all(&self) -> bool {
        self.columns.is_empty()
    }

    /// Checks projected, embedded and join columns against the schema.
    pub fn validate(&self, table: Table) -> Result<(), StoreError> {
        for column in &self.columns {
            table.check_column(column)?;
        }
        for embed in &self.embeds {
            table.check_column(&embed.via)?;
            for column in &embed.columns {
                embed.table.check_column(column)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: Table,
    pub select: Select,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            select: Select::all(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn select(mut self, select: Select) -> Self {
        self.select = select;
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.select.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::eq(column, value))
    }

    pub fn neq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::neq(column, value))
    }

    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::gte(column, value))
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Checks every identifier in the query against the table schema.
    pub fn validate(&self) -> Result<(), StoreError> {
        self.select.validate(self.table)?;
        for filter in &self.filters {
            for column in filter.columns() {
                self.table.check_column(column)?;
            }
        }
        if let Some(order) = &self.order {
            self.table.check_column(&order.column)?;
        }
        Ok(())
    }

    /// Like [`Query::validate`], and also refuses queries without filters.
    /// Used before updates and deletes.
    pub fn validate_mutation(&self) -> Result<(), StoreError> {
        if self.filters.is_empty() {
            return Err(StoreError::Unfiltered(self.table.name()));
        }
        self.validate()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Expected a single row, got {0}")]
    Ambiguous(usize),

    #[error("{message}")]
    Remote {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Refusing to modify every row of {0}")]
    Unfiltered(&'static str),

    #[error("Store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Storage operations the rest of the crate relies on.
///
/// Implementations never interpret domain semantics; they only evaluate the
/// query vocabulary above. Updates and deletes return the affected rows, in
/// the shape of a full-row select.
#[allow(async_fn_in_trait)]
pub trait RowStore {
    async fn fetch(&self, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Inserts one row and returns it as stored, projected through `select`.
    async fn insert(&self, table: Table, row: Row, select: &Select) -> Result<Row, StoreError>;

    async fn update(&self, query: &Query, changes: Row) -> Result<Vec<Row>, StoreError>;

    async fn delete(&self, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Exactly one matching row, or [`StoreError::NotFound`] / [`StoreError::Ambiguous`].
    async fn fetch_one(&self, query: &Query) -> Result<Row, StoreError> {
        let mut rows = self.fetch(query).await?;
        match rows.len() {
            0 => Err(StoreError::NotFound),
            1 => Ok(rows.remove(0)),
            n => Err(StoreError::Ambiguous(n)),
        }
    }

    /// Cheapest possible round trip, used to check connectivity.
    async fn ping(&self) -> Result<(), StoreError> {
        let query = Query::new(Table::Users).columns(&["user_id"]).limit(1);
        self.fetch(&query).await.map(|_| ())
    }
}

/// The store selected by configuration.
pub enum Store {
    Remote(RestStore),
    Local(LocalStore),
}

impl Store {
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        match config.backend {
            Backend::Remote => {
                let remote = config
                    .remote
                    .as_ref()
                    .ok_or_else(|| Error::Config(Message::RemoteConfigMissing.to_string()))?;
                Ok(Store::Remote(RestStore::new(remote)))
            }
            Backend::Local => Ok(Store::Local(LocalStore::open(config.local_db_path()?)?)),
        }
    }

    /// Human-readable location of the backing store.
    pub fn location(&self) -> String {
        match self {
            Store::Remote(store) => store.base_url().to_string(),
            Store::Local(store) => store.path().display().to_string(),
        }
    }
}

impl RowStore for Store {
    async fn fetch(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        match self {
            Store::Remote(store) => store.fetch(query).await,
            Store::Local(store) => store.fetch(query).await,
        }
    }

    async fn insert(&self, table: Table, row: Row, select: &Select) -> Result<Row, StoreError> {
        match self {
            Store::Remote(store) => store.insert(table, row, select).await,
            Store::Local(store) => store.insert(table, row, select).await,
        }
    }

    async fn update(&self, query: &Query, changes: Row) -> Result<Vec<Row>, StoreError> {
        match self {
            Store::Remote(store) => store.update(query, changes).await,
            Store::Local(store) => store.update(query, changes).await,
        }
    }

    async fn delete(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        match self {
            Store::Remote(store) => store.delete(query).await,
            Store::Local(store) => store.delete(query).await,
        }
    }
}

/// Serializes a domain value into a store row.
pub fn to_row<T: serde::Serialize>(value: &T) -> Result<Row, Error> {
    match serde_json::to_value(value)? {
        Value::Object(row) => Ok(row),
        other => Err(Error::Config(format!("expected an object row, got {}", other))),
    }
}

/// Decodes a store row into a domain value.
pub fn from_row<T: serde::de::DeserializeOwned>(row: Row) -> Result<T, Error> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn search_expands_to_or_of_ilike() {
        let filter = Filter::search(&["title", "description"], "Bug");
        assert_eq!(
            filter,
            Filter::Or(vec![
                Filter::ILike("title".to_string(), "Bug".to_string()),
                Filter::ILike("description".to_string(), "Bug".to_string()),
            ])
        );
        assert_eq!(filter.columns(), vec!["title", "description"]);
    }

    #[test]
    fn validation_rejects_unknown_identifiers() {
        let query = Query::new(Table::Tasks).eq("title; DROP TABLE tasks", 1);
        assert!(matches!(query.validate(), Err(StoreError::UnknownColumn(_))));

        let query = Query::new(Table::Tasks).select(Select::all().embed(Embed::new(
            "assigned_user",
            Table::Users,
            "assignee_id",
            &["user_id", "email"],
        )));
        assert!(matches!(query.validate(), Err(StoreError::UnknownColumn(c)) if c == "users.email"));
    }

    #[test]
    fn mutations_require_a_filter() {
        let query = Query::new(Table::Users);
        assert!(matches!(query.validate_mutation(), Err(StoreError::Unfiltered("users"))));
        assert!(query.eq("user_id", 1).validate_mutation().is_ok());
    }
}
