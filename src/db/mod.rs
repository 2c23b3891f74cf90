//! Storage-facing layer.
//!
//! Holds the embedded SQLite backend and the repositories the commands use.
//! Repositories borrow any [`crate::api::RowStore`], so the same code runs
//! against the remote endpoint and the local file.
//!
//! ```rust,no_run
//! use taskboard::api::Store;
//! use taskboard::db::tasks::Tasks;
//! use taskboard::libs::config::Config;
//! use taskboard::libs::task::TaskFilter;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let store = Store::from_config(&Config::load()?)?;
//! let open = Tasks::new(&store).list(&TaskFilter::default()).await?;
//! # Ok(())
//! # }
//! ```

/// SQLite connection and schema steps.
pub mod db;

/// The SQLite implementation of the row store.
pub mod local;

pub mod categories;
pub mod reports;
pub mod tasks;
pub mod users;
