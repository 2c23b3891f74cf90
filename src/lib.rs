//! # Taskboard - shared task management over a row store
//!
//! A command-line client and library for a small team task board: user
//! accounts with an admin role, task categories, tasks that users claim and
//! move through their lifecycle, and statistics computed client-side from
//! the fetched rows.
//!
//! ## Features
//!
//! - **Row store contract**: one async trait backed by a PostgREST endpoint or a local SQLite file
//! - **Accounts**: login, profile changes, admin-only user management
//! - **Tasks**: filtered listing, claiming, status updates by the assignee
//! - **Reports**: overview, daily trends, workload, category and personal statistics
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskboard::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod db;
pub mod libs;
