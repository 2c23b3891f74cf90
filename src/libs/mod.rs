//! Domain types, validation and pure reporting logic.
//!
//! Nothing in here talks to a row store directly except [`auth`], which
//! looks up credentials through any [`RowStore`](crate::api::RowStore).
//! The rest is plain data: records, partial updates, the error taxonomy,
//! the user-facing messages and the statistics computed over fetched rows.
//!
//! ## Usage
//!
//! ```rust
//! use taskboard::libs::stats::completion_rate;
//!
//! assert_eq!(completion_rate(6, 10), 60);
//! assert_eq!(completion_rate(0, 0), 0);
//! ```

pub mod auth;
pub mod category;
pub mod config;
pub mod data_storage;
pub mod error;
pub mod messages;
pub mod response;
pub mod row_id;
pub mod session;
pub mod stats;
pub mod task;
pub mod timestamp;
pub mod user;
pub mod view;
