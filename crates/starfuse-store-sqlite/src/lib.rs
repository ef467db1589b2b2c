//! SQLite backend for the starfuse cache and history stores.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. One [`SqliteStore`] implements
//! both [`starfuse_core::store::CacheStore`] and
//! [`starfuse_core::store::HistoryStore`].

mod cursor;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
