//! SQLite backend for the ghwatch monitor state.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The single connection serialises every
//! write, which is what makes the item upsert's read-compare-write safe.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
