//! GitHub REST API client for ghwatch.
//!
//! [`GitHubClient`] implements [`ghwatch_core::source::RemoteSource`]. It is a
//! thin GET wrapper: every non-success status or malformed body surfaces as
//! an [`Error`], and nothing is retried.

mod client;
mod wire;

pub mod error;

pub use client::{DEFAULT_API_URL, GitHubClient, GitHubConfig, Viewer};
pub use error::{Error, Result};
