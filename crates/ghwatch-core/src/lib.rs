//! Core types and trait definitions for the ghwatch repository monitor.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the data model, the three collaborator traits ([`store::MonitorStore`],
//! [`source::RemoteSource`], [`transport::Transport`]) and the two engines
//! that drive them: the change detector and the notification dispatcher.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod detect;
pub mod dispatch;
pub mod error;
pub mod item;
pub mod message;
pub mod notification;
pub mod repository;
pub mod source;
pub mod store;
pub mod transport;
pub mod watchlist;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
