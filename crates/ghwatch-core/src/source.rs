//! The `RemoteSource` trait — read access to the code-hosting platform.

use std::future::Future;

use crate::{
  item::{RemoteItem, StateFilter},
  repository::RemoteRepository,
};

/// Listing and metadata capabilities of the remote platform.
///
/// Implementations are expected to apply a bounded request timeout and to
/// surface every failure (network, non-success status, malformed body) as an
/// error rather than retrying.
pub trait RemoteSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Issues of `repo` (`owner/name`) in the given state. Pull requests are
  /// never included.
  fn fetch_issues<'a>(
    &'a self,
    repo: &'a str,
    state: StateFilter,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<RemoteItem>, Self::Error>> + Send + 'a;

  /// Pull requests of `repo` (`owner/name`) in the given state.
  fn fetch_pull_requests<'a>(
    &'a self,
    repo: &'a str,
    state: StateFilter,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<RemoteItem>, Self::Error>> + Send + 'a;

  fn fetch_repository<'a>(
    &'a self,
    owner: &'a str,
    name: &'a str,
  ) -> impl Future<Output = Result<RemoteRepository, Self::Error>> + Send + 'a;

  /// Repositories of the authenticated user, most recently pushed first.
  fn fetch_viewer_repositories(
    &self,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<RemoteRepository>, Self::Error>> + Send + '_;
}
