//! Async HTTP client wrapping the GitHub REST API.

use std::time::Duration;

use ghwatch_core::{
  item::{RemoteItem, StateFilter},
  repository::RemoteRepository,
  source::RemoteSource,
};
use reqwest::{Client, header};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
  Error, Result,
  wire::{RawItem, RawRepo},
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub rejects `per_page` above this.
const MAX_PER_PAGE: u32 = 100;

/// Connection settings for the GitHub API.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
  pub api_url:    String,
  pub token:      String,
  pub user_agent: String,
  pub timeout:    Duration,
}

impl GitHubConfig {
  pub fn new(token: impl Into<String>) -> Self {
    Self {
      api_url:    DEFAULT_API_URL.to_owned(),
      token:      token.into(),
      user_agent: concat!("ghwatch/", env!("CARGO_PKG_VERSION")).to_owned(),
      timeout:    Duration::from_secs(30),
    }
  }
}

/// The authenticated user, as shown on the dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct Viewer {
  pub login:        String,
  pub name:         Option<String>,
  #[serde(default)]
  pub public_repos: u64,
  #[serde(default)]
  pub followers:    u64,
  #[serde(default)]
  pub following:    u64,
}

/// Async client for the GitHub REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GitHubClient {
  client: Client,
  config: GitHubConfig,
}

impl GitHubClient {
  pub fn new(config: GitHubConfig) -> Result<Self> {
    if config.token.trim().is_empty() {
      return Err(Error::MissingToken);
    }
    let client = Client::builder()
      .timeout(config.timeout)
      .user_agent(config.user_agent.clone())
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
  }

  /// `GET {path}` with auth headers, decoded as JSON.
  async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
    debug!(path, "GitHub GET");
    let resp = self
      .client
      .get(self.url(path))
      .header(header::AUTHORIZATION, format!("token {}", self.config.token))
      .header(header::ACCEPT, "application/vnd.github.v3+json")
      .query(query)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), endpoint: path.to_owned(), body });
    }
    Ok(resp.json().await?)
  }

  fn listing_query(state: StateFilter, limit: u32) -> [(&'static str, String); 2] {
    [
      ("state", state.to_string()),
      ("per_page", limit.clamp(1, MAX_PER_PAGE).to_string()),
    ]
  }

  /// `GET /user`
  pub async fn fetch_viewer(&self) -> Result<Viewer> { self.get("/user", &[]).await }
}

impl RemoteSource for GitHubClient {
  type Error = Error;

  /// `GET /repos/{repo}/issues`, minus entries that are pull requests.
  async fn fetch_issues(&self, repo: &str, state: StateFilter, limit: u32) -> Result<Vec<RemoteItem>> {
    let raw: Vec<RawItem> =
      self.get(&format!("/repos/{repo}/issues"), &Self::listing_query(state, limit)).await?;
    Ok(raw.into_iter().filter(|i| !i.is_pull_request()).map(RawItem::into_item).collect())
  }

  /// `GET /repos/{repo}/pulls`
  async fn fetch_pull_requests(
    &self,
    repo: &str,
    state: StateFilter,
    limit: u32,
  ) -> Result<Vec<RemoteItem>> {
    let raw: Vec<RawItem> =
      self.get(&format!("/repos/{repo}/pulls"), &Self::listing_query(state, limit)).await?;
    Ok(raw.into_iter().map(RawItem::into_item).collect())
  }

  /// `GET /repos/{owner}/{name}`
  async fn fetch_repository(&self, owner: &str, name: &str) -> Result<RemoteRepository> {
    let raw: RawRepo = self.get(&format!("/repos/{owner}/{name}"), &[]).await?;
    Ok(raw.into_repository())
  }

  /// `GET /user/repos?sort=pushed`
  async fn fetch_viewer_repositories(&self, limit: u32) -> Result<Vec<RemoteRepository>> {
    let raw: Vec<RawRepo> = self
      .get(
        "/user/repos",
        &[
          ("per_page", limit.clamp(1, MAX_PER_PAGE).to_string()),
          ("sort", "pushed".to_owned()),
        ],
      )
      .await?;
    Ok(raw.into_iter().map(RawRepo::into_repository).collect())
  }
}
