//! `sendMessage` client for the Telegram Bot API.

use std::time::Duration;

use ghwatch_core::transport::Transport;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Connection settings for the Bot API.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
  pub api_url:   String,
  pub bot_token: String,
  pub chat_id:   String,
  pub timeout:   Duration,
}

impl TelegramConfig {
  pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
    Self {
      api_url:   DEFAULT_API_URL.to_owned(),
      bot_token: bot_token.into(),
      chat_id:   chat_id.into(),
      timeout:   Duration::from_secs(10),
    }
  }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
  chat_id:                  &'a str,
  text:                     &'a str,
  parse_mode:               &'static str,
  disable_web_page_preview: bool,
}

/// The Bot API response envelope; `result` is ignored.
#[derive(Debug, Deserialize)]
struct ApiResponse {
  ok:          bool,
  #[serde(default)]
  description: Option<String>,
}

/// Pushes HTML messages to a single chat.
#[derive(Clone)]
pub struct TelegramTransport {
  client: Client,
  config: TelegramConfig,
}

impl TelegramTransport {
  pub fn new(config: TelegramConfig) -> Result<Self> {
    if config.bot_token.trim().is_empty() || config.chat_id.trim().is_empty() {
      return Err(Error::MissingCredentials);
    }
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn send_url(&self) -> String {
    format!(
      "{}/bot{}/sendMessage",
      self.config.api_url.trim_end_matches('/'),
      self.config.bot_token
    )
  }

  fn body<'a>(&'a self, text: &'a str) -> SendMessage<'a> {
    SendMessage {
      chat_id: &self.config.chat_id,
      text,
      parse_mode: "HTML",
      disable_web_page_preview: true,
    }
  }
}

/// Decide whether a Bot API response means the message was accepted.
fn interpret(status: u16, body: &str) -> Result<()> {
  match serde_json::from_str::<ApiResponse>(body) {
    Ok(ApiResponse { ok: true, .. }) => Ok(()),
    Ok(ApiResponse { description, .. }) => Err(Error::Rejected {
      status,
      description: description.unwrap_or_else(|| "no description".to_owned()),
    }),
    Err(_) => Err(Error::Rejected { status, description: body.chars().take(200).collect() }),
  }
}

impl Transport for TelegramTransport {
  type Error = Error;

  async fn deliver(&self, text: &str) -> Result<()> {
    let resp = self.client.post(self.send_url()).json(&self.body(text)).send().await?;
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    debug!(status, "telegram sendMessage");
    interpret(status, &body)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn transport() -> TelegramTransport {
    TelegramTransport::new(TelegramConfig::new("123:abc", "-1001")).unwrap()
  }

  #[test]
  fn missing_credentials_rejected() {
    assert!(matches!(
      TelegramTransport::new(TelegramConfig::new("", "1")),
      Err(Error::MissingCredentials)
    ));
    assert!(matches!(
      TelegramTransport::new(TelegramConfig::new("t", " ")),
      Err(Error::MissingCredentials)
    ));
  }

  #[test]
  fn send_url_embeds_token() {
    assert_eq!(transport().send_url(), "https://api.telegram.org/bot123:abc/sendMessage");
  }

  #[test]
  fn body_requests_html_without_previews() {
    let t = transport();
    let json = serde_json::to_value(t.body("<b>hi</b>")).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "chat_id": "-1001",
        "text": "<b>hi</b>",
        "parse_mode": "HTML",
        "disable_web_page_preview": true
      })
    );
  }

  #[test]
  fn ok_response_is_success() {
    assert!(interpret(200, r#"{"ok":true,"result":{"message_id":5}}"#).is_ok());
  }

  #[test]
  fn not_ok_response_carries_description() {
    let err = interpret(400, r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
      .unwrap_err();
    assert_eq!(
      err.to_string(),
      "telegram rejected message (400): Bad Request: chat not found"
    );
  }

  #[test]
  fn non_json_response_is_rejection() {
    assert!(matches!(interpret(502, "<html>bad gateway</html>"), Err(Error::Rejected { status: 502, .. })));
  }
}
