//! HTTP client for the tally server's JSON API.

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterReply {
  pub token:         String,
  pub newly_created: bool,
  pub display_name:  String,
  pub message:       String,
}

/// Reply to a scan; mirrors the server's status taxonomy.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanReply {
  Success {
    #[serde(rename = "type")]
    event:   String,
    message: String,
    person:  String,
  },
  Info {
    message: String,
  },
  NotFound {
    message: String,
  },
}

#[derive(Debug, Deserialize)]
pub struct RecordRow {
  pub display_name: String,
  pub document_id:  Option<String>,
  pub entry_local:  Option<String>,
  pub exit_local:   Option<String>,
  pub stay:         Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
  error: String,
}

// ─── Client ──────────────────────────────────────────────────────────────────

pub struct ApiClient {
  http:     reqwest::Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    Ok(Self {
      http:     reqwest::Client::builder()
        .build()
        .context("building HTTP client")?,
      base_url: config.base_url.trim_end_matches('/').to_string(),
    })
  }

  pub async fn register(
    &self,
    given_name: &str,
    family_name: &str,
    document_id: &str,
  ) -> Result<RegisterReply> {
    let resp = self
      .http
      .post(format!("{}/registrations", self.base_url))
      .json(&json!({
        "given_name": given_name,
        "family_name": family_name,
        "document_id": document_id,
      }))
      .send()
      .await
      .context("sending registration")?;

    if resp.status() == StatusCode::BAD_REQUEST {
      let err: ErrorReply = resp.json().await.context("reading error reply")?;
      bail!("registration rejected: {}", err.error);
    }
    resp
      .error_for_status()
      .context("registration failed")?
      .json()
      .await
      .context("reading registration reply")
  }

  /// Submit one decoded token. Unknown identities come back as a normal
  /// [`ScanReply::NotFound`], not an error.
  pub async fn scan(&self, token: &str) -> Result<ScanReply> {
    let resp = self
      .http
      .post(format!("{}/scans", self.base_url))
      .json(&json!({ "token": token }))
      .send()
      .await
      .context("sending scan")?;

    match resp.status() {
      StatusCode::OK | StatusCode::NOT_FOUND => {
        resp.json().await.context("reading scan reply")
      }
      StatusCode::BAD_REQUEST => {
        let err: ErrorReply = resp.json().await.context("reading error reply")?;
        bail!("scan rejected: {}", err.error);
      }
      status => bail!("server error: {status}"),
    }
  }

  pub async fn records(&self) -> Result<Vec<RecordRow>> {
    self
      .http
      .get(format!("{}/records", self.base_url))
      .send()
      .await
      .context("fetching records")?
      .error_for_status()
      .context("records listing failed")?
      .json()
      .await
      .context("reading records reply")
  }
}
