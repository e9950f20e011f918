//! Handler for `POST /scans` — one decoded QR token per request.
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | entry recorded | 200 | `{"status":"success","type":"entry","timestamp":...}` |
//! | exit recorded | 200 | `{"status":"success","type":"exit","timestamp":...}` |
//! | cycle complete | 200 | `{"status":"info","type":"already_completed"}` |
//! | unknown token | 404 | `{"status":"not_found"}` |
//! | malformed token | 400 | `{"error":...}` |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tally_core::{
  record::IdentityToken,
  scan::{ScanOutcome, process_scan},
  store::AttendanceStore,
};

use crate::{error::ApiError, local_datetime};

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScanBody {
  pub token: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  Entry,
  Exit,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanReply {
  Success {
    #[serde(rename = "type")]
    event:     EventKind,
    /// Unix seconds, as stored.
    timestamp: i64,
    /// The same instant in the server's display timezone.
    recorded_at: String,
    person:    String,
    message:   String,
  },
  Info {
    #[serde(rename = "type")]
    event:   &'static str,
    message: String,
  },
  NotFound {
    message: String,
  },
}

// ─── Handler ─────────────────────────────────────────────────────────────────

/// `POST /scans`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ScanBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let token: IdentityToken = body
    .token
    .parse()
    .map_err(|e: tally_core::Error| ApiError::BadRequest(e.to_string()))?;

  let report = process_scan(store.as_ref(), &token, Utc::now().timestamp())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let person = report
    .record
    .as_ref()
    .map(|r| r.display_name())
    .unwrap_or_default();

  let (status, reply) = match report.outcome {
    ScanOutcome::Entry { recorded_at } => {
      let local = local_datetime(recorded_at).unwrap_or_default();
      (
        StatusCode::OK,
        ScanReply::Success {
          event: EventKind::Entry,
          timestamp: recorded_at,
          recorded_at: local.clone(),
          message: format!("Entry recorded: {local}"),
          person,
        },
      )
    }
    ScanOutcome::Exit { recorded_at } => {
      let local = local_datetime(recorded_at).unwrap_or_default();
      (
        StatusCode::OK,
        ScanReply::Success {
          event: EventKind::Exit,
          timestamp: recorded_at,
          recorded_at: local.clone(),
          message: format!("Exit recorded: {local}"),
          person,
        },
      )
    }
    ScanOutcome::AlreadyCompleted { .. } => (
      StatusCode::OK,
      ScanReply::Info {
        event:   "already_completed",
        message: "Attendance cycle (entry/exit) already completed.".into(),
      },
    ),
    ScanOutcome::UnknownIdentity => (
      StatusCode::NOT_FOUND,
      ScanReply::NotFound {
        message: "Identity not registered.".into(),
      },
    ),
  };

  Ok((status, Json(reply)))
}
