//! Handlers for `/records` — the admin/report view over stored records.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/records` | All records, ordered by family name |
//! | `GET`  | `/records/{token}` | 404 if not found, 400 if malformed |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Serialize;
use tally_core::{
  record::{AttendanceRecord, CycleStage, IdentityToken},
  store::AttendanceStore,
};

use crate::{error::ApiError, local_datetime};

// ─── View type ───────────────────────────────────────────────────────────────

/// A record as shown in listings: raw timestamps plus their localized
/// rendering and the stay duration once both scans happened.
#[derive(Debug, Serialize)]
pub struct RecordView {
  pub token:        String,
  pub given_name:   Option<String>,
  pub family_name:  Option<String>,
  pub document_id:  Option<String>,
  pub display_name: String,
  pub stage:        CycleStage,
  pub entry_time:   i64,
  pub exit_time:    i64,
  pub entry_local:  Option<String>,
  pub exit_local:   Option<String>,
  pub stay:         Option<String>,
}

impl From<AttendanceRecord> for RecordView {
  fn from(rec: AttendanceRecord) -> Self {
    Self {
      display_name: rec.display_name(),
      stage:        rec.stage(),
      entry_local:  local_datetime(rec.entry_time),
      exit_local:   local_datetime(rec.exit_time),
      stay:         rec.stay_seconds().map(format_stay),
      token:        rec.token.to_string(),
      given_name:   rec.given_name,
      family_name:  rec.family_name,
      document_id:  rec.document_id,
      entry_time:   rec.entry_time,
      exit_time:    rec.exit_time,
    }
  }
}

/// "1h 23m 45s" rendering of a stay length.
pub fn format_stay(total_seconds: i64) -> String {
  let hours = total_seconds / 3600;
  let minutes = (total_seconds % 3600) / 60;
  let seconds = total_seconds % 60;
  format!("{hours}h {minutes}m {seconds}s")
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /records`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<RecordView>>, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let records = store
    .list()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(records.into_iter().map(RecordView::from).collect()))
}

/// `GET /records/{token}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(token): Path<String>,
) -> Result<Json<RecordView>, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let token: IdentityToken = token
    .parse()
    .map_err(|e: tally_core::Error| ApiError::BadRequest(e.to_string()))?;

  let record = store
    .get(&token)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("record {token} not found")))?;

  Ok(Json(RecordView::from(record)))
}
