//! Handler for `POST /registrations`.
//!
//! Body: `{"given_name":"...","family_name":"...","document_id":"..."}`.
//! Returns `201` when the identity was freshly created, `200` when it already
//! existed (and its descriptive fields were backfilled if missing). The
//! returned token is what the caller encodes into a QR image.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tally_core::{
  register::{Enrollment, RegisterError, register},
  store::AttendanceStore,
};

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct RegisterReply {
  pub token:         String,
  pub newly_created: bool,
  pub display_name:  String,
  pub message:       String,
}

/// `POST /registrations`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<Enrollment>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let registration = register(store.as_ref(), &body).await.map_err(|e| match e {
    RegisterError::Invalid(e) => ApiError::BadRequest(e.to_string()),
    RegisterError::Store(e) => ApiError::Store(Box::new(e)),
  })?;

  let (status, message) = if registration.newly_created {
    (StatusCode::CREATED, "Registered.".to_string())
  } else {
    (
      StatusCode::OK,
      "Already registered; same token as before.".to_string(),
    )
  };

  Ok((
    status,
    Json(RegisterReply {
      token: registration.token.to_string(),
      newly_created: registration.newly_created,
      display_name: registration.record.display_name(),
      message,
    }),
  ))
}
