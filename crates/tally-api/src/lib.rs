//! JSON REST API for the tally attendance tracker.
//!
//! Exposes an axum [`Router`] backed by any
//! [`tally_core::store::AttendanceStore`]. All business decisions happen in
//! the core services; handlers translate outcomes to the wire and never
//! re-derive the cycle logic.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod records;
pub mod registrations;
pub mod scans;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use chrono::{Local, TimeZone as _};
use tally_core::store::AttendanceStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: AttendanceStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/registrations", post(registrations::create::<S>))
    .route("/scans", post(scans::create::<S>))
    .route("/records", get(records::list::<S>))
    .route("/records/{token}", get(records::get_one::<S>))
    .with_state(store)
}

/// Render a stored Unix timestamp in the server's display timezone.
/// `0` is the "unset" sentinel and renders as nothing.
pub(crate) fn local_datetime(timestamp: i64) -> Option<String> {
  if timestamp == 0 {
    return None;
  }
  Local
    .timestamp_opt(timestamp, 0)
    .single()
    .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

// ─── Integration tests ────────────────────────────────────────────────────────
