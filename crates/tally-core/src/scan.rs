//! Scan processor — the hot path exercising the state machine.
//!
//! Each decoded token event maps to one call of [`process_scan`]. The fetch,
//! the cycle decision, and the persist all happen inside the store's atomic
//! transition unit, so repeated or concurrent scans of the same token can
//! never both win the same transition.

use serde::Serialize;

use crate::{
  cycle::{Transition, advance},
  record::{AttendanceRecord, IdentityToken},
  store::AttendanceStore,
};

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// What one scan did. All variants are ordinary values, not errors —
/// `AlreadyCompleted` and `UnknownIdentity` are legitimate outcomes that
/// every transport must keep distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanOutcome {
  Entry { recorded_at: i64 },
  Exit { recorded_at: i64 },
  AlreadyCompleted { entered_at: i64, exited_at: i64 },
  UnknownIdentity,
}

impl ScanOutcome {
  /// The timestamp this scan recorded, if it recorded one.
  pub fn recorded_at(&self) -> Option<i64> {
    match self {
      Self::Entry { recorded_at } | Self::Exit { recorded_at } => {
        Some(*recorded_at)
      }
      _ => None,
    }
  }
}

/// Outcome plus the record it applies to, for human-facing messages.
/// `record` is `None` only for [`ScanOutcome::UnknownIdentity`].
#[derive(Debug, Clone)]
pub struct ScanReport {
  pub outcome: ScanOutcome,
  pub record:  Option<AttendanceRecord>,
}

// ─── Processor ───────────────────────────────────────────────────────────────

/// Process one decoded token event at time `now` (Unix seconds).
///
/// Unknown tokens mutate nothing. `now` is injected so the decision logic
/// stays pure and testable.
pub async fn process_scan<S: AttendanceStore>(
  store: &S,
  token: &IdentityToken,
  now: i64,
) -> Result<ScanReport, S::Error> {
  let applied = store
    .apply_transition(token, move |record| advance(record, now))
    .await?;

  let Some((transition, record)) = applied else {
    tracing::debug!(token = %token.short(), "scan for unknown identity");
    return Ok(ScanReport { outcome: ScanOutcome::UnknownIdentity, record: None });
  };

  let outcome = match transition {
    Transition::Entry(at) => ScanOutcome::Entry { recorded_at: at },
    Transition::Exit(at) => ScanOutcome::Exit { recorded_at: at },
    Transition::AlreadyComplete => ScanOutcome::AlreadyCompleted {
      entered_at: record.entry_time,
      exited_at:  record.exit_time,
    },
  };

  tracing::info!(token = %token.short(), ?outcome, "scan processed");
  Ok(ScanReport { outcome, record: Some(record) })
}
