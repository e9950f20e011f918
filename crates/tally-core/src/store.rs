//! The `AttendanceStore` trait.
//!
//! Implemented by storage backends (e.g. `tally-store-sqlite`). Higher layers
//! (`tally-api`, the services in this crate) depend on this abstraction, not
//! on any concrete backend.
//!
//! The store is the single writer for attendance records. All mutation goes
//! through [`AttendanceStore::apply_transition`], which must serialize
//! concurrent transitions for a given token — no two concurrent scans may
//! both observe `entry_time == 0` and both win the entry transition.

use std::future::Future;

use crate::record::{AttendanceRecord, IdentityToken, PersonDetails};

/// Abstraction over an attendance record store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
///
/// Unknown tokens are reported as `None`, never as a default/zero record —
/// callers must be able to distinguish "no such identity" from "identity
/// with zero timestamps". `Self::Error` is reserved for genuine
/// infrastructure failures.
pub trait AttendanceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the record for `token`, or `None` if it was never registered.
  fn get<'a>(
    &'a self,
    token: &'a IdentityToken,
  ) -> impl Future<Output = Result<Option<AttendanceRecord>, Self::Error>> + Send + 'a;

  /// Atomic upsert: create a zero-timestamp record with the given details if
  /// absent, otherwise return the existing record unchanged.
  ///
  /// The `bool` is `true` only for the call that actually created the row;
  /// two concurrent calls with the same token must not both observe `true`.
  fn create_if_absent<'a>(
    &'a self,
    token: &'a IdentityToken,
    details: PersonDetails,
  ) -> impl Future<Output = Result<(AttendanceRecord, bool), Self::Error>> + Send + 'a;

  /// Atomically fetch the record, apply the pure `transition` closure, and
  /// persist the result, returning the closure's verdict alongside the
  /// persisted record. `None` if the token is unknown (nothing persisted).
  ///
  /// Transitions for a single token observe a total order; transitions on
  /// different tokens do not block each other beyond backend limits.
  fn apply_transition<'a, T, F>(
    &'a self,
    token: &'a IdentityToken,
    transition: F,
  ) -> impl Future<Output = Result<Option<(T, AttendanceRecord)>, Self::Error>> + Send + 'a
  where
    T: Send + 'static,
    F: FnOnce(AttendanceRecord) -> (T, AttendanceRecord) + Send + 'static;

  /// Fill in descriptive fields that are currently unset; fields already
  /// present are left alone, and timestamps are never touched. `None` if the
  /// token is unknown.
  fn backfill_details<'a>(
    &'a self,
    token: &'a IdentityToken,
    details: PersonDetails,
  ) -> impl Future<Output = Result<Option<AttendanceRecord>, Self::Error>> + Send + 'a;

  /// All records, for listing and reporting.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + '_;
}
