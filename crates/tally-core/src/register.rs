//! Registration service — idempotent enrollment of a person.
//!
//! Computes the identity token and upserts a zero-state record. Registering
//! an already-known identity never resets timestamps; it only backfills
//! descriptive fields that an older record is missing.

use serde::Deserialize;
use thiserror::Error;

use crate::{
  Error,
  digest::identity_token,
  record::{AttendanceRecord, IdentityToken, PersonDetails},
  store::AttendanceStore,
};

// Field limits carried over from the legacy schema
// (VARCHAR(100)/VARCHAR(100)/VARCHAR(20)).
const NAME_MAX: usize = 100;
const DOCUMENT_MAX: usize = 20;

// ─── Input ───────────────────────────────────────────────────────────────────

/// A registration request: the descriptive triple the token is derived from.
#[derive(Debug, Clone, Deserialize)]
pub struct Enrollment {
  pub given_name:  String,
  pub family_name: String,
  pub document_id: String,
}

impl Enrollment {
  /// The triple with surrounding whitespace stripped. Everything derived
  /// from an enrollment (validation, the token, the stored details) sees
  /// this form, so `" Ana "` and `"Ana"` land on the same identity.
  fn stripped(&self) -> (&str, &str, &str) {
    (
      self.given_name.trim(),
      self.family_name.trim(),
      self.document_id.trim(),
    )
  }

  /// Reject malformed input before it reaches the store.
  pub fn validate(&self) -> Result<(), Error> {
    fn check(
      field: &'static str,
      value: &str,
      max: usize,
    ) -> Result<(), Error> {
      if value.is_empty() {
        return Err(Error::EmptyField(field));
      }
      if value.chars().count() > max {
        return Err(Error::FieldTooLong { field, max });
      }
      Ok(())
    }

    let (given, family, document) = self.stripped();
    check("given_name", given, NAME_MAX)?;
    check("family_name", family, NAME_MAX)?;
    check("document_id", document, DOCUMENT_MAX)?;
    Ok(())
  }

  pub fn token(&self) -> IdentityToken {
    let (given, family, document) = self.stripped();
    identity_token(given, family, document)
  }

  fn details(&self) -> PersonDetails {
    let (given, family, document) = self.stripped();
    PersonDetails {
      given_name:  Some(given.to_owned()),
      family_name: Some(family.to_owned()),
      document_id: Some(document.to_owned()),
    }
  }
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// The result of a registration. `token` is what downstream QR rendering
/// encodes; `newly_created` distinguishes "freshly registered" from
/// "already existed".
#[derive(Debug, Clone)]
pub struct Registration {
  pub token:         IdentityToken,
  pub newly_created: bool,
  pub record:        AttendanceRecord,
}

// ─── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RegisterError<E: std::error::Error> {
  /// Rejected input; never reached the store.
  #[error(transparent)]
  Invalid(#[from] Error),

  #[error("store error: {0}")]
  Store(E),
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Register (or re-register) a person.
///
/// Idempotent: the same triple always lands on the same record, and existing
/// timestamps are never overwritten. A pre-existing record that lacks
/// descriptive fields gets them backfilled from this enrollment.
pub async fn register<S: AttendanceStore>(
  store: &S,
  enrollment: &Enrollment,
) -> Result<Registration, RegisterError<S::Error>> {
  enrollment.validate()?;

  let token = enrollment.token();
  let (record, newly_created) = store
    .create_if_absent(&token, enrollment.details())
    .await
    .map_err(RegisterError::Store)?;

  let record = if !newly_created && record.details_missing() {
    store
      .backfill_details(&token, enrollment.details())
      .await
      .map_err(RegisterError::Store)?
      .unwrap_or(record)
  } else {
    record
  };

  if newly_created {
    tracing::info!(token = %token.short(), "registered new identity");
  } else {
    tracing::debug!(token = %token.short(), "identity already registered");
  }

  Ok(Registration { token, newly_created, record })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn enrollment(given: &str, family: &str, document: &str) -> Enrollment {
    Enrollment {
      given_name:  given.into(),
      family_name: family.into(),
      document_id: document.into(),
    }
  }

  #[test]
  fn fields_at_the_limit_pass() {
    let e =
      enrollment(&"a".repeat(100), &"b".repeat(100), &"1".repeat(20));
    assert!(e.validate().is_ok());
  }

  #[test]
  fn overlong_fields_are_rejected() {
    let e = enrollment(&"a".repeat(101), "Lopez", "12345678");
    assert!(matches!(
      e.validate(),
      Err(Error::FieldTooLong { field: "given_name", max: 100 })
    ));

    let e = enrollment("Ana", "Lopez", &"1".repeat(21));
    assert!(matches!(
      e.validate(),
      Err(Error::FieldTooLong { field: "document_id", max: 20 })
    ));
  }

  #[test]
  fn surrounding_whitespace_does_not_change_the_identity() {
    let plain = enrollment("Ana", "Lopez", "12345678");
    let padded = enrollment(" Ana ", "Lopez\t", " 12345678 ");
    assert_eq!(padded.token(), plain.token());
    assert_eq!(
      padded.details().given_name.as_deref(),
      Some("Ana")
    );
  }
}
