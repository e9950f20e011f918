//! The attendance record — the sole persistent entity.
//!
//! One record per registered identity. Descriptive fields are optional so the
//! store stays compatible with records created before they existed; only the
//! token and the two timestamps carry meaning for the attendance cycle.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identity token ──────────────────────────────────────────────────────────

/// A 64-character lowercase hex digest uniquely identifying a registered
/// person. Doubles as the primary key and as the QR payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityToken(String);

impl IdentityToken {
  /// Wrap a string already known to be 64 lowercase hex characters.
  /// Only the digest module produces such strings.
  pub(crate) fn from_digest_hex(hex: String) -> Self {
    debug_assert!(hex.len() == 64);
    Self(hex)
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// First eight characters, for compact human-facing display.
  pub fn short(&self) -> &str { &self.0[..8] }
}

impl FromStr for IdentityToken {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let ok = s.len() == 64
      && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if ok {
      Ok(Self(s.to_owned()))
    } else {
      Err(Error::MalformedToken(s.to_owned()))
    }
  }
}

impl TryFrom<String> for IdentityToken {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<IdentityToken> for String {
  fn from(t: IdentityToken) -> String { t.0 }
}

impl fmt::Display for IdentityToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Descriptive fields ──────────────────────────────────────────────────────

/// The optional descriptive triple stored alongside a record. Never used for
/// lookup — the token alone identifies a person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDetails {
  pub given_name:  Option<String>,
  pub family_name: Option<String>,
  pub document_id: Option<String>,
}

impl PersonDetails {
  pub fn is_empty(&self) -> bool {
    self.given_name.is_none()
      && self.family_name.is_none()
      && self.document_id.is_none()
  }
}

// ─── Cycle stage ─────────────────────────────────────────────────────────────

/// Where a stored record sits in its attendance cycle. Computed from the
/// timestamps, never stored. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStage {
  AwaitingEntry,
  AwaitingExit,
  Completed,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One person's attendance state. Created at registration with both
/// timestamps zero; mutated exactly twice by scan transitions, then terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
  pub token:       IdentityToken,
  pub given_name:  Option<String>,
  pub family_name: Option<String>,
  pub document_id: Option<String>,
  /// Unix seconds; `0` means "not yet entered".
  pub entry_time:  i64,
  /// Unix seconds; `0` means "not yet exited". Non-zero implies
  /// `entry_time` is non-zero.
  pub exit_time:   i64,
}

impl AttendanceRecord {
  /// A freshly registered record: zero timestamps, whatever details the
  /// caller supplied.
  pub fn fresh(token: IdentityToken, details: PersonDetails) -> Self {
    Self {
      token,
      given_name:  details.given_name,
      family_name: details.family_name,
      document_id: details.document_id,
      entry_time:  0,
      exit_time:   0,
    }
  }

  pub fn stage(&self) -> CycleStage {
    if self.entry_time == 0 {
      CycleStage::AwaitingEntry
    } else if self.exit_time == 0 {
      CycleStage::AwaitingExit
    } else {
      CycleStage::Completed
    }
  }

  pub fn details(&self) -> PersonDetails {
    PersonDetails {
      given_name:  self.given_name.clone(),
      family_name: self.family_name.clone(),
      document_id: self.document_id.clone(),
    }
  }

  /// True if any descriptive field is still unset — a record created before
  /// descriptive fields existed, or by a bare-token import.
  pub fn details_missing(&self) -> bool {
    self.given_name.is_none()
      || self.family_name.is_none()
      || self.document_id.is_none()
  }

  /// Human-facing name: "Given Family", or the shortened token when the
  /// record predates descriptive fields.
  pub fn display_name(&self) -> String {
    match (&self.given_name, &self.family_name) {
      (Some(g), Some(f)) => format!("{g} {f}"),
      _ => format!("({}…)", self.token.short()),
    }
  }

  /// Seconds between entry and exit, once both are recorded.
  pub fn stay_seconds(&self) -> Option<i64> {
    (self.entry_time > 0 && self.exit_time > 0)
      .then(|| self.exit_time - self.entry_time)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn token_parses_lowercase_hex() {
    let s = "a".repeat(64);
    let t: IdentityToken = s.parse().unwrap();
    assert_eq!(t.as_str().len(), 64);
    assert_eq!(t.short(), "aaaaaaaa");
  }

  #[test]
  fn token_rejects_wrong_length_and_alphabet() {
    assert!("abc".parse::<IdentityToken>().is_err());
    assert!("A".repeat(64).parse::<IdentityToken>().is_err());
    assert!("g".repeat(64).parse::<IdentityToken>().is_err());
  }

  #[test]
  fn stage_follows_timestamps() {
    let token: IdentityToken = "0".repeat(64).parse().unwrap();
    let mut rec = AttendanceRecord::fresh(token, PersonDetails::default());
    assert_eq!(rec.stage(), CycleStage::AwaitingEntry);

    rec.entry_time = 100;
    assert_eq!(rec.stage(), CycleStage::AwaitingExit);
    assert_eq!(rec.stay_seconds(), None);

    rec.exit_time = 160;
    assert_eq!(rec.stage(), CycleStage::Completed);
    assert_eq!(rec.stay_seconds(), Some(60));
  }

  #[test]
  fn display_name_falls_back_to_short_token() {
    let token: IdentityToken = "ab".repeat(32).parse().unwrap();
    let rec = AttendanceRecord::fresh(token, PersonDetails::default());
    assert!(rec.display_name().contains("abababab"));
  }
}
