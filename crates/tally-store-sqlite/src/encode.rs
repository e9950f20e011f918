//! Row mapping between `attendance` rows and the core record type.

use tally_core::record::{AttendanceRecord, IdentityToken};

use crate::Result;

/// Raw values read directly from an `attendance` row.
pub struct RawRecord {
  pub identity_token: String,
  pub given_name:     Option<String>,
  pub family_name:    Option<String>,
  pub document_id:    Option<String>,
  pub entry_time:     i64,
  pub exit_time:      i64,
}

/// Column list matching [`RawRecord::from_row`]'s ordering.
pub const RECORD_COLUMNS: &str =
  "identity_token, given_name, family_name, document_id, entry_time, exit_time";

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      identity_token: row.get(0)?,
      given_name:     row.get(1)?,
      family_name:    row.get(2)?,
      document_id:    row.get(3)?,
      entry_time:     row.get(4)?,
      exit_time:      row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<AttendanceRecord> {
    Ok(AttendanceRecord {
      token:       self.identity_token.parse::<IdentityToken>()?,
      given_name:  self.given_name,
      family_name: self.family_name,
      document_id: self.document_id,
      entry_time:  self.entry_time,
      exit_time:   self.exit_time,
    })
  }
}
