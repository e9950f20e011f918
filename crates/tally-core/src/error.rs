//! Error types for `tally-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} must not be empty")]
  EmptyField(&'static str),

  #[error("{field} exceeds {max} characters")]
  FieldTooLong { field: &'static str, max: usize },

  #[error("identity token must be 64 lowercase hex characters, got {0:?}")]
  MalformedToken(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
