//! Identity digest — the pure function mapping a person's descriptive triple
//! to their stable identity token.
//!
//! The token is the SHA-256 of the three fields concatenated in fixed order,
//! hex-encoded. Determinism is what makes registration idempotent: the same
//! triple always lands on the same record.

use sha2::{Digest as _, Sha256};

use crate::record::IdentityToken;

/// Derive the identity token for `(given_name, family_name, document_id)`.
///
/// Total over all strings — empty fields are legal and simply change the
/// digest input. No normalisation is applied; "Ana"/"Lopez" and "ana"/"lopez"
/// are different identities.
pub fn identity_token(
  given_name: &str,
  family_name: &str,
  document_id: &str,
) -> IdentityToken {
  let mut hasher = Sha256::new();
  hasher.update(given_name.as_bytes());
  hasher.update(family_name.as_bytes());
  hasher.update(document_id.as_bytes());
  IdentityToken::from_digest_hex(hex::encode(hasher.finalize()))
}
