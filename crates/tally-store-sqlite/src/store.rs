//! [`SqliteStore`] — the SQLite implementation of [`AttendanceStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tally_core::{
  record::{AttendanceRecord, IdentityToken, PersonDetails},
  store::AttendanceStore,
};

use crate::{
  encode::{RECORD_COLUMNS, RawRecord},
  schema::{DESCRIPTIVE_COLUMNS, SCHEMA},
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An attendance store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All access
/// funnels through one background thread, so every write (and in particular
/// every [`AttendanceStore::apply_transition`]) observes a total order.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        add_missing_descriptive_columns(conn)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Databases created before descriptive fields existed hold only the token
/// and the two timestamps. Add any column still missing; existing rows keep
/// NULL there, which the rest of the system already tolerates.
fn add_missing_descriptive_columns(
  conn: &mut rusqlite::Connection,
) -> rusqlite::Result<()> {
  let existing: Vec<String> = conn
    .prepare("PRAGMA table_info(attendance)")?
    .query_map([], |row| row.get::<_, String>(1))?
    .collect::<rusqlite::Result<_>>()?;

  for column in DESCRIPTIVE_COLUMNS {
    if !existing.iter().any(|c| c == column) {
      tracing::info!(column, "adding missing descriptive column");
      conn.execute_batch(&format!(
        "ALTER TABLE attendance ADD COLUMN {column} TEXT"
      ))?;
    }
  }
  Ok(())
}

/// Fetch the raw row for `token`, if any. Runs inside a `call` closure.
fn fetch_raw(
  conn: &rusqlite::Connection,
  token: &str,
) -> rusqlite::Result<Option<RawRecord>> {
  conn
    .query_row(
      &format!("SELECT {RECORD_COLUMNS} FROM attendance WHERE identity_token = ?1"),
      rusqlite::params![token],
      RawRecord::from_row,
    )
    .optional()
}

// ─── AttendanceStore impl ────────────────────────────────────────────────────

impl AttendanceStore for SqliteStore {
  type Error = Error;

  async fn get(
    &self,
    token: &IdentityToken,
  ) -> Result<Option<AttendanceRecord>> {
    let token_str = token.as_str().to_owned();

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| Ok(fetch_raw(conn, &token_str)?))
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn create_if_absent(
    &self,
    token: &IdentityToken,
    details: PersonDetails,
  ) -> Result<(AttendanceRecord, bool)> {
    let token_owned = token.clone();

    let (raw, created): (RawRecord, bool) = self
      .conn
      .call(move |conn| {
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx.execute(
          "INSERT INTO attendance
             (identity_token, given_name, family_name, document_id)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (identity_token) DO NOTHING",
          rusqlite::params![
            token_owned.as_str(),
            details.given_name,
            details.family_name,
            details.document_id,
          ],
        )?;

        let raw = tx.query_row(
          &format!(
            "SELECT {RECORD_COLUMNS} FROM attendance WHERE identity_token = ?1"
          ),
          rusqlite::params![token_owned.as_str()],
          RawRecord::from_row,
        )?;

        tx.commit()?;
        Ok((raw, inserted == 1))
      })
      .await?;

    Ok((raw.into_record()?, created))
  }

  async fn apply_transition<T, F>(
    &self,
    token: &IdentityToken,
    transition: F,
  ) -> Result<Option<(T, AttendanceRecord)>>
  where
    T: Send + 'static,
    F: FnOnce(AttendanceRecord) -> (T, AttendanceRecord) + Send + 'static,
  {
    let token_owned = token.clone();

    let applied: Option<(T, AttendanceRecord)> = self
      .conn
      .call(move |conn| {
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let raw = match fetch_raw(&tx, token_owned.as_str())? {
          Some(raw) => raw,
          None => return Ok(None),
        };

        // The row was selected by token equality, so the stored key is the
        // caller's token; no re-parse needed.
        let record = AttendanceRecord {
          token:       token_owned.clone(),
          given_name:  raw.given_name,
          family_name: raw.family_name,
          document_id: raw.document_id,
          entry_time:  raw.entry_time,
          exit_time:   raw.exit_time,
        };

        let (verdict, new_record) = transition(record);

        tx.execute(
          "UPDATE attendance
             SET entry_time = ?2, exit_time = ?3
           WHERE identity_token = ?1",
          rusqlite::params![
            token_owned.as_str(),
            new_record.entry_time,
            new_record.exit_time,
          ],
        )?;

        tx.commit()?;
        Ok(Some((verdict, new_record)))
      })
      .await?;

    Ok(applied)
  }

  async fn backfill_details(
    &self,
    token: &IdentityToken,
    details: PersonDetails,
  ) -> Result<Option<AttendanceRecord>> {
    let token_owned = token.clone();

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // COALESCE keeps any value already present; timestamps untouched.
        tx.execute(
          "UPDATE attendance
             SET given_name  = COALESCE(given_name,  ?2),
                 family_name = COALESCE(family_name, ?3),
                 document_id = COALESCE(document_id, ?4)
           WHERE identity_token = ?1",
          rusqlite::params![
            token_owned.as_str(),
            details.given_name,
            details.family_name,
            details.document_id,
          ],
        )?;

        let raw = fetch_raw(&tx, token_owned.as_str())?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn list(&self) -> Result<Vec<AttendanceRecord>> {
    let raws: Vec<RawRecord> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS} FROM attendance
           ORDER BY family_name, given_name, identity_token"
        ))?;
        let rows = stmt
          .query_map([], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }
}
