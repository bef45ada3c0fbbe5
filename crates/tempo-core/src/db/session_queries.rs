//! Session document CRUD operations and queries.

use jiff::Timestamp;
use rusqlite::{params, types::Type, OptionalExtension, Row};

use crate::{
    error::{DatabaseResultExt, Result, TempoError},
    models::{PlanDocument, SessionRecord, StoredSession},
};

const UPSERT_SESSION_SQL: &str = "INSERT INTO sessions (id, document, revision, created_at, updated_at) \
     VALUES (?1, ?2, 1, ?3, ?3) \
     ON CONFLICT(id) DO UPDATE SET document = excluded.document, \
     revision = sessions.revision + 1, updated_at = excluded.updated_at";
const SELECT_RECORD_SQL: &str =
    "SELECT id, revision, created_at, updated_at FROM sessions WHERE id = ?1";
const SELECT_SESSION_SQL: &str =
    "SELECT id, revision, created_at, updated_at, document FROM sessions WHERE id = ?1";
const LIST_SESSIONS_SQL: &str =
    "SELECT id, revision, created_at, updated_at FROM sessions ORDER BY updated_at DESC, id";
const DELETE_SESSION_SQL: &str = "DELETE FROM sessions WHERE id = ?1";

/// Reads a timestamp column stored as RFC 3339 text.
fn timestamp_column(row: &Row<'_>, index: usize) -> rusqlite::Result<Timestamp> {
    let text: String = row.get(index)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        id: row.get(0)?,
        revision: row.get::<_, i64>(1)? as u64,
        created_at: timestamp_column(row, 2)?,
        updated_at: timestamp_column(row, 3)?,
    })
}

impl super::Database {
    /// Stores `document` under `session_id`, creating the session on first
    /// save and bumping its revision afterwards.
    pub fn save_document(
        &mut self,
        session_id: &str,
        document: &PlanDocument,
    ) -> Result<SessionRecord> {
        if session_id.trim().is_empty() {
            return Err(TempoError::invalid_input("session_id").with_reason("must not be empty"));
        }
        let json = serde_json::to_string(document)?;

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        let now = Timestamp::now().to_string();
        tx.execute(UPSERT_SESSION_SQL, params![session_id, json, now])
            .db_context("Failed to store session document")?;

        let record = tx
            .query_row(SELECT_RECORD_SQL, params![session_id], record_from_row)
            .db_context("Failed to read stored session")?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(record)
    }

    /// Loads a stored session by ID.
    pub fn load_session(&self, session_id: &str) -> Result<Option<StoredSession>> {
        let row = self
            .connection
            .query_row(SELECT_SESSION_SQL, params![session_id], |row| {
                Ok((record_from_row(row)?, row.get::<_, String>(4)?))
            })
            .optional()
            .db_context("Failed to load session")?;

        row.map(|(record, json)| -> Result<StoredSession> {
            Ok(StoredSession {
                record,
                document: serde_json::from_str(&json)?,
            })
        })
        .transpose()
    }

    /// Lists stored sessions, most recently saved first.
    pub fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        let mut stmt = self
            .connection
            .prepare(LIST_SESSIONS_SQL)
            .db_context("Failed to prepare query")?;

        let records = stmt
            .query_map([], record_from_row)
            .db_context("Failed to list sessions")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read session row")?;
        Ok(records)
    }

    /// Deletes a stored session.
    ///
    /// # Errors
    ///
    /// Returns `TempoError::SessionNotFound` if nothing was stored under the
    /// ID.
    pub fn delete_session(&mut self, session_id: &str) -> Result<()> {
        let deleted = self
            .connection
            .execute(DELETE_SESSION_SQL, params![session_id])
            .db_context("Failed to delete session")?;

        if deleted == 0 {
            return Err(TempoError::SessionNotFound {
                id: session_id.to_string(),
            });
        }
        Ok(())
    }
}
