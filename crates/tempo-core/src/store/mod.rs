//! Local persistence for session plan documents.
//!
//! [`DocumentStore`] is the async face of [`crate::db::Database`]: every call
//! opens a connection on the blocking pool, so the store itself is just a
//! path and can be cloned freely. [`SessionStore`] binds a store to one
//! session ID and is what an [`crate::autosave::AutosaveQueue`] writes
//! through.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tempo_core::{models::PlanDocument, store::StoreBuilder};
//!
//! # async fn example() -> tempo_core::Result<()> {
//! let store = StoreBuilder::new()
//!     .with_database_path(Some("sessions.db"))
//!     .build()
//!     .await?;
//!
//! let record = store.save_document("monday", &PlanDocument::default()).await?;
//! assert_eq!(record.revision, 1);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::task;

use crate::{
    db::Database,
    error::{join_error, Result, TempoError},
    models::{PlanDocument, SessionRecord, StoredSession},
};

mod backend;
mod builder;

pub use backend::SessionStore;
pub use builder::StoreBuilder;

/// Parameters for permanently deleting a stored session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSession {
    pub id: String,
    /// Must be true; deletion cannot be undone
    #[serde(default)]
    pub confirmed: bool,
}

/// SQLite-backed document store.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    db_path: PathBuf,
}

impl DocumentStore {
    pub(crate) fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Path of the underlying database file.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Binds this store to one session for use as a save backend.
    pub fn session(&self, session_id: impl Into<String>) -> SessionStore {
        SessionStore::for_session(self.clone(), session_id)
    }

    /// Stores a document, returning the updated session metadata.
    pub async fn save_document(
        &self,
        session_id: &str,
        document: &PlanDocument,
    ) -> Result<SessionRecord> {
        let db_path = self.db_path.clone();
        let session_id = session_id.to_string();
        let document = document.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.save_document(&session_id, &document)
        })
        .await
        .map_err(join_error)?
    }

    /// Loads a stored session.
    pub async fn load_session(&self, session_id: &str) -> Result<Option<StoredSession>> {
        let db_path = self.db_path.clone();
        let session_id = session_id.to_string();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.load_session(&session_id)
        })
        .await
        .map_err(join_error)?
    }

    /// Loads only the document of a stored session.
    ///
    /// # Errors
    ///
    /// Returns `TempoError::SessionNotFound` if nothing is stored under
    /// `session_id`
    pub async fn load_document(&self, session_id: &str) -> Result<PlanDocument> {
        self.load_session(session_id)
            .await?
            .map(|stored| stored.document)
            .ok_or_else(|| TempoError::SessionNotFound {
                id: session_id.to_string(),
            })
    }

    /// Lists stored sessions, most recently saved first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        let db_path = self.db_path.clone();

        task::spawn_blocking(move || {
            let db = Database::new(&db_path)?;
            db.list_sessions()
        })
        .await
        .map_err(join_error)?
    }

    /// Permanently deletes a stored session.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let db_path = self.db_path.clone();
        let session_id = session_id.to_string();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            db.delete_session(&session_id)
        })
        .await
        .map_err(join_error)?
    }

    /// Deletes a session after checking the confirmation flag, returning the
    /// metadata of what was removed.
    ///
    /// # Errors
    ///
    /// Returns `TempoError::InvalidInput` if `confirmed` is false
    /// Returns `TempoError::SessionNotFound` if the session does not exist
    pub async fn delete_confirmed(&self, params: &DeleteSession) -> Result<SessionRecord> {
        if !params.confirmed {
            return Err(TempoError::invalid_input("confirmed").with_reason(
                "Session deletion requires explicit confirmation. Set 'confirmed' to true to proceed with permanent deletion.",
            ));
        }

        let stored = self
            .load_session(&params.id)
            .await?
            .ok_or_else(|| TempoError::SessionNotFound {
                id: params.id.clone(),
            })?;
        self.delete_session(&params.id).await?;
        Ok(stored.record)
    }
}
