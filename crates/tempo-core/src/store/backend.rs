//! Save backend bound to a single stored session.

use async_trait::async_trait;
use log::debug;

use super::DocumentStore;
use crate::{autosave::SaveBackend, error::Result, models::PlanDocument};

/// A [`DocumentStore`] scoped to one session ID.
#[derive(Debug, Clone)]
pub struct SessionStore {
    store: DocumentStore,
    session_id: String,
}

impl SessionStore {
    pub fn for_session(store: DocumentStore, session_id: impl Into<String>) -> Self {
        Self {
            store,
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }
}

#[async_trait]
impl SaveBackend<PlanDocument> for SessionStore {
    async fn save(&self, document: PlanDocument) -> Result<()> {
        let record = self.store.save_document(&self.session_id, &document).await?;
        debug!(
            "Stored session '{}' at revision {}",
            record.id, record.revision
        );
        Ok(())
    }
}
