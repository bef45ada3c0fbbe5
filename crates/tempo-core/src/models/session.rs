//! Stored session metadata.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::PlanDocument;

/// Metadata of a stored session document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    /// Caller-chosen session identifier
    pub id: String,

    /// Incremented on every save, starting at 1
    pub revision: u64,

    /// Timestamp of the first save (UTC)
    pub created_at: Timestamp,

    /// Timestamp of the latest save (UTC)
    pub updated_at: Timestamp,
}

/// A stored document together with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    #[serde(flatten)]
    pub record: SessionRecord,
    pub document: PlanDocument,
}
