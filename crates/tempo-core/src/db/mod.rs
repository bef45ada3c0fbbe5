//! SQLite storage for session plan documents.
//!
//! This module provides the synchronous database layer behind
//! [`crate::store::DocumentStore`]. Each connection initializes the schema on
//! open, so any path can be handed to [`Database::new`].

use std::path::Path;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

mod schema;
pub mod session_queries;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
