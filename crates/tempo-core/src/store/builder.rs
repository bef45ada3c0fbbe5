//! Builder for creating and configuring DocumentStore instances.

use std::path::{Path, PathBuf};

use tokio::task;

use super::DocumentStore;
use crate::{
    db::Database,
    error::{join_error, Result, TempoError},
};

/// Builder for creating and configuring DocumentStore instances.
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    database_path: Option<PathBuf>,
}

impl StoreBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/tempo/tempo.db` or `~/.local/share/tempo/tempo.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Builds the configured store, creating the database if needed.
    ///
    /// # Errors
    ///
    /// Returns `TempoError::FileSystem` if the database directory cannot be
    /// created
    /// Returns `TempoError::Database` if database initialization fails
    pub async fn build(self) -> Result<DocumentStore> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TempoError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || Database::new(&db_path_clone).map(drop))
            .await
            .map_err(join_error)??;

        Ok(DocumentStore::new(db_path))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("tempo")
            .place_data_file("tempo.db")
            .map_err(|e| TempoError::XdgDirectory(e.to_string()))
    }
}
