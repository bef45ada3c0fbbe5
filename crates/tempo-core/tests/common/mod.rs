use tempfile::TempDir;
use tempo_core::{DocumentStore, StoreBuilder};

/// Helper function to create a store backed by a temporary database
pub async fn create_test_store() -> (TempDir, DocumentStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let store = StoreBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create store");
    (temp_dir, store)
}
