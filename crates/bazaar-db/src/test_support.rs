//! Shared setup for unit tests.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::{Database, DbConfig};

const SCHEMA: &str = include_str!("../schema.sql");

/// In-memory database with the schema applied.
pub(crate) async fn setup() -> Database {
    setup_with(DbConfig::in_memory()).await
}

pub(crate) async fn setup_with(config: DbConfig) -> Database {
    let db = Database::connect(&config).await.unwrap();

    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(db.pool()).await.unwrap();
    }

    db
}

/// Removes the database files when dropped.
pub(crate) struct ScratchFile {
    path: PathBuf,
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut path = self.path.clone().into_os_string();
            path.push(suffix);
            let _ = fs::remove_file(path);
        }
    }
}

/// File-backed SQLite database with the schema applied, so that
/// `max_connections` connections really run side by side.
pub(crate) async fn setup_file(max_connections: u32) -> (Database, ScratchFile) {
    let path = std::env::temp_dir().join(format!("bazaar-test-{}.db", uuid::Uuid::new_v4()));
    let file = ScratchFile { path: path.clone() };

    let mut config = DbConfig::in_memory()
        .max_connections(max_connections)
        .timeout(Duration::from_secs(30));
    config.url_override = Some(format!("sqlite://{}?mode=rwc", path.display()));

    (setup_with(config).await, file)
}
