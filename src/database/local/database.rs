use std::path::Path;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

pub struct CacheDb(pub SqlitePool);

/*
 * Opens the local cache database, used to keep the last reconciled
 * venue list around for when the hosted store cannot be reached.
 */
pub async fn init_cache_db(db_path: &Path) -> Result<CacheDb, String> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            format!(
                "Failed to create cache dir {}: {}",
                parent.display(),
                e
            )
        })?;
    }

    let connect_options = SqliteConnectOptions::new()
        .filename(db_path)
        .journal_mode(SqliteJournalMode::Wal)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .map_err(|e| {
            format!(
                "Failed to connect to cache database at {}: {}",
                db_path.display(),
                e
            )
        })?;

    run_migrations(&pool).await?;
    Ok(CacheDb(pool))
}

/// In-memory cache database. A single connection, since every
/// `:memory:` connection is its own database.
pub async fn init_memory_cache_db() -> Result<CacheDb, String> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .map_err(|e| format!("Failed to open in-memory cache database: {}", e))?;

    run_migrations(&pool).await?;
    Ok(CacheDb(pool))
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), String> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| format!("Failed to run cache migrations: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn slot_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM cache_slots")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn migration_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn memory_db_has_cache_table() {
        let db = init_memory_cache_db().await.unwrap();
        assert_eq!(slot_count(&db.0).await, 0);
        assert_eq!(migration_count(&db.0).await, 1);
    }

    #[tokio::test]
    async fn reopening_applies_migrations_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");

        let first = init_cache_db(&path).await.unwrap();
        first.0.close().await;

        let db = init_cache_db(&path).await.unwrap();
        assert_eq!(migration_count(&db.0).await, 1);
        assert_eq!(slot_count(&db.0).await, 0);
    }
}
