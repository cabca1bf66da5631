//! Database module - SQLx with SQLite

use crate::error::{Error, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::PathBuf;

/// Database state
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Create a new database connection with default path
    pub async fn new() -> Result<Self> {
        let db_path = get_db_path()?;
        Self::open(db_path).await
    }

    /// Create a new database connection with a specific path
    pub async fn open(db_path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
        log::debug!("Connecting to database: {}", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<()> {
        log::debug!("Running database migrations...");

        // Slots: one row per logged interval of work. end_time IS NULL means
        // the slot is still running; teid is the external time-entry id set
        // once the slot has been sent to the remote tracker.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                connector_id TEXT NOT NULL,
                tid TEXT NOT NULL,
                start_time DATETIME NOT NULL,
                end_time DATETIME,
                comment TEXT,
                category TEXT,
                teid TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_slots_tid ON slots(tid)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_slots_open ON slots(end_time) WHERE end_time IS NULL",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_slots_teid ON slots(teid) WHERE teid IS NOT NULL")
            .execute(&self.pool)
            .await?;

        // Tracker credentials and tool settings
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        log::debug!("Database migrations completed");
        Ok(())
    }
}

/// Get database file path
/// Priority: TL_DB_PATH env var > default app data directory
pub fn get_db_path() -> Result<PathBuf> {
    // Check for environment variable override
    if let Ok(path) = std::env::var("TL_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    // Default: use app data directory
    let dirs = directories::ProjectDirs::from("com", "tl", "tl")
        .ok_or_else(|| Error::config("Could not determine project directories"))?;

    Ok(dirs.data_dir().join("tl.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests don't run in parallel
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_get_db_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::remove_var("TL_DB_PATH");
        let path = get_db_path().unwrap();
        assert!(path.to_string_lossy().contains("tl.db"));
    }

    #[test]
    fn test_get_db_path_env_override() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let test_path = "/tmp/test_tl.db";
        std::env::set_var("TL_DB_PATH", test_path);
        let path = get_db_path().unwrap();
        assert_eq!(path.to_string_lossy(), test_path);
        std::env::remove_var("TL_DB_PATH");
    }

    #[tokio::test]
    async fn test_open_creates_schema() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::open(dir.path().join("schema.db")).await.unwrap();

        // Migrations are idempotent and leave the tables queryable.
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM slots")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count.0, 0);

        db.run_migrations().await.unwrap();
    }
}
