//! Tracker credentials and tool settings
//!
//! Stored as key/value rows in the same SQLite database as the slots, and
//! managed through the `tl config` command family.

use sqlx::SqlitePool;

use crate::error::{Error, Result};

/// Recognized settings keys.
pub const KEYS: &[&str] = &[
    "redmine_url",
    "redmine_api_key",
    "jira_url",
    "jira_email",
    "jira_pat",
    "jira_auth",
];

/// Keys whose values are secrets and must be masked on display.
pub const SECRET_KEYS: &[&str] = &["redmine_api_key", "jira_pat"];

/// Loaded tracker configuration. Plain data; connector construction takes
/// this, not the pool.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub redmine_url: Option<String>,
    pub redmine_api_key: Option<String>,
    pub jira_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_pat: Option<String>,
    pub jira_auth: Option<String>,
}

/// Load all settings into a typed struct.
pub async fn load(pool: &SqlitePool) -> Result<Settings> {
    let mut settings = Settings::default();
    for (key, value) in entries(pool).await? {
        match key.as_str() {
            "redmine_url" => settings.redmine_url = Some(value),
            "redmine_api_key" => settings.redmine_api_key = Some(value),
            "jira_url" => settings.jira_url = Some(value),
            "jira_email" => settings.jira_email = Some(value),
            "jira_pat" => settings.jira_pat = Some(value),
            "jira_auth" => settings.jira_auth = Some(value),
            other => log::warn!("Ignoring unknown settings row: {}", other),
        }
    }
    Ok(settings)
}

/// All stored settings rows, ordered by key.
pub async fn entries(pool: &SqlitePool) -> Result<Vec<(String, String)>> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT key, value FROM settings ORDER BY key")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

/// Read one setting.
pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    validate_key(key)?;
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(value,)| value))
}

/// Write one setting, replacing any previous value.
pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    validate_key(key)?;
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// True when the key's value must be masked on display.
pub fn is_secret(key: &str) -> bool {
    SECRET_KEYS.contains(&key)
}

fn validate_key(key: &str) -> Result<()> {
    if KEYS.contains(&key) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Unknown config key: {}. Available keys: {}",
            key,
            KEYS.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use tempfile::TempDir;

    async fn test_pool() -> (SqlitePool, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = Database::open(dir.path().join("settings.db"))
            .await
            .expect("Failed to open test database");
        (db.pool.clone(), dir)
    }

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let (pool, _dir) = test_pool().await;

        assert!(get(&pool, "redmine_url").await.unwrap().is_none());

        set(&pool, "redmine_url", "https://redmine.example.com")
            .await
            .unwrap();
        assert_eq!(
            get(&pool, "redmine_url").await.unwrap().as_deref(),
            Some("https://redmine.example.com")
        );

        // Replacing keeps a single row.
        set(&pool, "redmine_url", "https://other.example.com")
            .await
            .unwrap();
        assert_eq!(entries(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected() {
        let (pool, _dir) = test_pool().await;
        let err = set(&pool, "tempo_token", "x").await.unwrap_err();
        assert!(err.to_string().contains("Unknown config key"));
        assert!(err.to_string().contains("redmine_url"));
    }

    #[tokio::test]
    async fn test_load_typed_settings() {
        let (pool, _dir) = test_pool().await;
        set(&pool, "jira_url", "https://jira.example.com")
            .await
            .unwrap();
        set(&pool, "jira_pat", "secret").await.unwrap();
        set(&pool, "jira_auth", "basic").await.unwrap();

        let settings = load(&pool).await.unwrap();
        assert_eq!(settings.jira_url.as_deref(), Some("https://jira.example.com"));
        assert_eq!(settings.jira_pat.as_deref(), Some("secret"));
        assert_eq!(settings.jira_auth.as_deref(), Some("basic"));
        assert!(settings.redmine_url.is_none());
    }

    #[test]
    fn test_secret_keys() {
        assert!(is_secret("jira_pat"));
        assert!(is_secret("redmine_api_key"));
        assert!(!is_secret("redmine_url"));
    }
}
