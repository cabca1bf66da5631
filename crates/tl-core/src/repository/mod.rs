//! Slot repository - the authoritative store of time entries
//!
//! Owns all persisted slot state and enforces the storage invariants: at
//! most one open slot, no partial writes, and idempotent stop/delete.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{Error, Result};
use crate::models::{ConnectorRef, NewSlot, SlotOverrides, TimeEntry};

/// Authoritative store of time entries.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The single open entry, or `None` when nothing is running.
    pub async fn get_active(&self) -> Result<Option<TimeEntry>> {
        let entry: Option<TimeEntry> =
            sqlx::query_as("SELECT * FROM slots WHERE end_time IS NULL LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok(entry)
    }

    /// Look up an entry by id. `None` when missing - callers check and
    /// fail fast with a message naming the id.
    pub async fn slot(&self, id: i64) -> Result<Option<TimeEntry>> {
        let entry: Option<TimeEntry> = sqlx::query_as("SELECT * FROM slots WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    /// Close the entry `id` if it is currently open.
    ///
    /// Returns the updated snapshot, or `None` (no mutation) when the entry
    /// is already closed or does not exist. Idempotent.
    pub async fn stop(&self, id: i64) -> Result<Option<TimeEntry>> {
        let now = Utc::now();
        let result = sqlx::query("UPDATE slots SET end_time = ? WHERE id = ? AND end_time IS NULL")
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.slot(id).await
    }

    /// Insert a slot draft, resolving overrides before any persistence
    /// call.
    ///
    /// The connector binding resolves override-first; a `Deferred` binding
    /// without an override is a validation error. Inserting an open draft
    /// while another slot is running is refused to uphold the single-active
    /// invariant. Returns the store-assigned id.
    pub async fn insert(&self, slot: NewSlot, overrides: Option<SlotOverrides>) -> Result<i64> {
        let connector_id = match (
            &slot.connector,
            overrides.as_ref().and_then(|o| o.connector_id.as_deref()),
        ) {
            (_, Some(id)) => id.to_string(),
            (ConnectorRef::Resolved(id), None) => id.clone(),
            (ConnectorRef::Deferred, None) => {
                return Err(Error::validation(
                    "Connector binding left unresolved for new slot",
                ))
            }
        };

        if slot.end.is_none() {
            if let Some(active) = self.get_active().await? {
                return Err(Error::validation(format!(
                    "Slot {} is still running; stop it before starting another",
                    active.id
                )));
            }
        }

        let result = sqlx::query(
            r#"
            INSERT INTO slots (connector_id, tid, start_time, end_time, comment, category)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&connector_id)
        .bind(&slot.tid)
        .bind(slot.start)
        .bind(slot.end)
        .bind(&slot.comment)
        .bind(&slot.category)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Remove the entry `id`. Already-gone counts as success.
    pub async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM slots WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record the external time-entry id after a slot has been sent to the
    /// tracker. Returns false when the slot does not exist.
    pub async fn mark_sent(&self, id: i64, teid: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE slots SET teid = ? WHERE id = ?")
            .bind(teid)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Recent entries, newest first.
    pub async fn list(&self, limit: i64) -> Result<Vec<TimeEntry>> {
        let entries: Vec<TimeEntry> =
            sqlx::query_as("SELECT * FROM slots ORDER BY start_time DESC, id DESC LIMIT ?")
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;
        Ok(entries)
    }
}
