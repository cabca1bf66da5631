//! Data models for the tl time logger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single recorded interval of work against a ticket ("slot").
///
/// A slot with no `end` is the active entry; at most one exists at any
/// time. A slot with a `teid` has been sent to the remote tracker and is
/// immutable to merging and deletion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimeEntry {
    pub id: i64,
    pub connector_id: String,
    pub tid: String,
    #[sqlx(rename = "start_time")]
    pub start: DateTime<Utc>,
    #[sqlx(rename = "end_time")]
    pub end: Option<DateTime<Utc>>,
    pub comment: Option<String>,
    pub category: Option<String>,
    pub teid: Option<String>,
}

impl TimeEntry {
    /// True while the slot is still running.
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// True once the slot has been recorded in the external tracker.
    pub fn is_sent(&self) -> bool {
        self.teid.is_some()
    }

    /// Seconds of work logged in this slot. Open slots count up to `now`.
    pub fn duration(&self, now: DateTime<Utc>) -> i64 {
        self.end
            .unwrap_or(now)
            .signed_duration_since(self.start)
            .num_seconds()
    }
}

/// External-tracker view of an issue. Fetched, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub tid: String,
    pub title: String,
}

impl Ticket {
    pub fn new(tid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            tid: tid.into(),
            title: title.into(),
        }
    }
}

/// Connector binding of a slot draft.
///
/// `Deferred` must be resolved through [`SlotOverrides`] when the draft is
/// inserted; an unresolved binding is a validation error, never a silent
/// default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorRef {
    Resolved(String),
    Deferred,
}

/// A slot draft for insertion into the store.
///
/// The store assigns the id; `teid` does not appear here because a freshly
/// inserted slot is unsent by construction.
#[derive(Debug, Clone)]
pub struct NewSlot {
    pub connector: ConnectorRef,
    pub tid: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub comment: Option<String>,
    pub category: Option<String>,
}

impl NewSlot {
    /// Draft an open slot bound to a resolved connector.
    pub fn open(
        connector_id: impl Into<String>,
        tid: impl Into<String>,
        start: DateTime<Utc>,
    ) -> Self {
        Self {
            connector: ConnectorRef::Resolved(connector_id.into()),
            tid: tid.into(),
            start,
            end: None,
            comment: None,
            category: None,
        }
    }

    /// Carry over the ticket binding and window of an existing entry.
    ///
    /// Carries `tid`, `start` and `end`. Identity (`id`), classification
    /// (`comment`, `category`) and export state (`teid`) stay behind, and
    /// the connector binding comes back deferred so it is re-resolved at
    /// insert time.
    pub fn carried_from(source: &TimeEntry) -> Self {
        Self {
            connector: ConnectorRef::Deferred,
            tid: source.tid.clone(),
            start: source.start,
            end: source.end,
            comment: None,
            category: None,
        }
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// Close the draft at `end`.
    pub fn closed_at(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }
}

/// Field overrides applied by the store during insert, before any
/// persistence call.
#[derive(Debug, Clone, Default)]
pub struct SlotOverrides {
    pub connector_id: Option<String>,
}

impl SlotOverrides {
    /// Override the connector binding.
    pub fn connector(connector_id: impl Into<String>) -> Self {
        Self {
            connector_id: Some(connector_id.into()),
        }
    }
}
