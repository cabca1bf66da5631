//! Slot listing commands
//!
//! `tl active` and `tl list` - read-only views over recorded slots.

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tabled::Tabled;

use tl_core::{format_duration, TimeEntry};

use super::Context;
use crate::output::{print_info, print_output, print_single};

/// Slot row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct SlotRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Ticket")]
    pub ticket: String,
    #[tabled(rename = "Start")]
    pub start: String,
    #[tabled(rename = "Duration")]
    pub duration: String,
    #[tabled(rename = "Comment")]
    pub comment: String,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Sent")]
    pub sent: String,
}

impl From<&TimeEntry> for SlotRow {
    fn from(entry: &TimeEntry) -> Self {
        let duration = format_duration(entry.duration(Utc::now()));
        Self {
            id: entry.id,
            ticket: entry.tid.clone(),
            start: entry.start.format("%Y-%m-%d %H:%M").to_string(),
            duration: if entry.is_open() {
                format!("{} (running)", duration)
            } else {
                duration
            },
            comment: entry.comment.clone().unwrap_or_else(|| "-".to_string()),
            category: entry.category.clone().unwrap_or_else(|| "-".to_string()),
            sent: entry.teid.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Show the currently running slot.
pub async fn active(ctx: &Context) -> Result<()> {
    let repo = ctx.repository();
    match repo.get_active().await? {
        Some(entry) => print_single(&SlotRow::from(&entry), ctx.format)?,
        None => print_info("No open slot.", ctx.quiet),
    }
    Ok(())
}

/// List recent slots, newest first.
pub async fn list(ctx: &Context, limit: i64) -> Result<()> {
    let repo = ctx.repository();
    let entries = repo.list(limit).await?;
    let rows: Vec<SlotRow> = entries.iter().map(SlotRow::from).collect();
    print_output(&rows, ctx.format)?;
    Ok(())
}
