//! CLI commands module
//!
//! Thin handlers that delegate to the tl-core lifecycle engine and format
//! its reports.

pub mod combine;
pub mod config;
pub mod slots;
pub mod start;
pub mod stop;

use chrono::Utc;
use tl_core::{format_duration, ClosedSlot, ConnectorManager, Database, Repository};

use crate::output::{print_info, OutputFormat};

/// Shared context for all commands
pub struct Context {
    pub db: Database,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Context {
    pub fn repository(&self) -> Repository {
        Repository::new(self.db.pool.clone())
    }

    /// Build the tracker backends the stored settings configure.
    pub async fn tracker(&self) -> anyhow::Result<ConnectorManager> {
        let settings = tl_core::settings::load(&self.db.pool).await?;
        Ok(ConnectorManager::from_settings(&settings)?)
    }
}

/// Report a slot that was closed during a transition.
pub fn print_closed(closed: &ClosedSlot, quiet: bool) {
    let title = closed
        .ticket
        .as_ref()
        .map(|t| t.title.as_str())
        .unwrap_or("(unknown title)");
    print_info(
        &format!(
            "Closed slot {} against ticket {}: {}, duration {}",
            closed.entry.id,
            closed.entry.tid,
            title,
            format_duration(closed.entry.duration(Utc::now()))
        ),
        quiet,
    );
}
