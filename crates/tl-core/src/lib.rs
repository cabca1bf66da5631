//! # tl-core
//!
//! Core slot lifecycle engine and storage for tl - a personal time logger
//! that records work slots against tickets in remote issue trackers.
//!
//! This crate provides:
//! - Database access and migrations (`db` module)
//! - Data models (`models` module)
//! - The authoritative slot store (`repository` module)
//! - Tracker backends and routing (`connector` module)
//! - The start/stop/combine lifecycle engine (`services` module)
//! - Tracker configuration (`settings` module)
//! - Unified error handling (`error` module)

pub mod connector;
pub mod db;
pub mod error;
pub mod formatter;
pub mod models;
pub mod repository;
pub mod services;
pub mod settings;

// Re-exports for convenience
pub use db::Database;
pub use error::{Error, Result};

pub use connector::{
    format_connector_id, Connector, ConnectorManager, JiraAuthType, JiraConnector,
    RedmineConnector,
};
pub use formatter::format_duration;
pub use models::{ConnectorRef, NewSlot, SlotOverrides, Ticket, TimeEntry};
pub use repository::Repository;
pub use services::{
    combine, start, stop_active, stop_slot, CapabilityOutcome, ClosedSlot, CombineReport,
    StartOptions, StartReport,
};
pub use settings::Settings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
pub fn version() -> &'static str {
    VERSION
}
