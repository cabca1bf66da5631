//! Config commands
//!
//! Manage tracker credentials stored alongside the slots.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use tl_core::settings;

use super::Context;
use crate::output::{print_error, print_info, print_output, print_success};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// List all configuration keys and values
    List,

    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },
}

/// Config row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

pub async fn execute(ctx: &Context, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show | ConfigAction::List => show_config(ctx).await,
        ConfigAction::Get { key } => get_config(ctx, key).await,
        ConfigAction::Set { key, value } => set_config(ctx, key, value).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    let mut rows = vec![db_path_row()];

    for (key, value) in settings::entries(&ctx.db.pool).await? {
        rows.push(ConfigRow {
            value: display_value(&key, &value),
            key,
            source: "db".to_string(),
        });
    }

    print_output(&rows, ctx.format)?;
    Ok(())
}

async fn get_config(ctx: &Context, key: String) -> Result<()> {
    match settings::get(&ctx.db.pool, &key).await? {
        Some(value) => print_info(&format!("{} = {}", key, display_value(&key, &value)), ctx.quiet),
        None => print_error(&format!("Config key not set: {}", key)),
    }
    Ok(())
}

async fn set_config(ctx: &Context, key: String, value: String) -> Result<()> {
    settings::set(&ctx.db.pool, &key, &value).await?;
    print_success(
        &format!("Set {} = {}", key, display_value(&key, &value)),
        ctx.quiet,
    );
    Ok(())
}

fn db_path_row() -> ConfigRow {
    let db_path = tl_core::db::get_db_path()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "Unknown".to_string());

    ConfigRow {
        key: "TL_DB_PATH".to_string(),
        value: db_path,
        source: if std::env::var("TL_DB_PATH").is_ok() {
            "env"
        } else {
            "default"
        }
        .to_string(),
    }
}

fn display_value(key: &str, value: &str) -> String {
    if settings::is_secret(key) && !value.is_empty() {
        "****".to_string()
    } else {
        value.to_string()
    }
}
