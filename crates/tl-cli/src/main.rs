//! tl - time logging CLI
//!
//! Records slots of work against tickets in remote issue trackers and
//! keeps them consistent across start/stop/combine transitions.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tl")]
#[command(author, version, about = "Log time against tickets in remote issue trackers", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: table (default) or json
    #[arg(long, global = true, default_value = "table")]
    format: output::OutputFormat,

    /// Suppress progress messages
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Override database path (or set TL_DB_PATH env var)
    #[arg(long, env = "TL_DB_PATH", global = true)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start logging time against a ticket
    Start {
        /// Ticket number or key on the remote tracker
        issue_number: String,

        /// Note recorded on the new slot
        #[arg(short, long)]
        comment: Option<String>,

        /// Classification tag recorded on the new slot
        #[arg(long)]
        category: Option<String>,

        /// Also assign the ticket to you on the tracker
        #[arg(short, long)]
        assign: bool,

        /// Also move the ticket to in-progress on the tracker
        #[arg(short, long)]
        status: bool,
    },

    /// Stop the currently running slot
    Stop,

    /// Combine two slots for the same ticket into one
    Combine {
        /// First slot id; the merged slot keeps its start time
        slot1: i64,

        /// Second slot id; its duration extends the merged slot
        slot2: i64,
    },

    /// Show the currently running slot
    Active,

    /// List recorded slots
    List {
        /// Maximum number of slots to show
        #[arg(short, long, default_value = "25")]
        limit: i64,
    },

    /// Manage tracker configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Set up database path if provided
    if let Some(db_path) = &cli.db {
        std::env::set_var("TL_DB_PATH", db_path);
    }

    // Initialize database
    let db = tl_core::Database::new().await?;

    // Create context for commands
    let ctx = commands::Context {
        db,
        format: cli.format,
        quiet: cli.quiet,
    };

    // Execute command
    match cli.command {
        Commands::Start {
            issue_number,
            comment,
            category,
            assign,
            status,
        } => commands::start::execute(&ctx, issue_number, comment, category, assign, status).await,
        Commands::Stop => commands::stop::execute(&ctx).await,
        Commands::Combine { slot1, slot2 } => commands::combine::execute(&ctx, slot1, slot2).await,
        Commands::Active => commands::slots::active(&ctx).await,
        Commands::List { limit } => commands::slots::list(&ctx, limit).await,
        Commands::Config { action } => commands::config::execute(&ctx, action).await,
    }
}
