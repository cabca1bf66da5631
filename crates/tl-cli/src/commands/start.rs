//! Start command
//!
//! Opens a new slot against a ticket, closing whatever was running first.

use anyhow::Result;

use tl_core::services::lifecycle::{start, CapabilityOutcome, StartOptions};

use super::{print_closed, Context};
use crate::output::{print_error, print_info, print_success};

pub async fn execute(
    ctx: &Context,
    issue_number: String,
    comment: Option<String>,
    category: Option<String>,
    assign: bool,
    status: bool,
) -> Result<()> {
    let repo = ctx.repository();
    let tracker = ctx.tracker().await?;

    let options = StartOptions {
        comment,
        category,
        assign,
        set_in_progress: status,
    };
    let report = start(&repo, &tracker, &issue_number, options).await?;

    if let Some(closed) = &report.closed {
        print_closed(closed, ctx.quiet);
    }
    print_success(
        &format!(
            "Started new entry for {}: {}",
            report.entry.tid, report.ticket.title
        ),
        ctx.quiet,
    );

    match report.in_progress {
        Some(CapabilityOutcome::Applied) => print_info(
            &format!("Ticket {} set to in-progress", report.entry.tid),
            ctx.quiet,
        ),
        Some(CapabilityOutcome::Refused) => print_error("Could not update ticket status"),
        None => {}
    }
    match report.assigned {
        Some(CapabilityOutcome::Applied) => print_info(
            &format!("Ticket {} assigned to you", report.entry.tid),
            ctx.quiet,
        ),
        Some(CapabilityOutcome::Refused) => {
            print_error(&format!("Could not assign ticket {}", report.entry.tid))
        }
        None => {}
    }

    Ok(())
}
