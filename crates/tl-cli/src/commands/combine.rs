//! Combine command
//!
//! Merges two slots recorded against the same ticket into one continuous
//! slot.

use anyhow::Result;

use tl_core::services::lifecycle::combine;

use super::{print_closed, Context};
use crate::output::print_success;

pub async fn execute(ctx: &Context, slot1: i64, slot2: i64) -> Result<()> {
    let repo = ctx.repository();
    let tracker = ctx.tracker().await?;

    let report = combine(&repo, &tracker, slot1, slot2).await?;

    for closed in &report.closed {
        print_closed(closed, ctx.quiet);
    }
    print_success(
        &format!(
            "Combined {} and {} into new slot {}",
            report.first, report.second, report.merged
        ),
        ctx.quiet,
    );

    Ok(())
}
