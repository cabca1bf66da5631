//! Stop command
//!
//! Closes the running slot. Idempotent: nothing running is not an error.

use anyhow::Result;

use tl_core::services::lifecycle::stop_active;

use super::{print_closed, Context};
use crate::output::print_info;

pub async fn execute(ctx: &Context) -> Result<()> {
    let repo = ctx.repository();
    let tracker = ctx.tracker().await?;

    match stop_active(&repo, &tracker).await? {
        Some(closed) => print_closed(&closed, ctx.quiet),
        None => print_info("No open slot.", ctx.quiet),
    }
    Ok(())
}
