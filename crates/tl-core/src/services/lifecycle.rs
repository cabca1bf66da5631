//! Slot lifecycle engine
//!
//! Sequences repository and connector calls to implement the start, stop
//! and combine transitions. Validation happens before any mutation;
//! repository failures propagate as errors, while connector capability
//! calls degrade to a soft [`CapabilityOutcome::Refused`] so a flaky
//! tracker never aborts a transition that already changed local state.

use chrono::Utc;

use crate::connector::{format_connector_id, ConnectorManager};
use crate::error::{Error, Result};
use crate::models::{NewSlot, SlotOverrides, Ticket, TimeEntry};
use crate::repository::Repository;

/// Result of a best-effort tracker capability call (assign, in-progress).
///
/// A transport error counts as `Refused`: the capability is reported as
/// "could not", and the lifecycle transition carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityOutcome {
    Applied,
    Refused,
}

/// A slot that was closed during a transition, with the ticket metadata
/// used to report it. The ticket lookup is best effort.
#[derive(Debug, Clone)]
pub struct ClosedSlot {
    pub entry: TimeEntry,
    pub ticket: Option<Ticket>,
}

/// Options for the start transition.
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    pub comment: Option<String>,
    pub category: Option<String>,
    pub assign: bool,
    pub set_in_progress: bool,
}

/// Everything a start transition did, for the caller to report.
#[derive(Debug)]
pub struct StartReport {
    /// The previously active slot, closed by this start.
    pub closed: Option<ClosedSlot>,
    /// The newly created open slot.
    pub entry: TimeEntry,
    pub ticket: Ticket,
    pub assigned: Option<CapabilityOutcome>,
    pub in_progress: Option<CapabilityOutcome>,
}

/// Slots consumed and produced by a combine.
#[derive(Debug)]
pub struct CombineReport {
    /// Slots auto-closed by the stop-before-read step.
    pub closed: Vec<ClosedSlot>,
    pub first: i64,
    pub second: i64,
    pub merged: i64,
}

/// Close the entry `id` if it is open and gather its ticket metadata for
/// reporting. No-op (`None`) when there is nothing to stop.
pub async fn stop_slot(
    repo: &Repository,
    tracker: &ConnectorManager,
    id: i64,
) -> Result<Option<ClosedSlot>> {
    let Some(entry) = repo.stop(id).await? else {
        return Ok(None);
    };

    let ticket = match tracker.ticket_details(&entry.tid, &entry.connector_id).await {
        Ok(ticket) => ticket,
        Err(err) => {
            log::warn!("Could not fetch details for ticket {}: {}", entry.tid, err);
            None
        }
    };
    Ok(Some(ClosedSlot { entry, ticket }))
}

/// Close whatever slot is currently running, if any.
pub async fn stop_active(
    repo: &Repository,
    tracker: &ConnectorManager,
) -> Result<Option<ClosedSlot>> {
    match repo.get_active().await? {
        Some(active) => stop_slot(repo, tracker, active.id).await,
        None => Ok(None),
    }
}

/// Start logging time against a ticket.
///
/// Spots the owning backend before any mutation, closes the active slot,
/// fetches ticket metadata, inserts the new open slot, then runs the
/// requested best-effort capability calls. Afterwards exactly one slot is
/// active: the new one.
pub async fn start(
    repo: &Repository,
    tracker: &ConnectorManager,
    tid: &str,
    options: StartOptions,
) -> Result<StartReport> {
    let connector_id = tracker
        .spot_connector(tid)
        .await?
        .ok_or_else(|| Error::not_found(format!("No configured backend knows ticket {}", tid)))?;

    let closed = stop_active(repo, tracker).await?;

    let ticket = tracker
        .ticket_details(tid, &connector_id)
        .await?
        .ok_or_else(|| {
            Error::not_found(format!(
                "Ticket {} was not found on {}",
                tid,
                format_connector_id(&connector_id)
            ))
        })?;

    let draft = NewSlot::open(&connector_id, tid, Utc::now())
        .with_comment(options.comment.clone())
        .with_category(options.category.clone());
    let id = repo.insert(draft, None).await?;
    let entry = repo
        .slot(id)
        .await?
        .ok_or_else(|| Error::internal(format!("Slot {} vanished after insert", id)))?;

    let assigned = if options.assign {
        Some(soft(tracker.assign(tid, &connector_id).await))
    } else {
        None
    };
    let in_progress = if options.set_in_progress {
        Some(soft(tracker.set_in_progress(tid, &connector_id, options.assign).await))
    } else {
        None
    };

    Ok(StartReport {
        closed,
        entry,
        ticket,
        assigned,
        in_progress,
    })
}

/// Merge two slots recorded against the same ticket into one.
///
/// The merged slot keeps the first entry's start and extends its window by
/// exactly the second entry's logged duration; wall-clock gaps between the
/// two recordings are discarded. The merged slot is inserted before either
/// original is deleted.
pub async fn combine(
    repo: &Repository,
    tracker: &ConnectorManager,
    slot1: i64,
    slot2: i64,
) -> Result<CombineReport> {
    if slot1 == slot2 {
        return Err(Error::validation("You cannot combine a slot with itself."));
    }

    let mut closed = Vec::new();

    // Stop either slot first so an open entry has an end time before it is
    // inspected. Safe to call on the currently active slot.
    if let Some(stopped) = stop_slot(repo, tracker, slot1).await? {
        closed.push(stopped);
    }
    let entry1 = repo
        .slot(slot1)
        .await?
        .ok_or_else(|| Error::validation(format!("Invalid slot id {}", slot1)))?;

    if let Some(stopped) = stop_slot(repo, tracker, slot2).await? {
        closed.push(stopped);
    }
    let entry2 = repo
        .slot(slot2)
        .await?
        .ok_or_else(|| Error::validation(format!("Invalid slot id {}", slot2)))?;

    if entry1.connector_id != entry2.connector_id {
        return Err(Error::validation(format!(
            "You cannot combine slots from {} backend with slots from {} backend",
            format_connector_id(&entry2.connector_id),
            format_connector_id(&entry1.connector_id)
        )));
    }
    if entry1.is_sent() || entry2.is_sent() {
        return Err(Error::validation(
            "You cannot combine entries that have already been sent.",
        ));
    }
    if entry1.tid != entry2.tid {
        return Err(Error::validation(
            "You cannot combine entries from separate issues.",
        ));
    }

    let end1 = entry1
        .end
        .ok_or_else(|| Error::internal(format!("Slot {} has no end time after stop", slot1)))?;
    let end2 = entry2
        .end
        .ok_or_else(|| Error::internal(format!("Slot {} has no end time after stop", slot2)))?;

    // Extend the first entry's window by the duration logged in the second.
    let merged_end = end1 + (end2 - entry2.start);
    let draft = NewSlot::carried_from(&entry1).closed_at(merged_end);

    // Insert the replacement first; the originals are only deleted once it
    // is durably in the store.
    let merged = repo
        .insert(draft, Some(SlotOverrides::connector(&entry1.connector_id)))
        .await?;

    for original in [&entry1, &entry2] {
        if let Err(err) = repo.delete(original.id).await {
            // A partial delete would double-count the work: take the
            // replacement back out and surface the storage failure.
            if let Err(cleanup) = repo.delete(merged).await {
                log::error!(
                    "Could not remove merged slot {} after failed delete of {}: {}",
                    merged,
                    original.id,
                    cleanup
                );
            }
            return Err(err);
        }
    }

    Ok(CombineReport {
        closed,
        first: slot1,
        second: slot2,
        merged,
    })
}

fn soft(result: Result<bool>) -> CapabilityOutcome {
    match result {
        Ok(true) => CapabilityOutcome::Applied,
        Ok(false) => CapabilityOutcome::Refused,
        Err(err) => {
            log::warn!("Tracker capability call failed: {}", err);
            CapabilityOutcome::Refused
        }
    }
}
