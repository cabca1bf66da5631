//! Services module

pub mod lifecycle;

pub use lifecycle::{
    combine, start, stop_active, stop_slot, CapabilityOutcome, ClosedSlot, CombineReport,
    StartOptions, StartReport,
};
