//! Cloud Sync
//!
//! Boundary to the LogHawk cloud server: node registration at startup and
//! one batch upload per (cycle, file). No retry queue lives here: a failed
//! upload is surfaced to the tracker, which re-covers the range next cycle.

mod batch;
mod client;

pub use batch::{build_batch, logical_table_name, EntryBatch};
pub use client::{CloudClient, CloudConfig, CloudError, EntryRecord, RegisterNodeResponse};
