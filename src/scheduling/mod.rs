//! Interval scheduling over a point-in-time snapshot of calendar events.
//!
//! Everything here is a pure function of its inputs: no caching, no shared
//! state, and the snapshot is never mutated.

mod conflicts;
mod free_time;
pub mod models;

pub use conflicts::find_conflicts;
pub use free_time::find_free_slots;
pub use models::{ConflictCheck, Event, FreeSlot, TimeRange};

use std::collections::HashSet;

/// Drop all-day events before a timed-slot search
pub fn timed_only(events: &[Event]) -> Vec<Event> {
    events.iter().filter(|e| !e.is_all_day).cloned().collect()
}

/// Concatenate local and remote events; a local event shadows a remote one
/// with the same id.
pub fn merge_snapshots(local: Vec<Event>, remote: Vec<Event>) -> Vec<Event> {
    let local_ids: HashSet<String> = local.iter().map(|e| e.id.clone()).collect();

    let mut merged = local;
    merged.extend(remote.into_iter().filter(|e| !local_ids.contains(&e.id)));
    merged
}
