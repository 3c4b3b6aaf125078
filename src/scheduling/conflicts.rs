use super::models::{ConflictCheck, Event, TimeRange};

/// Find every event overlapping `candidate`, skipping `exclude_id`.
///
/// Events are compared as half-open intervals, so an event ending exactly when
/// the candidate starts is not a conflict. The snapshot order is preserved.
pub fn find_conflicts<'a>(
    events: &'a [Event],
    candidate: &TimeRange,
    exclude_id: Option<&str>,
) -> ConflictCheck<'a> {
    let conflicting: Vec<&Event> = events
        .iter()
        .filter(|event| exclude_id != Some(event.id.as_str()))
        .filter(|event| event.start_date < candidate.end && event.end_date > candidate.start)
        .collect();

    ConflictCheck {
        has_conflicts: !conflicting.is_empty(),
        conflicting,
    }
}
