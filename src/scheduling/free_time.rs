use super::models::{Event, FreeSlot, TimeRange};
use chrono::{DateTime, Duration, Utc};

/// Find the gaps of at least `min_duration` inside `window`.
///
/// Events overlapping the window are clipped to it and merged into occupied
/// blocks before the sweep, so double-booked events never produce a bogus gap.
/// Slots come back earliest-first and span the whole gap.
pub fn find_free_slots(events: &[Event], window: &TimeRange, min_duration: Duration) -> Vec<FreeSlot> {
    if window.is_empty() {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut cursor = window.start;

    for block in occupied_blocks(events, window) {
        push_gap(&mut slots, cursor, block.start, min_duration);
        cursor = cursor.max(block.end);
    }
    push_gap(&mut slots, cursor, window.end, min_duration);

    slots
}

/// Well-formed events overlapping the window, clipped, sorted and merged
fn occupied_blocks(events: &[Event], window: &TimeRange) -> Vec<TimeRange> {
    let mut ranges: Vec<TimeRange> = events
        .iter()
        .map(Event::range)
        .filter(|range| !range.is_empty() && range.overlaps(window))
        .map(|range| TimeRange::new(range.start.max(window.start), range.end.min(window.end)))
        .collect();
    ranges.sort_by_key(|range| range.start);

    let mut blocks: Vec<TimeRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match blocks.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => blocks.push(range),
        }
    }
    blocks
}

fn push_gap(slots: &mut Vec<FreeSlot>, start: DateTime<Utc>, end: DateTime<Utc>, min: Duration) {
    let gap = end - start;
    if gap > Duration::zero() && gap >= min {
        slots.push(FreeSlot { start, end });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, hour, minute, 0).unwrap()
    }

    fn workday() -> TimeRange {
        TimeRange::new(at(9, 0), at(17, 0))
    }

    #[test]
    fn test_first_slot_starts_after_leading_event() {
        let events = vec![Event::new("e1", "Early call", at(9, 0), at(9, 30))];
        let slots = find_free_slots(&events, &workday(), Duration::minutes(30));

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start, at(9, 30));
        assert_eq!(slots[0].end, at(17, 0));
    }

    #[test]
    fn test_empty_calendar_returns_whole_window() {
        let window = TimeRange::new(
            Utc.with_ymd_and_hms(2025, 1, 16, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 16, 23, 59, 0).unwrap(),
        );
        let slots = find_free_slots(&[], &window, Duration::minutes(30));

        assert_eq!(slots, vec![FreeSlot { start: window.start, end: window.end }]);
    }

    #[test]
    fn test_window_shorter_than_duration_has_no_slots() {
        let window = TimeRange::new(at(9, 0), at(9, 20));
        assert!(find_free_slots(&[], &window, Duration::minutes(30)).is_empty());
    }

    #[test]
    fn test_gaps_between_events_respect_minimum() {
        let events = vec![
            Event::new("a", "A", at(10, 0), at(11, 0)),
            Event::new("b", "B", at(11, 20), at(12, 0)),
            Event::new("c", "C", at(13, 0), at(16, 30)),
        ];
        let slots = find_free_slots(&events, &workday(), Duration::minutes(30));

        assert_eq!(
            slots,
            vec![
                FreeSlot { start: at(9, 0), end: at(10, 0) },
                FreeSlot { start: at(12, 0), end: at(13, 0) },
                FreeSlot { start: at(16, 30), end: at(17, 0) },
            ]
        );
        for slot in &slots {
            assert!(slot.duration() >= Duration::minutes(30));
        }
    }

    #[test]
    fn test_unsorted_input_gives_ordered_slots() {
        let events = vec![
            Event::new("late", "Late", at(15, 0), at(16, 0)),
            Event::new("early", "Early", at(10, 0), at(11, 0)),
        ];
        let slots = find_free_slots(&events, &workday(), Duration::minutes(30));
        let starts: Vec<_> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![at(9, 0), at(11, 0), at(16, 0)]);
    }

    #[test]
    fn test_overlapping_events_are_merged() {
        // The short event ends before the long one; a naive sweep would
        // report 10:30-11:00 as free.
        let events = vec![
            Event::new("long", "Workshop", at(10, 0), at(12, 0)),
            Event::new("short", "Sync", at(10, 0), at(10, 30)),
            Event::new("next", "Follow-up", at(11, 0), at(11, 30)),
        ];
        let slots = find_free_slots(&events, &workday(), Duration::minutes(15));

        assert_eq!(
            slots,
            vec![
                FreeSlot { start: at(9, 0), end: at(10, 0) },
                FreeSlot { start: at(12, 0), end: at(17, 0) },
            ]
        );
    }

    #[test]
    fn test_events_straddling_window_edges_are_clipped() {
        let events = vec![
            Event::new("night", "Overnight", at(6, 0), at(9, 45)),
            Event::new("evening", "Dinner", at(16, 15), at(20, 0)),
            Event::new("outside", "Before", at(7, 0), at(8, 0)),
        ];
        let slots = find_free_slots(&events, &workday(), Duration::minutes(30));
        assert_eq!(slots, vec![FreeSlot { start: at(9, 45), end: at(16, 15) }]);
    }

    #[test]
    fn test_fully_booked_window_is_empty() {
        let events = vec![Event::new("all", "Offsite", at(8, 0), at(18, 0))];
        assert!(find_free_slots(&events, &workday(), Duration::minutes(30)).is_empty());
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let window = TimeRange::new(at(17, 0), at(9, 0));
        assert!(find_free_slots(&[], &window, Duration::minutes(30)).is_empty());
    }

    #[test]
    fn test_inverted_events_do_not_block_time() {
        let events = vec![Event::new("bad", "Inverted", at(12, 0), at(11, 0))];
        let slots = find_free_slots(&events, &workday(), Duration::minutes(30));
        assert_eq!(slots, vec![FreeSlot { start: at(9, 0), end: at(17, 0) }]);
    }

    #[test]
    fn test_zero_duration_skips_empty_gaps() {
        let events = vec![
            Event::new("a", "A", at(9, 0), at(10, 0)),
            Event::new("b", "B", at(10, 0), at(17, 0)),
        ];
        assert!(find_free_slots(&events, &workday(), Duration::zero()).is_empty());
    }
}
