use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::models::{BookedInterval, Slot, TimeRange};

/// Removes booked time from a session span, leaving the free chunks in
/// ascending order.
///
/// Intervals must arrive sorted by start time. Intervals that are inactive,
/// empty, or reach outside the span belong to another session or are
/// malformed rows, and are skipped.
pub fn free_chunks(span: TimeRange, booked: &[BookedInterval]) -> Vec<TimeRange> {
    let mut chunks = vec![span];

    for interval in booked {
        if !interval.status.is_active() {
            continue;
        }

        let range = interval.time_range();
        if range.start >= range.end || !span.contains(&range) {
            continue;
        }

        // An interval straddling two chunks overlaps an earlier booking that
        // already blocked part of its time; nothing left to remove for it.
        let index = match chunks.iter().position(|chunk| chunk.contains(&range)) {
            Some(index) => index,
            None => continue,
        };

        let chunk = chunks[index];
        if range.start == chunk.start {
            chunks[index] = TimeRange::new(range.end, chunk.end);
        } else {
            chunks[index] = TimeRange::new(chunk.start, range.start);
            chunks.insert(index + 1, TimeRange::new(range.end, chunk.end));
        }
    }

    chunks.retain(|chunk| chunk.start < chunk.end);
    chunks
}

/// Walks a free chunk from its start in fixed steps, emitting every start the
/// step still fits behind. Starts already in the past stay in the output
/// flagged unavailable unless `available_only` drops them.
pub fn quantize_chunk(
    chunk: TimeRange,
    step_minutes: i64,
    date: NaiveDate,
    now: NaiveDateTime,
    available_only: bool,
) -> Vec<Slot> {
    if step_minutes <= 0 || chunk.end <= chunk.start {
        return vec![];
    }

    let step = Duration::minutes(step_minutes);
    let mut slots = Vec::new();
    let mut current = chunk.start;

    loop {
        // overflowing_add_signed: a step crossing midnight never fits.
        let (fit_end, overflow) = current.overflowing_add_signed(step);
        if overflow != 0 || fit_end > chunk.end {
            break;
        }

        let available = date.and_time(current) >= now;
        if available || !available_only {
            slots.push(Slot { time: current, available });
        }

        current = fit_end;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;
    use chrono::NaiveTime;
    use uuid::Uuid;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn range(start: (u32, u32), end: (u32, u32)) -> TimeRange {
        TimeRange::new(time(start.0, start.1), time(end.0, end.1))
    }

    fn test_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn early_morning() -> NaiveDateTime {
        test_date().and_hms_opt(0, 0, 0).unwrap()
    }

    fn booked(start: (u32, u32), end: (u32, u32), status: BookingStatus) -> BookedInterval {
        BookedInterval {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            clinic_id: Uuid::new_v4(),
            date: test_date(),
            start_time: time(start.0, start.1),
            end_time: time(end.0, end.1),
            status,
        }
    }

    fn slot_times(slots: &[Slot]) -> Vec<NaiveTime> {
        slots.iter().map(|slot| slot.time).collect()
    }

    #[test]
    fn quantizes_whole_session_including_edge_fitting_slot() {
        let slots = quantize_chunk(range((9, 0), (12, 0)), 15, test_date(), early_morning(), false);

        assert_eq!(slots.len(), 12);
        assert_eq!(slots[0].time, time(9, 0));
        // 11:45 + 15 lands exactly on the session end and still fits.
        assert_eq!(slots[11].time, time(11, 45));
        assert!(slots.iter().all(|slot| slot.available));
    }

    #[test]
    fn booked_interval_splits_span_into_two_chunks() {
        let booked = [booked((9, 15), (9, 30), BookingStatus::Confirmed)];
        let chunks = free_chunks(range((9, 0), (10, 0)), &booked);

        assert_eq!(chunks, vec![range((9, 0), (9, 15)), range((9, 30), (10, 0))]);

        let mut slots = Vec::new();
        for chunk in chunks {
            slots.extend(quantize_chunk(chunk, 15, test_date(), early_morning(), false));
        }
        assert_eq!(slot_times(&slots), vec![time(9, 0), time(9, 30), time(9, 45)]);
    }

    #[test]
    fn booking_at_chunk_start_consumes_front() {
        let booked = [booked((9, 0), (9, 30), BookingStatus::Pending)];
        let chunks = free_chunks(range((9, 0), (10, 0)), &booked);

        assert_eq!(chunks, vec![range((9, 30), (10, 0))]);
    }

    #[test]
    fn booking_filling_whole_span_leaves_nothing() {
        let booked = [booked((9, 0), (10, 0), BookingStatus::Confirmed)];
        let chunks = free_chunks(range((9, 0), (10, 0)), &booked);

        assert!(chunks.is_empty());
    }

    #[test]
    fn intervals_reaching_outside_span_are_ignored() {
        let booked = [
            booked((8, 0), (9, 30), BookingStatus::Confirmed),
            booked((11, 30), (12, 30), BookingStatus::Confirmed),
        ];
        let chunks = free_chunks(range((9, 0), (12, 0)), &booked);

        assert_eq!(chunks, vec![range((9, 0), (12, 0))]);
    }

    #[test]
    fn inactive_bookings_do_not_block_time() {
        let booked = [
            booked((9, 0), (9, 30), BookingStatus::Cancelled),
            booked((9, 30), (10, 0), BookingStatus::NoShow),
        ];
        let chunks = free_chunks(range((9, 0), (10, 0)), &booked);

        assert_eq!(chunks, vec![range((9, 0), (10, 0))]);
    }

    #[test]
    fn overlapping_booking_is_dropped_after_first_claims_chunk() {
        let booked = [
            booked((9, 0), (9, 30), BookingStatus::Confirmed),
            booked((9, 15), (9, 45), BookingStatus::Confirmed),
        ];
        let chunks = free_chunks(range((9, 0), (10, 0)), &booked);

        assert_eq!(chunks, vec![range((9, 30), (10, 0))]);
    }

    #[test]
    fn chunks_and_booked_time_cover_the_span() {
        let booked = [
            booked((9, 30), (9, 45), BookingStatus::Confirmed),
            booked((10, 30), (11, 0), BookingStatus::Confirmed),
        ];
        let span = range((9, 0), (12, 0));
        let chunks = free_chunks(span, &booked);

        let free_minutes: i64 = chunks.iter()
            .map(|chunk| (chunk.end - chunk.start).num_minutes())
            .sum();
        let booked_minutes: i64 = booked.iter()
            .map(|interval| (interval.end_time - interval.start_time).num_minutes())
            .sum();
        assert_eq!(free_minutes + booked_minutes, (span.end - span.start).num_minutes());

        // Ordered, non-overlapping, inside the span.
        for pair in chunks.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        for chunk in &chunks {
            assert!(span.contains(chunk));
        }
    }

    #[test]
    fn aggregated_duration_fits_once_in_short_session() {
        let slots = quantize_chunk(range((9, 0), (10, 0)), 40, test_date(), early_morning(), false);

        assert_eq!(slot_times(&slots), vec![time(9, 0)]);
    }

    #[test]
    fn slot_not_fitting_before_chunk_end_is_rejected() {
        let slots = quantize_chunk(range((9, 0), (9, 50)), 15, test_date(), early_morning(), false);

        assert_eq!(slot_times(&slots), vec![time(9, 0), time(9, 15), time(9, 30)]);
    }

    #[test]
    fn longer_durations_never_add_slots() {
        let chunk = range((9, 0), (11, 0));

        let mut previous = usize::MAX;
        for step in [15, 30, 40, 60, 90, 150] {
            let count = quantize_chunk(chunk, step, test_date(), early_morning(), false).len();
            assert!(count <= previous, "step {} produced {} slots after {}", step, count, previous);
            previous = count;
        }
    }

    #[test]
    fn past_starts_stay_listed_but_unavailable() {
        let now = test_date().and_hms_opt(10, 30, 0).unwrap();
        let slots = quantize_chunk(range((9, 0), (12, 0)), 60, test_date(), now, false);

        assert_eq!(slot_times(&slots), vec![time(9, 0), time(10, 0), time(11, 0)]);
        assert!(!slots[0].available);
        assert!(!slots[1].available);
        assert!(slots[2].available);
    }

    #[test]
    fn start_exactly_at_now_is_still_available() {
        let now = test_date().and_hms_opt(10, 30, 0).unwrap();
        let slots = quantize_chunk(range((10, 30), (11, 30)), 60, test_date(), now, false);

        assert_eq!(slots, vec![Slot { time: time(10, 30), available: true }]);
    }

    #[test]
    fn available_only_drops_past_starts() {
        let now = test_date().and_hms_opt(10, 30, 0).unwrap();
        let slots = quantize_chunk(range((9, 0), (12, 0)), 60, test_date(), now, true);

        assert_eq!(slots, vec![Slot { time: time(11, 0), available: true }]);
    }

    #[test]
    fn degenerate_inputs_produce_no_slots() {
        let inverted = TimeRange::new(time(12, 0), time(9, 0));
        assert!(quantize_chunk(inverted, 15, test_date(), early_morning(), false).is_empty());

        assert!(quantize_chunk(range((9, 0), (10, 0)), 0, test_date(), early_morning(), false).is_empty());
        assert!(quantize_chunk(range((9, 0), (9, 0)), 15, test_date(), early_morning(), false).is_empty());
    }

    #[test]
    fn steps_near_midnight_do_not_wrap() {
        let slots = quantize_chunk(range((23, 0), (23, 59)), 60, test_date(), early_morning(), false);

        assert!(slots.is_empty());
    }
}
