//! Deterministic per-segment time ranges used to drive frame extraction.
//!
//! `i ∈ [0, ceil(durationMs / segmentDurationMs))`:
//! `start = i·segmentDurationMs / 1000`, `end = min((i+1)·segmentDurationMs, durationMs) / 1000`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub segment_index: u32,
    pub start_sec: u64,
    pub end_sec: u64,
}

impl TimeRange {
    pub fn duration_secs(&self) -> u64 {
        self.end_sec.saturating_sub(self.start_sec)
    }
}

/// Splits `duration_ms` into contiguous, non-overlapping ranges of at most
/// `segment_duration_ms` each.
pub fn compute(duration_ms: i64, segment_duration_ms: u32) -> Vec<TimeRange> {
    if duration_ms <= 0 || segment_duration_ms == 0 {
        return Vec::new();
    }

    let duration_ms = duration_ms as u64;
    let segment_duration_ms = segment_duration_ms as u64;
    let segment_count = duration_ms.div_ceil(segment_duration_ms);

    (0..segment_count)
        .map(|i| {
            let start_ms = i * segment_duration_ms;
            let end_ms = ((i + 1) * segment_duration_ms).min(duration_ms);
            TimeRange {
                segment_index: i as u32,
                start_sec: start_ms / 1000,
                end_sec: end_ms / 1000,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_yields_no_ranges() {
        assert!(compute(0, 10_000).is_empty());
    }

    #[test]
    fn exact_multiple_yields_even_ranges() {
        let ranges = compute(30_000, 10_000);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0], TimeRange { segment_index: 0, start_sec: 0, end_sec: 10 });
        assert_eq!(ranges[2], TimeRange { segment_index: 2, start_sec: 20, end_sec: 30 });
    }

    #[test]
    fn trailing_partial_segment_is_clamped_to_duration() {
        let ranges = compute(25_000, 10_000);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[2], TimeRange { segment_index: 2, start_sec: 20, end_sec: 25 });
    }

    #[test]
    fn ranges_are_contiguous_non_overlapping_and_sorted() {
        let ranges = compute(97_400, 10_000);
        for window in ranges.windows(2) {
            assert_eq!(window[0].end_sec, window[1].start_sec);
            assert!(window[0].start_sec < window[1].start_sec);
        }
    }

    #[test]
    fn ranges_cover_the_full_duration() {
        let duration_ms = 97_400i64;
        let ranges = compute(duration_ms, 10_000);
        let covered_ms: i64 = ranges.iter().map(|r| (r.duration_secs() * 1000) as i64).sum();
        // Coverage is exact to the second; fractional trailing milliseconds
        // (here 400ms) are not separately surfaced as their own range.
        assert_eq!(covered_ms, (duration_ms / 1000) * 1000);
    }
}
