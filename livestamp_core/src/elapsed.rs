// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Elapsed-time conversion.
//!
//! The player shows the playback position as `SS`, `MM:SS` or `HH:MM:SS`.
//! [`to_seconds`] turns that text into seconds and never fails: the display
//! may transiently hold placeholder text, which reads as zero.

use chrono::TimeDelta;

/// Converts a `[[HH:]MM:]SS` timecode into elapsed seconds.
///
/// Segments are read right to left as seconds, minutes and hours; anything
/// left of the hours segment is ignored. Missing, empty, or non-numeric
/// segments count as zero.
#[must_use]
pub fn to_seconds(text: &str) -> f64 {
    let mut segments = text.rsplit(':');
    let sec = segments.next().map_or(0.0, segment_value);
    let min = segments.next().map_or(0.0, segment_value);
    let hour = segments.next().map_or(0.0, segment_value);
    hour * 3600.0 + min * 60.0 + sec
}

/// Converts a timecode into a millisecond-precision [`TimeDelta`].
///
/// Returns `None` only when the value does not fit in a `TimeDelta`.
#[must_use]
pub fn elapsed_delta(text: &str) -> Option<TimeDelta> {
    let millis = to_seconds(text) * 1000.0;
    let limit = i64::MAX as f64;
    if !(millis > -limit && millis < limit) {
        return None;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "range checked above; sub-millisecond fractions are dropped"
    )]
    let millis = millis as i64;
    TimeDelta::try_milliseconds(millis)
}

fn segment_value(segment: &str) -> f64 {
    match segment.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_timecode() {
        assert_eq!(to_seconds("1:02:03"), 3723.0);
        assert_eq!(to_seconds("10:00:00"), 36_000.0);
    }

    #[test]
    fn missing_segments_default_to_zero() {
        assert_eq!(to_seconds("02:03"), 123.0);
        assert_eq!(to_seconds("7"), 7.0);
        assert_eq!(to_seconds(""), 0.0);
    }

    #[test]
    fn non_numeric_segments_read_as_zero() {
        assert_eq!(to_seconds("ab:30"), 30.0);
        assert_eq!(to_seconds("1:xx:05"), 3605.0);
        assert_eq!(to_seconds("LIVE"), 0.0);
        assert_eq!(to_seconds("NaN:inf:3"), 3.0);
    }

    #[test]
    fn whitespace_is_ignored() {
        assert_eq!(to_seconds(" 1 : 05 "), 65.0);
    }

    #[test]
    fn extra_leading_segments_are_ignored() {
        assert_eq!(to_seconds("9:1:00:00"), 3600.0);
    }

    #[test]
    fn delta_has_millisecond_precision() {
        assert_eq!(elapsed_delta("10:00"), Some(TimeDelta::seconds(600)));
        assert_eq!(elapsed_delta("1.5"), Some(TimeDelta::milliseconds(1500)));
    }

    #[test]
    fn delta_rejects_out_of_range_values() {
        assert_eq!(elapsed_delta("1e300"), None);
    }
}
