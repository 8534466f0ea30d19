// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Date formatting collaborator.
//!
//! The overlay needs two renderings of an instant: a time of day for the
//! start-time label and a full date and time for the original-time label.
//! Browsers provide locale-aware formatting through `Intl.DateTimeFormat`
//! (see `livestamp_backend_web`); [`PatternFormatter`] is the portable
//! implementation used in tests and harnesses.

use alloc::string::{String, ToString as _};

use chrono::{DateTime, FixedOffset, Offset as _, Utc};

/// Renders instants for the overlay labels.
pub trait DateFormatter {
    /// Formats hour, minute and second.
    fn time_of_day(&self, at: DateTime<FixedOffset>) -> String;

    /// Formats year, month, day, weekday, hour, minute and second.
    fn date_time(&self, at: DateTime<FixedOffset>) -> String;
}

/// [`DateFormatter`] backed by `chrono` format strings, evaluated in a fixed
/// display offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternFormatter {
    offset: FixedOffset,
    time_pattern: &'static str,
    date_time_pattern: &'static str,
}

impl PatternFormatter {
    /// Default pattern for [`DateFormatter::time_of_day`].
    pub const TIME_OF_DAY: &'static str = "%H:%M:%S";
    /// Default pattern for [`DateFormatter::date_time`].
    pub const DATE_TIME: &'static str = "%Y/%m/%d (%a) %H:%M:%S";

    /// Creates a formatter that displays instants in `offset` with the
    /// default patterns.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            time_pattern: Self::TIME_OF_DAY,
            date_time_pattern: Self::DATE_TIME,
        }
    }

    /// Creates a formatter that displays instants in UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Replaces both patterns.
    #[must_use]
    pub const fn with_patterns(
        mut self,
        time_pattern: &'static str,
        date_time_pattern: &'static str,
    ) -> Self {
        self.time_pattern = time_pattern;
        self.date_time_pattern = date_time_pattern;
        self
    }

    /// Returns the display offset.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Default for PatternFormatter {
    fn default() -> Self {
        Self::utc()
    }
}

impl DateFormatter for PatternFormatter {
    fn time_of_day(&self, at: DateTime<FixedOffset>) -> String {
        at.with_timezone(&self.offset)
            .format(self.time_pattern)
            .to_string()
    }

    fn date_time(&self, at: DateTime<FixedOffset>) -> String {
        at.with_timezone(&self.offset)
            .format(self.date_time_pattern)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn utc_defaults() {
        let f = PatternFormatter::utc();
        let t = at("2024-03-01T10:00:00+09:00");
        assert_eq!(f.time_of_day(t), "01:00:00");
        assert_eq!(f.date_time(t), "2024/03/01 (Fri) 01:00:00");
    }

    #[test]
    fn display_offset_is_applied() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let f = PatternFormatter::new(jst);
        let t = at("2024-02-29T23:30:00Z");
        assert_eq!(f.time_of_day(t), "08:30:00");
        assert_eq!(f.date_time(t), "2024/03/01 (Fri) 08:30:00");
    }

    #[test]
    fn custom_patterns() {
        let f = PatternFormatter::utc().with_patterns("%I:%M %p", "%a %e %b %Y");
        let t = at("2024-03-01T13:05:00Z");
        assert_eq!(f.time_of_day(t), "01:05 PM");
        assert_eq!(f.date_time(t), "Fri  1 Mar 2024");
    }
}
