// Copyright 2025 the Stackbar Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! UTC date formatting for tooltip headers.
//!
//! Time is modeled as milliseconds since the Unix epoch. Headers show a date, or a date and a
//! 12-hour clock time when bins are fine enough for the time of day to matter.

extern crate alloc;

use alloc::string::{String, ToString};

use chrono::DateTime;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::grid::TimeBinning;

/// Date-only header format, e.g. `Mar 04, 2024`.
pub const DATE_FORMAT: &str = "%b %d, %Y";
/// Date and time header format, e.g. `Mar 04, 2024 · 01:30PM`.
pub const DATE_TIME_FORMAT: &str = "%b %d, %Y \u{b7} %I:%M%p";

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Formats a UTC millisecond timestamp with a `strftime`-style pattern.
///
/// Returns `None` for timestamps outside the representable range.
pub fn format_utc_millis(ms: i64, pattern: &str) -> Option<String> {
    let dt = DateTime::from_timestamp_millis(ms)?;
    Some(dt.format(pattern).to_string())
}

/// Returns the number of whole days (rounded) between two millisecond timestamps.
pub fn span_days(min_ms: f64, max_ms: f64) -> f64 {
    ((min_ms - max_ms).abs() / MS_PER_DAY).round()
}

/// Returns `true` if headers should show the date only.
///
/// Automatic binning over more than two weeks, or bins coarser than an hour, hide the time.
pub fn prefers_date_only(binning: TimeBinning, span_days: f64) -> bool {
    match binning {
        TimeBinning::Auto => span_days > 14.0,
        TimeBinning::Seconds(s) => s > 3600.0,
    }
}

/// Formats a tooltip header for a timestamp.
pub fn header_for_time(ms: i64, binning: TimeBinning, span_days: f64) -> String {
    let pattern = if prefers_date_only(binning, span_days) {
        DATE_FORMAT
    } else {
        DATE_TIME_FORMAT
    };
    format_utc_millis(ms, pattern).unwrap_or_else(|| ms.to_string())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    // 2024-03-04T13:30:00Z
    const T: i64 = 1_709_559_000_000;

    #[test]
    fn formats_dates_in_utc() {
        assert_eq!(format_utc_millis(T, DATE_FORMAT).as_deref(), Some("Mar 04, 2024"));
        assert_eq!(
            format_utc_millis(T, DATE_TIME_FORMAT).as_deref(),
            Some("Mar 04, 2024 \u{b7} 01:30PM")
        );
    }

    #[test]
    fn granularity_follows_binning() {
        assert!(prefers_date_only(TimeBinning::Auto, 15.0));
        assert!(!prefers_date_only(TimeBinning::Auto, 14.0));
        assert!(prefers_date_only(TimeBinning::Seconds(86_400.0), 1.0));
        assert!(!prefers_date_only(TimeBinning::Seconds(3600.0), 30.0));
    }

    #[test]
    fn span_is_rounded_to_days() {
        assert_eq!(span_days(0.0, MS_PER_DAY * 14.4), 14.0);
        assert_eq!(span_days(MS_PER_DAY * 14.6, 0.0), 15.0);
    }

    #[test]
    fn headers_pick_the_pattern() {
        assert_eq!(header_for_time(T, TimeBinning::Auto, 30.0), "Mar 04, 2024");
        assert_eq!(
            header_for_time(T, TimeBinning::Seconds(60.0), 30.0),
            "Mar 04, 2024 \u{b7} 01:30PM"
        );
    }
}
