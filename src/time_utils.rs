// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
///
/// Millisecond precision keeps stored timestamps sortable as plain strings.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as an RFC3339 string.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_z_suffix_and_millis() {
        let date = DateTime::from_timestamp(1_735_689_600, 5_000_000).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2025-01-01T00:00:00.005Z");
    }

    #[test]
    fn formatted_timestamps_sort_lexically() {
        let earlier = format_utc_rfc3339(DateTime::from_timestamp(1_735_689_600, 0).unwrap());
        let later = format_utc_rfc3339(DateTime::from_timestamp(1_735_689_601, 0).unwrap());
        assert!(earlier < later);
    }
}
