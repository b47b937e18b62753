use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// A `(departure, arrival)` pair of local wall-clock instants.
pub type Interval = (NaiveDateTime, NaiveDateTime);

pub fn is_overlapping(time: &Interval, window: &Interval) -> bool {
    time.0 < window.1 && time.1 > window.0
}

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses a naive local timestamp such as `2024-01-15T10:00`.
pub fn parse_local(s: &str) -> Option<NaiveDateTime> {
    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
}

/// Formats a duration as `"{hours}h {minutes}m"`, truncating seconds.
pub fn format_duration(delta: TimeDelta) -> String {
    let minutes = delta.num_minutes();
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationResult {
    pub minutes: i64,
    pub text: String,
    pub is_valid: bool,
}

impl DurationResult {
    pub fn invalid() -> Self {
        DurationResult {
            minutes: 0,
            text: "0h 0m".to_string(),
            is_valid: false,
        }
    }

    fn from_elapsed(elapsed: TimeDelta, max_duration: TimeDelta) -> Self {
        if elapsed <= TimeDelta::zero() || elapsed > max_duration {
            return Self::invalid();
        }
        DurationResult {
            minutes: elapsed.num_minutes(),
            text: format_duration(elapsed),
            is_valid: true,
        }
    }
}

/// Parses a `GMT±H` or `GMT±H:MM` token into fractional hours.
///
/// Anything that does not match, including a missing token, is treated as
/// UTC and yields `0.0`.
pub fn parse_offset<'a>(token: impl Into<Option<&'a str>>) -> f64 {
    token.into().and_then(parse_offset_token).unwrap_or(0.0)
}

fn parse_offset_token(token: &str) -> Option<f64> {
    let rest = token.trim().strip_prefix("GMT")?;
    let (sign, rest) = match rest.as_bytes().first()? {
        b'+' => (1.0, &rest[1..]),
        b'-' => (-1.0, &rest[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) if m.len() == 2 => (parse_digits(h)?, parse_digits(m)?),
        Some(_) => return None,
        None => (parse_digits(rest)?, 0),
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours as f64 + minutes as f64 / 60.0))
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn offset_delta(hours: f64) -> TimeDelta {
    TimeDelta::seconds((hours * 3600.0).round() as i64)
}

/// Computes the elapsed time of a flight from local wall-clock times and the
/// `GMT±H[:MM]` offsets of both airports.
///
/// Unrealistic results (non-positive, or longer than `max_duration`) come back
/// as [`DurationResult::invalid`] instead of an error.
pub fn compute_duration<'a>(
    departure: NaiveDateTime,
    arrival: NaiveDateTime,
    origin_offset: impl Into<Option<&'a str>>,
    destination_offset: impl Into<Option<&'a str>>,
    max_duration: TimeDelta,
) -> DurationResult {
    let utc_departure = departure.checked_sub_signed(offset_delta(parse_offset(origin_offset)));
    let utc_arrival = arrival.checked_sub_signed(offset_delta(parse_offset(destination_offset)));
    let (Some(utc_departure), Some(mut utc_arrival)) = (utc_departure, utc_arrival) else {
        return DurationResult::invalid();
    };

    if arrival.date() > departure.date() {
        match correct_day_rollover(departure, arrival, utc_departure, utc_arrival) {
            Some(corrected) => utc_arrival = corrected,
            None => return DurationResult::invalid(),
        }
    }

    DurationResult::from_elapsed(utc_arrival - utc_departure, max_duration)
}

/// Heuristic repair of a spurious day boundary introduced by subtracting
/// fixed offsets from naive timestamps on an overnight flight.
///
/// When the wall-clock duration looks like an ordinary 5-12h sector but the
/// UTC duration is implausibly long (over 20h) or short (under 3h), the UTC
/// arrival is moved back or forward by one day. This is pattern matching, not
/// a proof; callers holding real offsets should use [`zoned_duration`].
/// Returns `None` when the shifted arrival falls outside the calendar.
fn correct_day_rollover(
    departure: NaiveDateTime,
    arrival: NaiveDateTime,
    utc_departure: NaiveDateTime,
    utc_arrival: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let local = arrival - departure;
    let utc = utc_arrival - utc_departure;
    let ordinary_sector = local >= TimeDelta::hours(5) && local <= TimeDelta::hours(12);

    if ordinary_sector && utc > TimeDelta::hours(20) {
        utc_arrival.checked_sub_signed(TimeDelta::days(1))
    } else if ordinary_sector && utc < TimeDelta::hours(3) {
        utc_arrival.checked_add_signed(TimeDelta::days(1))
    } else {
        Some(utc_arrival)
    }
}

/// Duration between two instants that already carry their offsets.
pub fn zoned_duration(
    departure: DateTime<FixedOffset>,
    arrival: DateTime<FixedOffset>,
    max_duration: TimeDelta,
) -> DurationResult {
    DurationResult::from_elapsed(arrival.signed_duration_since(departure), max_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn max() -> TimeDelta {
        TimeDelta::hours(20)
    }

    #[test]
    fn test_parse_offset_positive() {
        assert_eq!(parse_offset("GMT+2"), 2.0);
        assert_eq!(parse_offset("GMT+5:30"), 5.5);
        assert_eq!(parse_offset("GMT+0"), 0.0);
    }

    #[test]
    fn test_parse_offset_negative() {
        assert_eq!(parse_offset("GMT-5"), -5.0);
        assert_eq!(parse_offset("GMT-8"), -8.0);
        assert_eq!(parse_offset("GMT-8:30"), -8.5);
    }

    #[test]
    fn test_parse_offset_invalid() {
        assert_eq!(parse_offset("garbage"), 0.0);
        assert_eq!(parse_offset(""), 0.0);
        assert_eq!(parse_offset(None), 0.0);
        assert_eq!(parse_offset("GMT5"), 0.0);
        assert_eq!(parse_offset("GMT+5:3"), 0.0);
        assert_eq!(parse_offset("GMT+99"), 0.0);
        assert_eq!(parse_offset("GMT+5:75"), 0.0);
    }

    #[test]
    fn test_duration_basic() {
        // London 10:00 GMT+0 -> Barcelona 13:00 GMT+1
        let result = compute_duration(at(15, 10, 0), at(15, 13, 0), "GMT+0", "GMT+1", max());

        assert_eq!(120, result.minutes);
        assert_eq!("2h 0m", result.text);
        assert!(result.is_valid);
    }

    #[test]
    fn test_duration_cross_date_new_york_to_london() {
        let result = compute_duration(at(15, 23, 0), at(16, 11, 0), "GMT-5", "GMT+1", max());

        assert_eq!(360, result.minutes);
        assert_eq!("6h 0m", result.text);
    }

    #[test]
    fn test_duration_tokyo_to_london_same_date() {
        let result = compute_duration(at(15, 1, 0), at(15, 6, 0), "GMT+9", "GMT+1", max());

        assert_eq!(780, result.minutes);
        assert_eq!("13h 0m", result.text);
    }

    #[test]
    fn test_duration_cross_date_london_to_sydney() {
        let result = compute_duration(at(15, 22, 0), at(16, 18, 0), "GMT+1", "GMT+10", max());

        assert_eq!(660, result.minutes);
        assert_eq!("11h 0m", result.text);
    }

    #[test]
    fn test_duration_dubai_to_london() {
        let result = compute_duration(at(15, 2, 0), at(15, 6, 0), "GMT+4", "GMT+1", max());

        assert_eq!(420, result.minutes);
        assert_eq!("7h 0m", result.text);
    }

    #[test]
    fn test_duration_cross_date_london_to_singapore() {
        let result = compute_duration(at(15, 23, 30), at(16, 17, 30), "GMT+1", "GMT+8", max());

        assert_eq!(660, result.minutes);
        assert_eq!("11h 0m", result.text);
    }

    #[test]
    fn test_duration_half_hour_offset() {
        // Delhi 02:00 GMT+5:30 -> London 07:45 GMT+0, 20:30 UTC prev day -> 07:45 UTC
        let result = compute_duration(at(15, 2, 0), at(15, 7, 45), "GMT+5:30", "GMT+0", max());

        assert_eq!(675, result.minutes);
        assert_eq!("11h 15m", result.text);
    }

    #[test]
    fn test_rollover_removes_spurious_day() {
        // local 6h, naive UTC 30h
        let fixed = correct_day_rollover(
            at(15, 20, 0),
            at(16, 2, 0),
            at(15, 20, 0),
            at(17, 2, 0),
        );
        assert_eq!(Some(at(16, 2, 0)), fixed);
    }

    #[test]
    fn test_rollover_adds_missing_day() {
        // local 6h, naive UTC 1h
        let fixed = correct_day_rollover(
            at(15, 20, 0),
            at(16, 2, 0),
            at(15, 20, 0),
            at(15, 21, 0),
        );
        assert_eq!(Some(at(16, 21, 0)), fixed);
    }

    #[test]
    fn test_rollover_ignores_long_sectors() {
        let fixed = correct_day_rollover(
            at(15, 10, 0),
            at(16, 2, 0),
            at(15, 10, 0),
            at(15, 11, 0),
        );
        assert_eq!(Some(at(15, 11, 0)), fixed);
    }

    #[test]
    fn test_invalid_duration_handling() {
        let result = compute_duration(at(15, 10, 0), at(15, 8, 0), "GMT+0", "GMT+0", max());

        assert_eq!(DurationResult::invalid(), result);
        assert_eq!("0h 0m", result.text);
    }

    #[test]
    fn test_zero_duration_is_invalid() {
        let result = compute_duration(at(15, 10, 0), at(15, 10, 0), None, None, max());
        assert!(!result.is_valid);
        assert_eq!(0, result.minutes);
    }

    #[test]
    fn test_duration_over_maximum_is_invalid() {
        let result = compute_duration(at(15, 0, 0), at(15, 22, 0), "GMT+0", "GMT+0", max());
        assert!(!result.is_valid);
    }

    #[test]
    fn test_zoned_duration() {
        let dep = DateTime::parse_from_rfc3339("2024-01-15T23:00:00-05:00").unwrap();
        let arr = DateTime::parse_from_rfc3339("2024-01-16T11:00:00+01:00").unwrap();

        let result = zoned_duration(dep, arr, max());

        assert_eq!(360, result.minutes);
        assert_eq!("6h 0m", result.text);
    }

    #[test]
    fn test_parse_local() {
        assert_eq!(Some(at(15, 23, 0)), parse_local("2024-01-15T23:00"));
        assert_eq!(Some(at(15, 23, 0)), parse_local("2024-01-15 23:00:00"));
        assert_eq!(None, parse_local("15/01/2024"));
    }

    #[test]
    fn test_duration_at_calendar_bounds_is_invalid() {
        let late = NaiveDateTime::MAX - TimeDelta::hours(2);
        let result = compute_duration(late, NaiveDateTime::MAX, "GMT-5", "GMT-5", max());
        assert_eq!(DurationResult::invalid(), result);

        let early = NaiveDateTime::MIN + TimeDelta::hours(2);
        let result = compute_duration(NaiveDateTime::MIN, early, "GMT+5", "GMT+5", max());
        assert_eq!(DurationResult::invalid(), result);
    }

    #[test]
    fn test_overlap_is_exclusive_at_bounds() {
        assert!(is_overlapping(&(at(15, 8, 0), at(15, 10, 0)), &(at(15, 9, 0), at(15, 11, 0))));
        assert!(!is_overlapping(&(at(15, 8, 0), at(15, 10, 0)), &(at(15, 10, 0), at(15, 11, 0))));
    }

    proptest! {
        #[test]
        fn test_parse_offset_never_leaves_a_day(token in ".{0,12}") {
            let hours = parse_offset(token.as_str());
            prop_assert!(hours.abs() < 24.0);
        }

        #[test]
        fn test_parse_offset_roundtrips_tokens(sign in prop_oneof![Just('+'), Just('-')], h in 0u32..24, m in 0u32..60) {
            let token = format!("GMT{}{}:{:02}", sign, h, m);
            let expected = (h as f64 + m as f64 / 60.0) * if sign == '-' { -1.0 } else { 1.0 };
            prop_assert!((parse_offset(token.as_str()) - expected).abs() < 1e-9);
        }
    }
}
