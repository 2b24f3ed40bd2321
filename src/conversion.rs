use atoi::{FromRadix10Checked, FromRadix10SignedChecked};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use odbc_sys::Timestamp;

/// Maximum length of the text representation of a 64 Bit integer, including sign and terminating
/// zero. `-9223372036854775808` has 20 characters.
pub const MAX_BIGINT_LENGTH: usize = 21;

/// Parses the text representation of a signed 64 Bit integer. The entire text must be consumed,
/// and the value must fit into an `i64`. A leading `+` or `-` is accepted.
pub fn text_to_i64(text: &[u8]) -> Option<i64> {
    let (value, num_bytes) = i64::from_radix_10_signed_checked(text);
    complete(value, num_bytes, text)
}

/// Parses the text representation of an unsigned 64 Bit integer. The entire text must be consumed,
/// and the value must fit into an `u64`. Signs are not accepted.
pub fn text_to_u64(text: &[u8]) -> Option<u64> {
    let (value, num_bytes) = u64::from_radix_10_checked(text);
    complete(value, num_bytes, text)
}

fn complete<I>(value: Option<I>, num_bytes: usize, text: &[u8]) -> Option<I> {
    // Neither an empty text, a lonely sign nor trailing garbage are integer literals.
    let has_digits = text.iter().any(u8::is_ascii_digit);
    if num_bytes == text.len() && has_digits {
        value
    } else {
        None
    }
}

/// Composes a calendar timestamp from the fields of an ODBC timestamp struct. Fields out of their
/// usual range are normalized like `mktime` does it, e.g. month 13 of 2023 is January 2024 and
/// day 0 is the last day of the previous month. `fraction` is interpreted as nanoseconds.
///
/// `None` if the result can not be represented.
pub fn timestamp_to_date_time(ts: &Timestamp) -> Option<NaiveDateTime> {
    let months = i64::from(ts.year) * 12 + i64::from(ts.month) - 1;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12)).ok()? + 1;
    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
    let seconds =
        i64::from(ts.hour) * 3600 + i64::from(ts.minute) * 60 + i64::from(ts.second);
    first_of_month
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(TimeDelta::try_days(i64::from(ts.day) - 1)?)?
        .checked_add_signed(TimeDelta::try_seconds(seconds)?)?
        .checked_add_signed(TimeDelta::nanoseconds(i64::from(ts.fraction)))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use odbc_sys::Timestamp;
    use test_case::test_case;

    use super::*;

    #[test_case(b"-9223372036854775808", Some(i64::MIN); "minimum")]
    #[test_case(b"9223372036854775807", Some(i64::MAX); "maximum")]
    #[test_case(b"+42", Some(42); "explicit plus sign")]
    #[test_case(b"0", Some(0); "zero")]
    #[test_case(b"9223372036854775808", None; "overflow")]
    #[test_case(b"12a", None; "trailing garbage")]
    #[test_case(b"", None; "empty")]
    #[test_case(b"-", None; "lonely sign")]
    #[test_case(b"1.5", None; "decimal")]
    fn parse_i64(text: &[u8], expected: Option<i64>) {
        assert_eq!(expected, text_to_i64(text));
    }

    #[test_case(b"18446744073709551615", Some(u64::MAX); "maximum")]
    #[test_case(b"0", Some(0); "zero")]
    #[test_case(b"18446744073709551616", None; "overflow")]
    #[test_case(b"-1", None; "negative")]
    #[test_case(b"", None; "empty")]
    fn parse_u64(text: &[u8], expected: Option<u64>) {
        assert_eq!(expected, text_to_u64(text));
    }

    fn ts(year: i16, month: u16, day: u16, hour: u16, minute: u16, second: u16) -> Timestamp {
        Timestamp {
            year,
            month,
            day,
            hour,
            minute,
            second,
            fraction: 0,
        }
    }

    fn date_time(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn regular_timestamp() {
        assert_eq!(
            Some(date_time(2024, 2, 29, 23, 59, 58)),
            timestamp_to_date_time(&ts(2024, 2, 29, 23, 59, 58))
        );
    }

    #[test]
    fn month_overflow_rolls_into_next_year() {
        assert_eq!(
            Some(date_time(2024, 1, 15, 0, 0, 0)),
            timestamp_to_date_time(&ts(2023, 13, 15, 0, 0, 0))
        );
    }

    #[test]
    fn day_zero_is_last_day_of_previous_month() {
        assert_eq!(
            Some(date_time(2023, 2, 28, 12, 0, 0)),
            timestamp_to_date_time(&ts(2023, 3, 0, 12, 0, 0))
        );
    }

    #[test]
    fn hour_overflow_rolls_into_next_day() {
        assert_eq!(
            Some(date_time(2000, 1, 2, 1, 0, 0)),
            timestamp_to_date_time(&ts(2000, 1, 1, 25, 0, 0))
        );
    }

    #[test]
    fn fraction_is_nanoseconds() {
        let mut timestamp = ts(2020, 6, 1, 8, 30, 0);
        timestamp.fraction = 123_000_000;
        let expected = NaiveDate::from_ymd_opt(2020, 6, 1)
            .unwrap()
            .and_hms_milli_opt(8, 30, 0, 123)
            .unwrap();
        assert_eq!(Some(expected), timestamp_to_date_time(&timestamp));
    }
}
