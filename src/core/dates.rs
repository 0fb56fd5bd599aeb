//! UTC calendar helpers for backend date/timestamp columns.
use std::time::{SystemTime, UNIX_EPOCH};

const SECONDS_PER_DAY: u64 = 86_400;

/// Civil (year, month, day) for a count of days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Days since 1970-01-01 for a civil date.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let year = year - i64::from(month <= 2);
    let era = year.div_euclid(400);
    let yoe = year.rem_euclid(400);
    let month = i64::from(month);
    let mp = if month > 2 { month - 3 } else { month + 9 };
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn format_civil((year, month, day): (i64, u32, u32)) -> String {
    format!("{:04}-{:02}-{:02}", year, month, day)
}

fn seconds_since_epoch(now: SystemTime) -> u64 {
    now.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// `YYYY-MM-DD` for the given instant.
pub fn date_string(now: SystemTime) -> String {
    let days = (seconds_since_epoch(now) / SECONDS_PER_DAY) as i64;
    format_civil(civil_from_days(days))
}

/// RFC 3339 timestamp (second precision, `Z` suffix) for the given instant.
pub fn timestamp_string(now: SystemTime) -> String {
    let seconds = seconds_since_epoch(now);
    let of_day = seconds % SECONDS_PER_DAY;
    format!(
        "{}T{:02}:{:02}:{:02}Z",
        date_string(now),
        of_day / 3_600,
        (of_day % 3_600) / 60,
        of_day % 60
    )
}

pub fn today() -> String {
    date_string(SystemTime::now())
}

pub fn now_timestamp() -> String {
    timestamp_string(SystemTime::now())
}

/// Leading `YYYY-MM-DD` of a date or timestamp column.
pub fn date_key(value: &str) -> &str {
    value.get(..10).unwrap_or(value)
}

/// `date` moved by `days` calendar days, or `None` if it is not `YYYY-MM-DD`.
pub fn shift_date(date: &str, days: i64) -> Option<String> {
    let mut parts = date_key(date).splitn(3, '-');
    let year: i64 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(format_civil(civil_from_days(
        days_from_civil(year, month, day) + days,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn formats_known_instants() {
        assert_eq!(date_string(UNIX_EPOCH), "1970-01-01");
        // 2024-02-29T12:34:56Z
        let leap_day = UNIX_EPOCH + Duration::from_secs(1_709_210_096);
        assert_eq!(date_string(leap_day), "2024-02-29");
        assert_eq!(timestamp_string(leap_day), "2024-02-29T12:34:56Z");
    }

    #[test]
    fn date_key_truncates_timestamps() {
        assert_eq!(date_key("2025-03-01T08:00:00Z"), "2025-03-01");
        assert_eq!(date_key("2025-03-01"), "2025-03-01");
        assert_eq!(date_key("short"), "short");
    }

    #[test]
    fn shifting_crosses_month_and_year_ends() {
        assert_eq!(shift_date("2024-02-28", 1).as_deref(), Some("2024-02-29"));
        assert_eq!(shift_date("2024-03-01", -1).as_deref(), Some("2024-02-29"));
        assert_eq!(shift_date("2025-01-01", -1).as_deref(), Some("2024-12-31"));
        assert_eq!(shift_date("1970-01-01", 0).as_deref(), Some("1970-01-01"));
        assert_eq!(shift_date("2025-03-01T08:00:00Z", -7).as_deref(), Some("2025-02-22"));
        assert_eq!(shift_date("yesterday", 1), None);
        assert_eq!(shift_date("2025-13-01", 1), None);
    }
}
