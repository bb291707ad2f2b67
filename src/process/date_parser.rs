use crate::process::utils::parse_int_prefix;
use chrono::{Datelike, NaiveDate, TimeDelta};
use tracing::error;

/// Parse a compact `"YYYYMMDD"` token into a calendar date.
///
/// Components that fall outside their range roll over into the neighbouring
/// month or year (`20231301` is 1 January 2024, `20230100` is 31 December
/// 2022), and two-digit years are read as 19xx. Tokens that are not exactly
/// eight characters are logged and yield `None`.
pub fn parse_compact_date(token: &str) -> Option<NaiveDate> {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() != 8 {
        error!(token, "invalid compact date format");
        return None;
    }
    let part = |from: usize, to: usize| chars[from..to].iter().collect::<String>();

    let year = parse_int_prefix(&part(0, 4))?;
    let month = parse_int_prefix(&part(4, 6))?;
    let day = parse_int_prefix(&part(6, 8))?;

    rolled_date(year, month - 1, day)
}

/// Build a date from a year, a zero-based month and a day, carrying any
/// overflow instead of rejecting it.
fn rolled_date(year: i64, month0: i64, day: i64) -> Option<NaiveDate> {
    let year = if (0..=99).contains(&year) { year + 1900 } else { year };

    let total_months = year.checked_mul(12)?.checked_add(month0)?;
    let y = i32::try_from(total_months.div_euclid(12)).ok()?;
    let m = u32::try_from(total_months.rem_euclid(12) + 1).ok()?;

    let first = NaiveDate::from_ymd_opt(y, m, 1)?;
    first.checked_add_signed(TimeDelta::try_days(day - 1)?)
}

/// Format as `"DD/MM/YYYY"`; absent dates render as an empty string.
pub fn format_display_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{:02}/{:02}/{}", d.day(), d.month(), d.year()),
        None => String::new(),
    }
}

/// Pull the year out of a `"DD/MM/YYYY"` string.
pub fn extract_year(date: &str) -> Option<String> {
    let parts: Vec<&str> = date.split('/').collect();
    if parts.len() == 3 {
        return Some(parts[2].to_string());
    }
    error!(date, "invalid display date format for year extraction");
    None
}
