//! Locale-aware number and date primitives used by the reconciler.

use crate::spreadsheet::cell::serial_to_date;
use chrono::NaiveDate;
use regex::Captures;
use regex::Regex;
use std::sync::LazyLock;

/// Day-first dates: `01.03.2024`, `1/3/24`, `01-03-2024`
static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d{1,2})[./-](\d{1,2})[./-](\d{4}|\d{2})(?:\D|$)").expect("Hardcode regex pattern")
});

/// ISO dates: `2024-03-01`, optionally followed by a time
static ISO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d{4})-(\d{1,2})-(\d{1,2})(?:\D|$)").expect("Hardcode regex pattern")
});

/// Largest serial number Excel can display as a date (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Parses a number, accepting `,` as the decimal separator.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Renders a record number: trimmed text, with a purely zero fraction dropped.
pub fn record_number(value: &str) -> String {
    let value = value.trim();
    match value.split_once(['.', ',']) {
        Some((integer, fraction))
            if !integer.is_empty()
                && fraction.chars().all(|c| c == '0')
                && parse_number(integer).is_some() =>
        {
            integer.to_string()
        }
        _ => value.to_string(),
    }
}

/// Parses the first date found in `value`; `None` when nothing date-like is
/// there or the first date-like token is not a valid date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let iso = ISO.captures(value);
    let day_first = DAY_FIRST.captures(value);
    match (token_start(&iso), token_start(&day_first)) {
        (Some(iso_start), day_first_start) if day_first_start.map_or(true, |start| iso_start < start) => {
            iso.as_ref().and_then(year_first_date)
        }
        (_, Some(_)) => day_first.as_ref().and_then(day_first_date),
        _ => parse_number(value)
            .filter(|serial| *serial >= 1.0 && *serial <= MAX_EXCEL_SERIAL)
            .and_then(|serial| serial_to_date(serial.trunc() as i64, false)),
    }
}

/// Offset of the first digit of a matched date token.
fn token_start(captures: &Option<Captures>) -> Option<usize> {
    captures.as_ref()?.get(1).map(|token| token.start())
}

fn year_first_date(captures: &Captures) -> Option<NaiveDate> {
    let year = captures[1].parse::<i32>().ok()?;
    let month = captures[2].parse::<u32>().ok()?;
    let day = captures[3].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn day_first_date(captures: &Captures) -> Option<NaiveDate> {
    let day = captures[1].parse::<u32>().ok()?;
    let month = captures[2].parse::<u32>().ok()?;
    let year = match &captures[3] {
        short if short.len() == 2 => 2000 + short.parse::<i32>().ok()?,
        long => long.parse::<i32>().ok()?,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}
