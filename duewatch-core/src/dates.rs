//! Date normalization for values coming out of spreadsheet cells.
//!
//! Sheets hands us a mix of numeric day-serials (formula-evaluated cells)
//! and typed strings ("12/10", "12/10/25", "12/10/2025", ISO). Everything
//! funnels into a plain `NaiveDate`; deadlines carry no timezone.

use chrono::{Datelike, Duration, NaiveDate};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("required value is blank")]
    Empty,
    #[error("unrecognized date or duration: {0}")]
    Format(String),
}

/// Convert a Google Sheets day-serial into a date.
///
/// Sheets counts days from 1899-12-30. Fractional serials (datetime cells)
/// truncate toward zero, dropping the time-of-day part. Expects a serial
/// within `NaiveDate`'s range; `parse_loose_date` bound-checks first.
pub fn serial_to_date(serial: f64) -> NaiveDate {
    checked_serial_to_date(serial).unwrap()
}

/// Serial conversion that rejects out-of-range numbers instead of
/// overflowing. Timestamp-like values (epoch milliseconds pasted into a
/// cell) land here and must come back as a parse failure, not a panic.
fn checked_serial_to_date(serial: f64) -> Option<NaiveDate> {
    let days = serial.trunc();
    // NaiveDate spans fewer than 2^27 days either side of the anchor.
    if !days.is_finite() || days.abs() >= 1e9 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    base.checked_add_signed(Duration::days(days as i64))
}

/// Parse a deadline cell that may hold a serial, `dd/mm[/yy[yy]]`, or ISO.
///
/// A year-less `dd/mm` resolves to the next occurrence on or after
/// `reference`: same-year candidate, rolled forward one year if it already
/// passed. Invalid calendar combinations (31/04) are errors, never clamped.
pub fn parse_loose_date(text: &str, reference: NaiveDate) -> Result<NaiveDate, DateError> {
    let s = text.trim();
    if s.is_empty() {
        return Err(DateError::Empty);
    }

    // Serial first: UNFORMATTED_VALUE reads surface dates as numbers, and
    // the intermediate parse failure never reaches the caller.
    if let Ok(serial) = s.parse::<f64>() {
        return checked_serial_to_date(serial).ok_or_else(|| DateError::Format(s.to_string()));
    }

    let parts: Vec<&str> = s.split('/').map(str::trim).collect();
    match parts.as_slice() {
        [d, m, y] => {
            let day = parse_component(d, s)?;
            let month = parse_component(m, s)?;
            let mut year = parse_component(y, s)? as i32;
            if year < 100 {
                year += 2000;
            }
            NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| DateError::Format(s.to_string()))
        }
        [d, m] => {
            let day = parse_component(d, s)?;
            let month = parse_component(m, s)?;
            let candidate = NaiveDate::from_ymd_opt(reference.year(), month, day)
                .ok_or_else(|| DateError::Format(s.to_string()))?;
            if candidate < reference {
                NaiveDate::from_ymd_opt(reference.year() + 1, month, day)
                    .ok_or_else(|| DateError::Format(s.to_string()))
            } else {
                Ok(candidate)
            }
        }
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| DateError::Format(s.to_string())),
    }
}

fn parse_component(token: &str, whole: &str) -> Result<u32, DateError> {
    token
        .parse::<u32>()
        .map_err(|_| DateError::Format(whole.to_string()))
}

/// Parse a duration-in-days cell: "3", "3.0", or a bare number.
///
/// Decimal forms truncate toward zero. Negative durations are rejected.
pub fn parse_duration_days(text: &str) -> Result<u32, DateError> {
    let s = text.trim();
    if s.is_empty() {
        return Err(DateError::Empty);
    }
    let n = s
        .parse::<f64>()
        .map_err(|_| DateError::Format(s.to_string()))?;
    if !n.is_finite() || n < 0.0 {
        return Err(DateError::Format(s.to_string()));
    }
    Ok(n.trunc() as u32)
}
