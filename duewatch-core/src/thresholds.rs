//! Warning-threshold derivation: at which days-before-deadline offsets a
//! service should fire a reminder.

use std::collections::BTreeSet;

use chrono::NaiveDate;

/// Parse the operator's free-text offsets field ("7, 3,30"). Invalid
/// tokens are dropped without complaint; blank input is the empty set.
pub fn parse_custom_offsets(text: &str) -> BTreeSet<i64> {
    text.split(',')
        .filter_map(|tok| tok.trim().parse::<i64>().ok())
        .collect()
}

/// Offsets at which a service with this duration warns: halfway through
/// (integer ceiling), day-before, day-of, day-after, plus the operator's
/// custom offsets. Negative offsets mean days past the deadline.
pub fn thresholds(duration_days: u32, custom: &BTreeSet<i64>) -> BTreeSet<i64> {
    let half = i64::from(duration_days.div_ceil(2));
    let mut set: BTreeSet<i64> = [half, 1, 0, -1].into();
    set.extend(custom.iter().copied());
    set
}

/// Some(offset from today) when the deadline sits on one of the service's
/// thresholds today, None otherwise.
pub fn due_offset(
    deadline: NaiveDate,
    today: NaiveDate,
    duration_days: u32,
    custom: &BTreeSet<i64>,
) -> Option<i64> {
    let offset = (deadline - today).num_days();
    thresholds(duration_days, custom)
        .contains(&offset)
        .then_some(offset)
}
