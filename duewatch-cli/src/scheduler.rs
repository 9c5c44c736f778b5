//! Daily-cadence loop: sleep until the configured HH:MM in the operator's
//! timezone, run a pass, repeat.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

pub fn parse_send_time(hm: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(hm.trim(), "%H:%M")
        .with_context(|| format!("message_time must be HH:MM, got '{hm}'"))
}

pub fn parse_timezone(tz: &str) -> Result<Tz> {
    match tz.parse::<Tz>() {
        Ok(tz) => Ok(tz),
        Err(_) => bail!("invalid timezone: {tz}"),
    }
}

/// First instant strictly after `now` that reads `at` on a wall clock in
/// `tz`. Walks forward a day at a time so a send time skipped by a DST
/// jump lands on the next valid day.
pub fn next_run_after(now: DateTime<Utc>, at: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let mut day = now.with_timezone(&tz).date_naive();
    loop {
        if let Some(local) = tz.from_local_datetime(&day.and_time(at)).earliest() {
            let candidate = local.with_timezone(&Utc);
            if candidate > now {
                return candidate;
            }
        }
        day += Duration::days(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn same_day_when_send_time_is_ahead() {
        let tz: Tz = "Europe/Rome".parse().unwrap();
        let at = parse_send_time("08:30").unwrap();
        // 06:00 UTC in winter is 07:00 in Rome, before 08:30.
        let next = next_run_after(utc("2026-01-10T06:00:00Z"), at, tz);
        assert_eq!(next, utc("2026-01-10T07:30:00Z"));
    }

    #[test]
    fn next_day_when_send_time_passed() {
        let tz: Tz = "Europe/Rome".parse().unwrap();
        let at = parse_send_time("08:30").unwrap();
        let next = next_run_after(utc("2026-01-10T12:00:00Z"), at, tz);
        assert_eq!(next, utc("2026-01-11T07:30:00Z"));
    }

    #[test]
    fn exact_hit_schedules_the_following_day() {
        let tz: Tz = "Europe/Rome".parse().unwrap();
        let at = parse_send_time("08:30").unwrap();
        let next = next_run_after(utc("2026-01-10T07:30:00Z"), at, tz);
        assert_eq!(next, utc("2026-01-11T07:30:00Z"));
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(parse_send_time("8h30").is_err());
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
