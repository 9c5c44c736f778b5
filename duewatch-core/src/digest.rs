//! Group today's due services per area and render the notification text.
//!
//! Rendering is pure: delivery belongs to the Telegram side.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::gantt::DeadlineRecord;
use crate::thresholds::due_offset;

#[derive(Debug, Clone, PartialEq)]
pub struct DueService {
    pub service: String,
    pub deadline: NaiveDate,
}

/// Everything due for one area: offset-from-today -> services, services in
/// spreadsheet row order inside each bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaDigest {
    pub area: String,
    pub buckets: BTreeMap<i64, Vec<DueService>>,
}

impl AreaDigest {
    pub fn new(area: impl Into<String>) -> Self {
        Self {
            area: area.into(),
            buckets: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Bucket every record whose offset from `today` is one of its thresholds.
/// Areas come out in first-seen (row) order.
pub fn group_by_area(
    records: &[DeadlineRecord],
    today: NaiveDate,
    custom: &BTreeSet<i64>,
) -> Vec<AreaDigest> {
    let mut out: Vec<AreaDigest> = Vec::new();

    for record in records {
        let Some(offset) = due_offset(record.deadline, today, record.duration_days, custom)
        else {
            continue;
        };

        let idx = match out.iter().position(|d| d.area == record.area) {
            Some(i) => i,
            None => {
                out.push(AreaDigest::new(record.area.clone()));
                out.len() - 1
            }
        };
        out[idx].buckets.entry(offset).or_default().push(DueService {
            service: record.service.clone(),
            deadline: record.deadline,
        });
    }

    out
}

fn offset_label(offset: i64) -> String {
    match offset {
        -1 => "expired yesterday".to_string(),
        0 => "due today".to_string(),
        1 => "due tomorrow".to_string(),
        n if n > 1 => format!("due in {n} days"),
        n => format!("expired {} days ago", -n),
    }
}

fn offset_marker(offset: i64) -> &'static str {
    match offset {
        n if n < 0 => "⬛",
        0 => "🟥",
        1 => "🟧",
        _ => "🟨",
    }
}

/// Render one area's notification. Deterministic: buckets ascend by
/// offset, services keep row order, result is trimmed.
pub fn render(project_name: &str, digest: &AreaDigest) -> String {
    let mut lines = vec![
        "⏰ Service deadline reminders".to_string(),
        format!("📌 Project: {project_name}"),
        format!("📂 Area: {}", digest.area),
        String::new(),
    ];

    for (offset, services) in &digest.buckets {
        lines.push(format!("{} {}", offset_marker(*offset), offset_label(*offset)));
        for s in services {
            lines.push(format!("• {} — {}", s.service, s.deadline.format("%d/%m/%Y")));
        }
        lines.push(String::new());
    }

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(area: &str, service: &str, duration: u32, deadline: NaiveDate) -> DeadlineRecord {
        DeadlineRecord {
            area: area.to_string(),
            service: service.to_string(),
            duration_days: duration,
            deadline,
        }
    }

    #[test]
    fn groups_by_area_in_first_seen_order() {
        let today = ymd(2030, 10, 9);
        let records = vec![
            record("IT", "Backup", 5, ymd(2030, 10, 10)),      // offset 1
            record("Marketing", "Launch", 2, ymd(2030, 10, 9)), // offset 0
            record("IT", "Restore drill", 2, ymd(2030, 10, 10)), // offset 1
            record("IT", "Faraway", 2, ymd(2030, 12, 1)),       // not due
        ];
        let grouped = group_by_area(&records, today, &BTreeSet::new());

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].area, "IT");
        assert_eq!(grouped[1].area, "Marketing");
        let it_tomorrow = &grouped[0].buckets[&1];
        assert_eq!(it_tomorrow[0].service, "Backup");
        assert_eq!(it_tomorrow[1].service, "Restore drill");
    }

    #[test]
    fn render_orders_offsets_ascending() {
        let today = ymd(2030, 10, 9);
        let records = vec![
            record("IT", "Later", 14, ymd(2030, 10, 16)),  // offset 7 = half
            record("IT", "Yesterday", 3, ymd(2030, 10, 8)), // offset -1
            record("IT", "Now", 3, ymd(2030, 10, 9)),       // offset 0
        ];
        let grouped = group_by_area(&records, today, &BTreeSet::new());
        let msg = render("Torino HQ", &grouped[0]);

        let expired = msg.find("expired yesterday").unwrap();
        let today_pos = msg.find("due today").unwrap();
        let later = msg.find("due in 7 days").unwrap();
        assert!(expired < today_pos && today_pos < later);
        assert!(msg.contains("• Yesterday — 08/10/2030"));
        assert!(msg.contains("📌 Project: Torino HQ"));
    }

    #[test]
    fn render_empty_digest_has_headers_only() {
        let digest = AreaDigest::new("IT");
        let msg = render("P", &digest);
        assert!(msg.contains("📂 Area: IT"));
        assert!(!msg.contains('•'));
        assert_eq!(msg, msg.trim());
    }

    #[test]
    fn labels_match_the_fixed_mapping() {
        assert_eq!(offset_label(-1), "expired yesterday");
        assert_eq!(offset_label(0), "due today");
        assert_eq!(offset_label(1), "due tomorrow");
        assert_eq!(offset_label(4), "due in 4 days");
        assert_eq!(offset_label(-3), "expired 3 days ago");
    }

    #[test]
    fn deadline_formats_zero_padded() {
        let today = ymd(2030, 1, 1);
        let records = vec![record("IT", "Audit", 2, ymd(2030, 1, 2))];
        let grouped = group_by_area(&records, today, &BTreeSet::new());
        let msg = render("P", &grouped[0]);
        assert!(msg.contains("• Audit — 02/01/2030"));
    }
}
