//! Gantt block extraction: turn raw spreadsheet rows into deadline records.
//!
//! The block is read four columns wide (name, spare, duration, deadline).
//! Rows classify as blank spacers, template headers, area titles, or
//! service entries; a malformed row is skipped, never fatal.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::dates::{parse_duration_days, parse_loose_date};

/// Area assigned to services that appear before any area-title row.
pub const DEFAULT_AREA: &str = "General";

/// Template header label sitting above the name column.
pub const AREA_HEADER_LABEL: &str = "area name";

/// Sheet-title label some templates repeat inside the block.
const SHEET_TITLE_LABEL: &str = "gantt";

/// One cell as returned by the Sheets values API with UNFORMATTED_VALUE:
/// evaluated date cells arrive as numbers, typed ones as strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Text(t) => t.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell content as trimmed text; whole numbers print without a decimal
    /// part so "5" and 5.0 parse the same downstream.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Text(t) => t.trim().to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeadlineRecord {
    pub area: String,
    pub service: String,
    pub duration_days: u32,
    pub deadline: NaiveDate,
}

/// Classification of one Gantt row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    /// Pure spacer: name, duration and deadline all blank.
    Blank,
    /// Template header or repeated sheet title.
    Header,
    /// Name present, duration and deadline blank: declares a new area.
    Area(String),
    /// Some of name/duration/deadline missing.
    Incomplete,
    /// A full service entry, raw cells still unparsed.
    Service {
        name: String,
        duration_raw: String,
        deadline_raw: String,
    },
}

/// Classify a row of up to four cells (short rows read as blank-padded).
pub fn classify_row(row: &[Cell]) -> RowKind {
    let cell_text = |idx: usize| row.get(idx).map(Cell::to_text).unwrap_or_default();

    let name = cell_text(0);
    let duration = cell_text(2);
    let deadline = cell_text(3);

    if name.is_empty() && duration.is_empty() && deadline.is_empty() {
        return RowKind::Blank;
    }
    let lowered = name.to_lowercase();
    if lowered == AREA_HEADER_LABEL || lowered == SHEET_TITLE_LABEL {
        return RowKind::Header;
    }
    if !name.is_empty() && duration.is_empty() && deadline.is_empty() {
        return RowKind::Area(name);
    }
    if name.is_empty() || duration.is_empty() || deadline.is_empty() {
        return RowKind::Incomplete;
    }
    RowKind::Service {
        name,
        duration_raw: duration,
        deadline_raw: deadline,
    }
}

/// Walk the block top to bottom, carrying the current area, and emit one
/// record per parseable service row. Year-less deadlines resolve against
/// `reference`. A file with zero valid rows yields an empty vec.
pub fn extract_deadlines(rows: &[Vec<Cell>], reference: NaiveDate) -> Vec<DeadlineRecord> {
    let mut out = Vec::new();
    let mut current_area = DEFAULT_AREA.to_string();

    for (idx, row) in rows.iter().enumerate() {
        match classify_row(row) {
            RowKind::Blank | RowKind::Header => {}
            RowKind::Area(name) => current_area = name,
            RowKind::Incomplete => {
                debug!(row = idx, "skipping incomplete service row");
            }
            RowKind::Service {
                name,
                duration_raw,
                deadline_raw,
            } => match (
                parse_duration_days(&duration_raw),
                parse_loose_date(&deadline_raw, reference),
            ) {
                (Ok(duration_days), Ok(deadline)) => out.push(DeadlineRecord {
                    area: current_area.clone(),
                    service: name,
                    duration_days,
                    deadline,
                }),
                (duration, deadline) => {
                    debug!(
                        row = idx,
                        service = %name,
                        ?duration,
                        ?deadline,
                        "skipping unparseable service row"
                    );
                }
            },
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn area_row_sets_area_without_emitting() {
        let rows = vec![
            row(&["IT", "", "", ""]),
            row(&["Backup", "", "5", "10/10/2030"]),
            row(&["", "", "", ""]),
        ];
        let got = extract_deadlines(&rows, ymd(2030, 1, 1));
        assert_eq!(
            got,
            vec![DeadlineRecord {
                area: "IT".to_string(),
                service: "Backup".to_string(),
                duration_days: 5,
                deadline: ymd(2030, 10, 10),
            }]
        );
    }

    #[test]
    fn services_before_any_area_fall_under_general() {
        let rows = vec![row(&["Kickoff", "", "2", "01/02/2031"])];
        let got = extract_deadlines(&rows, ymd(2031, 1, 1));
        assert_eq!(got[0].area, DEFAULT_AREA);
    }

    #[test]
    fn header_rows_are_skipped_case_insensitively() {
        assert_eq!(classify_row(&row(&["Area Name", "", "", ""])), RowKind::Header);
        assert_eq!(classify_row(&row(&["GANTT", "", "", ""])), RowKind::Header);
    }

    #[test]
    fn short_rows_are_padded() {
        assert_eq!(classify_row(&row(&["Ops"])), RowKind::Area("Ops".to_string()));
        assert_eq!(classify_row(&[]), RowKind::Blank);
    }

    #[test]
    fn incomplete_rows_emit_nothing() {
        let rows = vec![
            row(&["Half-filled", "", "3", ""]),
            row(&["", "", "3", "10/10/2030"]),
        ];
        assert!(extract_deadlines(&rows, ymd(2030, 1, 1)).is_empty());
    }

    #[test]
    fn malformed_row_does_not_abort_the_block() {
        let rows = vec![
            row(&["Broken", "", "many", "someday"]),
            row(&["Fine", "", "4", "10/10/2030"]),
        ];
        let got = extract_deadlines(&rows, ymd(2030, 1, 1));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].service, "Fine");
    }

    #[test]
    fn timestamp_sized_deadline_skips_the_row_only() {
        // A raw epoch-milliseconds number in the deadline column must not
        // take the whole block down.
        let rows = vec![
            vec![
                Cell::from("Pasted timestamp"),
                Cell::from(""),
                Cell::Number(3.0),
                Cell::Number(1.7e12),
            ],
            row(&["Fine", "", "4", "10/10/2030"]),
        ];
        let got = extract_deadlines(&rows, ymd(2030, 1, 1));
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].service, "Fine");
    }

    #[test]
    fn numeric_cells_from_unformatted_reads() {
        // Duration 5.0 and deadline as a day-serial, the way evaluated
        // cells come back from the API.
        let rows = vec![vec![
            Cell::from("Backup"),
            Cell::from(""),
            Cell::Number(5.0),
            Cell::Number(45000.0),
        ]];
        let got = extract_deadlines(&rows, ymd(2020, 1, 1));
        assert_eq!(got[0].duration_days, 5);
        assert_eq!(got[0].deadline, ymd(2023, 3, 15));
    }

    #[test]
    fn cell_deserializes_from_untyped_json() {
        let raw = r#"[["Backup", "", 5, "10/10/2030"]]"#;
        let rows: Vec<Vec<Cell>> = serde_json::from_str(raw).unwrap();
        assert_eq!(rows[0][2], Cell::Number(5.0));
        let got = extract_deadlines(&rows, ymd(2030, 1, 1));
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn empty_block_is_fine() {
        assert!(extract_deadlines(&[], ymd(2030, 1, 1)).is_empty());
    }
}
