//! Project roster schema: one validated entry per configuration row.
//!
//! The roster sheet carries four columns per project: display name,
//! Telegram chat id, free-text custom warning offsets, Gantt link or key.
//! Validation happens once here, at the boundary.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::gantt::Cell;
use crate::sheets::{LocatorError, extract_spreadsheet_key};
use crate::thresholds::parse_custom_offsets;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("roster row {row}: missing {field}")]
    MissingField { row: usize, field: &'static str },
    #[error("roster row {row}: chat id is not an integer: {value}")]
    BadChatId { row: usize, value: String },
    #[error("roster row {row}: {source}")]
    BadLocator {
        row: usize,
        #[source]
        source: LocatorError,
    },
}

impl RosterError {
    /// Roster row this entry came from, for operator diagnostics.
    pub fn row(&self) -> usize {
        match self {
            RosterError::MissingField { row, .. }
            | RosterError::BadChatId { row, .. }
            | RosterError::BadLocator { row, .. } => *row,
        }
    }
}

/// One tracked project, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectEntry {
    /// Roster sheet row this entry came from, as the caller labels it.
    pub row: usize,
    pub name: String,
    pub chat_id: i64,
    pub custom_offsets: BTreeSet<i64>,
    pub spreadsheet_key: String,
}

impl ProjectEntry {
    /// Build an entry from one roster row. Fully-blank rows are Ok(None);
    /// anything partially filled must validate.
    pub fn from_row(row: usize, cells: &[Cell]) -> Result<Option<ProjectEntry>, RosterError> {
        let text = |idx: usize| cells.get(idx).map(Cell::to_text).unwrap_or_default();

        let name = text(0);
        let chat_raw = text(1);
        let offsets_raw = text(2);
        let locator = text(3);

        if name.is_empty() && chat_raw.is_empty() && offsets_raw.is_empty() && locator.is_empty() {
            return Ok(None);
        }

        if name.is_empty() {
            return Err(RosterError::MissingField { row, field: "project name" });
        }
        if chat_raw.is_empty() {
            return Err(RosterError::MissingField { row, field: "chat id" });
        }
        if locator.is_empty() {
            return Err(RosterError::MissingField { row, field: "gantt link" });
        }

        let chat_id = chat_raw
            .parse::<i64>()
            .map_err(|_| RosterError::BadChatId {
                row,
                value: chat_raw.clone(),
            })?;
        let spreadsheet_key = extract_spreadsheet_key(&locator)
            .map_err(|source| RosterError::BadLocator { row, source })?;

        Ok(Some(ProjectEntry {
            row,
            name,
            chat_id,
            custom_offsets: parse_custom_offsets(&offsets_raw),
            spreadsheet_key,
        }))
    }
}
