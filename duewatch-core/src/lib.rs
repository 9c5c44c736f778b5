//! duewatch-core: deadline extraction, warning thresholds, notification
//! rendering, and topic routing for the duewatch reminder bot.

pub mod config;
pub mod dates;
pub mod digest;
pub mod gantt;
pub mod registry;
pub mod sheets;
pub mod thresholds;

pub use config::{ProjectEntry, RosterError};
pub use dates::{DateError, parse_duration_days, parse_loose_date, serial_to_date};
pub use digest::{AreaDigest, DueService, group_by_area, render};
pub use gantt::{AREA_HEADER_LABEL, Cell, DEFAULT_AREA, DeadlineRecord, RowKind, classify_row, extract_deadlines};
pub use registry::{RegistryMap, TopicRegistry};
pub use sheets::{LocatorError, extract_spreadsheet_key};
pub use thresholds::{due_offset, parse_custom_offsets, thresholds};
