use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub fn duewatch_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".duewatch"))
}

pub fn ensure_duewatch_home() -> Result<PathBuf> {
    let dir = duewatch_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Telegram bot token (required to send anything).
    #[serde(default)]
    pub bot_token: String,
    /// Chat that receives operator diagnostics.
    #[serde(default)]
    pub error_chat_id: i64,

    /// Google Sheets API key.
    #[serde(default)]
    pub sheets_api_key: String,
    /// Spreadsheet holding the project roster.
    #[serde(default)]
    pub roster_spreadsheet_id: String,
    #[serde(default = "default_roster_range")]
    pub roster_range: String,

    /// Gantt worksheet title inside each project spreadsheet.
    #[serde(default = "default_worksheet")]
    pub worksheet: String,
    /// First data row of the Gantt block (B..E columns).
    #[serde(default = "default_start_row")]
    pub start_row: u32,
    #[serde(default = "default_max_rows")]
    pub max_rows: u32,
    /// Cell holding the project start date.
    #[serde(default = "default_start_date_cell")]
    pub start_date_cell: String,

    /// Daily send time, HH:MM in `timezone`.
    #[serde(default = "default_message_time")]
    pub message_time: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_roster_range() -> String {
    "Config!A2:D".to_string()
}

fn default_worksheet() -> String {
    "GANTT".to_string()
}

fn default_start_row() -> u32 {
    9
}

fn default_max_rows() -> u32 {
    1200
}

fn default_start_date_cell() -> String {
    "F9".to_string()
}

fn default_message_time() -> String {
    "08:30".to_string()
}

fn default_timezone() -> String {
    "Europe/Rome".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            error_chat_id: 0,
            sheets_api_key: String::new(),
            roster_spreadsheet_id: String::new(),
            roster_range: default_roster_range(),
            worksheet: default_worksheet(),
            start_row: default_start_row(),
            max_rows: default_max_rows(),
            start_date_cell: default_start_date_cell(),
            message_time: default_message_time(),
            timezone: default_timezone(),
        }
    }
}

impl Config {
    /// Range covering the Gantt block, columns B..E.
    pub fn gantt_range(&self) -> String {
        let end_row = self.start_row + self.max_rows - 1;
        format!("{}!B{}:E{}", self.worksheet, self.start_row, end_row)
    }

    /// Sheet row the roster range starts at, so diagnostics can point the
    /// operator at the actual spreadsheet row. Defaults to 2 when the
    /// range carries no row number.
    pub fn roster_first_row(&self) -> usize {
        let range = self
            .roster_range
            .rsplit('!')
            .next()
            .unwrap_or(&self.roster_range);
        let start_cell = range.split(':').next().unwrap_or(range);
        let digits: String = start_cell.chars().filter(char::is_ascii_digit).collect();
        digits.parse().unwrap_or(2)
    }

    /// Bail early when a secret needed for a live run is missing.
    pub fn require_credentials(&self) -> Result<()> {
        if self.bot_token.is_empty() {
            bail!("bot_token missing; edit {}", config_path()?.display());
        }
        if self.sheets_api_key.is_empty() {
            bail!("sheets_api_key missing; edit {}", config_path()?.display());
        }
        if self.roster_spreadsheet_id.is_empty() {
            bail!("roster_spreadsheet_id missing; edit {}", config_path()?.display());
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(duewatch_home()?.join("config.toml"))
}

pub fn registry_path() -> Result<PathBuf> {
    Ok(ensure_duewatch_home()?.join("topic_map.json"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    ensure_duewatch_home()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    println!("Fill in bot_token, sheets_api_key and roster_spreadsheet_id.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gantt_range_spans_configured_rows() {
        let cfg = Config::default();
        assert_eq!(cfg.gantt_range(), "GANTT!B9:E1208");
    }

    #[test]
    fn roster_first_row_comes_from_the_range() {
        let mut cfg = Config::default();
        assert_eq!(cfg.roster_first_row(), 2);
        cfg.roster_range = "Projects!A5:D40".to_string();
        assert_eq!(cfg.roster_first_row(), 5);
        // Whole-column range: no row number to go by.
        cfg.roster_range = "Config!A:D".to_string();
        assert_eq!(cfg.roster_first_row(), 2);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str("bot_token = \"t\"\nerror_chat_id = -5\n").unwrap();
        assert_eq!(cfg.bot_token, "t");
        assert_eq!(cfg.error_chat_id, -5);
        assert_eq!(cfg.roster_range, "Config!A2:D");
        assert_eq!(cfg.message_time, "08:30");
    }
}
