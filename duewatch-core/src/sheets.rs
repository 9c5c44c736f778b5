//! Spreadsheet locator resolution: people paste whole Sheets URLs into the
//! roster, or just the key.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a spreadsheet link or key: {0}")]
pub struct LocatorError(pub String);

fn bare_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{20,}$").unwrap())
}

fn url_res() -> &'static [Regex; 3] {
    static RES: OnceLock<[Regex; 3]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").unwrap(),
            Regex::new(r"[?&]id=([A-Za-z0-9_-]+)").unwrap(),
            // Generic fallback for shortened /d/ links.
            Regex::new(r"/d/([A-Za-z0-9_-]+)").unwrap(),
        ]
    })
}

/// Pull the spreadsheet key out of a full URL, an `?id=` link, or accept a
/// bare key (20+ alphanumeric/`-`/`_` characters) verbatim.
pub fn extract_spreadsheet_key(input: &str) -> Result<String, LocatorError> {
    let input = input.trim();

    if bare_key_re().is_match(input) {
        return Ok(input.to_string());
    }
    for re in url_res() {
        if let Some(caps) = re.captures(input) {
            return Ok(caps[1].to_string());
        }
    }
    Err(LocatorError(input.to_string()))
}
