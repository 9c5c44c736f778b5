//! Persistent chat → area → topic routing map.
//!
//! Backed by one JSON file, read fully on every operation and replaced
//! atomically (tmp file + rename) on every write. Last writer wins; the
//! atomic replace only guards against torn files, not lost updates.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// chat id (stringified) -> area name -> topic id.
pub type RegistryMap = BTreeMap<String, BTreeMap<String, i64>>;

#[derive(Debug, Clone)]
pub struct TopicRegistry {
    path: PathBuf,
}

fn norm_area(area: &str) -> &str {
    area.trim()
}

impl TopicRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full map. Missing or unreadable state degrades to an
    /// empty map; a corrupt registry must never take the bot down.
    pub fn load(&self) -> RegistryMap {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => RegistryMap::default(),
        }
    }

    fn save(&self, map: &RegistryMap) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(map).map_err(io::Error::other)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)
    }

    /// Map (chat, area) to a topic id, overwriting any previous mapping.
    /// A blank area is a no-op.
    pub fn set(&self, chat_id: i64, area: &str, topic_id: i64) -> io::Result<()> {
        let area = norm_area(area);
        if area.is_empty() {
            return Ok(());
        }
        let mut map = self.load();
        map.entry(chat_id.to_string())
            .or_default()
            .insert(area.to_string(), topic_id);
        self.save(&map)
    }

    pub fn get(&self, chat_id: i64, area: &str) -> Option<i64> {
        let area = norm_area(area);
        if area.is_empty() {
            return None;
        }
        self.load()
            .get(&chat_id.to_string())
            .and_then(|areas| areas.get(area))
            .copied()
    }

    /// All areas mapped for one chat, for operator listing.
    pub fn areas(&self, chat_id: i64) -> BTreeMap<String, i64> {
        self.load().remove(&chat_id.to_string()).unwrap_or_default()
    }

    /// Re-key the area currently holding `topic_id` to `new_area`.
    ///
    /// The first area in map order holding the id is taken; if several
    /// areas share an id only one is renamed, which one is unspecified.
    /// Returns true when the mapping is (already) in place, false when the
    /// chat or id is unknown or the new name is blank.
    pub fn rename(&self, chat_id: i64, topic_id: i64, new_area: &str) -> io::Result<bool> {
        let new_area = norm_area(new_area);
        if new_area.is_empty() {
            return Ok(false);
        }

        let mut map = self.load();
        let Some(areas) = map.get_mut(&chat_id.to_string()) else {
            return Ok(false);
        };

        let Some(old_area) = areas
            .iter()
            .find(|(_, id)| **id == topic_id)
            .map(|(area, _)| area.clone())
        else {
            return Ok(false);
        };

        if old_area == new_area {
            return Ok(true);
        }

        areas.remove(&old_area);
        areas.insert(new_area.to_string(), topic_id);
        self.save(&map)?;
        Ok(true)
    }
}
