use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ExtractError;

/// User-configurable switches for extraction.
///
/// Stored as JSON; fields missing from the file keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Strip fully transparent borders before encoding.
    pub trimming_enabled: bool,
    /// Zero the color of fully transparent pixels.
    pub blackening_enabled: bool,
    /// Process blobs that contain an animation index.
    pub animations_enabled: bool,
    /// Name animated outputs `MONS_<id>_<frame>.PNG`.
    pub rename_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            trimming_enabled: true,
            blackening_enabled: true,
            animations_enabled: false,
            rename_enabled: false,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ExtractError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    #[cfg(test)]
    fn save(&self, path: &Path) -> Result<(), ExtractError> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }
}
