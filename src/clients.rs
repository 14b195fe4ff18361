// ============================================================================
// Client Logo Mapping
// ============================================================================

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Client display name to logo image, read from `clients.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct ClientMap {
    logos: BTreeMap<String, PathBuf>,
}

impl ClientMap {
    /// Loads the mapping, degrading to an empty map when the file is
    /// missing or malformed.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(map) => {
                log::debug!("Loaded {} client logo(s) from {}", map.logos.len(), path.display());
                map
            }
            Err(e) => {
                log::warn!("Client mapping unavailable, continuing without logos: {}", e);
                Self::default()
            }
        }
    }

    /// Relative logo paths are resolved against the mapping file's directory.
    pub fn try_load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::ClientMap(format!("{}: {}", path.display(), e)))?;
        let mut map: ClientMap = serde_json::from_str(&content)
            .map_err(|e| AppError::ClientMap(format!("Invalid JSON in {}: {}", path.display(), e)))?;

        if let Some(base) = path.parent() {
            for logo in map.logos.values_mut() {
                if logo.is_relative() {
                    *logo = base.join(&*logo);
                }
            }
        }
        Ok(map)
    }

    /// Exact name first, then a trimmed case-insensitive match.
    pub fn logo_for(&self, client: &str) -> Option<&Path> {
        if let Some(path) = self.logos.get(client) {
            return Some(path.as_path());
        }
        let wanted = client.trim();
        self.logos
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, path)| path.as_path())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.logos.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.logos.is_empty()
    }
}
