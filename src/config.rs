// ⚙️ Configuration - Where the catalog lives and what to default to
//
// Resolution order, later wins:
//   built-in defaults → JSON file (--config) → environment → CLI flags

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::entities::ProfileKey;
use crate::selection::ViewMode;

pub const ENV_CATALOG: &str = "CITY_BUDGET_CATALOG";
pub const ENV_ADDR: &str = "CITY_BUDGET_ADDR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Price catalog file (.csv or .json)
    pub catalog_path: PathBuf,
    pub default_profile: ProfileKey,
    pub default_view_mode: ViewMode,
    /// Bind address for the API server
    pub server_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            catalog_path: PathBuf::from("data/catalog.csv"),
            default_profile: ProfileKey::default(),
            default_view_mode: ViewMode::default(),
            server_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the optional JSON file, then environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => AppConfig::default(),
        };

        Ok(config.with_overrides(
            std::env::var(ENV_CATALOG).ok().as_deref(),
            std::env::var(ENV_ADDR).ok().as_deref(),
        ))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Apply catalog path / bind address overrides. Blank values are ignored.
    pub fn with_overrides(mut self, catalog: Option<&str>, addr: Option<&str>) -> Self {
        if let Some(catalog) = catalog.map(str::trim).filter(|s| !s.is_empty()) {
            self.catalog_path = PathBuf::from(catalog);
        }
        if let Some(addr) = addr.map(str::trim).filter(|s| !s.is_empty()) {
            self.server_addr = addr.to_string();
        }
        self
    }
}
