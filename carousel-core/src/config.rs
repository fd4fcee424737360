use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CarouselError, Result};
use crate::paths::CarouselPaths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub rotation: RotationConfig,
}

impl Config {
    pub fn load(paths: &CarouselPaths) -> Result<Self> {
        let path = paths.config_file();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            CarouselError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(paths: &CarouselPaths) -> Self {
        Self::load(paths).unwrap_or_default()
    }

    pub fn save(&self, paths: &CarouselPaths) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CarouselError::Config(format!("failed to serialize config: {e}")))?;
        let path = paths.config_file();
        std::fs::write(&path, content)
            .map_err(|e| CarouselError::Config(format!("failed to write {}: {e}", path.display())))
    }

    /// Catalog file to load, falling back to the one in the data dir.
    pub fn catalog_path(&self, paths: &CarouselPaths) -> PathBuf {
        self.general
            .catalog
            .clone()
            .unwrap_or_else(|| paths.default_catalog())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub catalog: Option<PathBuf>,
    pub event_capacity: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            event_capacity: 16,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// `"off"` or an interval such as `"30m"`.
    pub interval: String,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            interval: "off".into(),
        }
    }
}
