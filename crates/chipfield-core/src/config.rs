use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Root file configuration, loaded from `~/.config/chipfield/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipfieldConfig {
    pub widget: WidgetSettings,
    pub lookup: LookupSettings,
    pub ui: UiSettings,
}

/// Where suggestions come from and how chips and the input are tagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    pub url_lookup: Vec<String>,
    pub found_class: String,
    pub input_class: String,
}

/// Options forwarded to the autocomplete lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupSettings {
    /// Minimum number of typed characters before a lookup runs.
    pub min_chars: usize,
    /// Maximum number of suggestions shown.
    pub max_items: usize,
    pub match_case: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub title: String,
    pub tick_rate_ms: u64,
    pub show_help: bool,
}

// ─── Defaults ──────────────────────────────────────────────

pub const DEFAULT_FOUND_CLASS: &str = ".acfb-data";
pub const DEFAULT_INPUT_CLASS: &str = ".acfb-input";

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            url_lookup: vec![String::new()],
            found_class: DEFAULT_FOUND_CLASS.to_string(),
            input_class: DEFAULT_INPUT_CLASS.to_string(),
        }
    }
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            min_chars: 1,
            max_items: 10,
            match_case: false,
        }
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            title: "Pick tags".to_string(),
            tick_rate_ms: 250,
            show_help: true,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl ChipfieldConfig {
    /// Standard config file path: `~/.config/chipfield/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("CHIPFIELD_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("chipfield")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let cfg = ChipfieldConfig::default();
        assert_eq!(cfg.widget.found_class, ".acfb-data");
        assert_eq!(cfg.widget.input_class, ".acfb-input");
        assert_eq!(cfg.widget.url_lookup, vec![String::new()]);
        assert_eq!(cfg.lookup.min_chars, 1);
        assert_eq!(cfg.lookup.max_items, 10);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = ChipfieldConfig::default();
        cfg.widget.url_lookup = vec!["people.json".to_string()];
        cfg.lookup.max_items = 3;
        cfg.save_to(&path).unwrap();

        let loaded = ChipfieldConfig::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[lookup]\nmin_chars = 2\n").unwrap();

        let cfg = ChipfieldConfig::load_from(&path).unwrap();
        assert_eq!(cfg.lookup.min_chars, 2);
        assert_eq!(cfg.lookup.max_items, 10);
        assert_eq!(cfg.widget.found_class, ".acfb-data");
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let cfg = ChipfieldConfig::load_from(Path::new("/tmp/nonexistent_chipfield_config.toml"))
            .unwrap();
        assert_eq!(cfg, ChipfieldConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[lookup\nmin_chars = ").unwrap();
        assert!(ChipfieldConfig::load_from(&path).is_err());
    }
}
