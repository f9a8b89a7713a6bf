use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{NoteError, Result};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_FILE_EXT: &str = ".md";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(NoteError::validation(format!(
                "Unknown theme '{}' (expected light or dark)",
                other
            ))),
        }
    }
}

/// Configuration for notekeeper, stored in `config.json` in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotekeeperConfig {
    #[serde(default)]
    pub theme: Theme,

    /// Extension of note content files (e.g. ".md", ".txt")
    #[serde(default = "default_file_ext")]
    pub file_ext: String,
}

fn default_file_ext() -> String {
    DEFAULT_FILE_EXT.to_string()
}

impl Default for NotekeeperConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            file_ext: default_file_ext(),
        }
    }
}

impl NotekeeperConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(NoteError::Io)?;
        let config: NotekeeperConfig =
            serde_json::from_str(&content).map_err(NoteError::Serialization)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(NoteError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(NoteError::Serialization)?;
        fs::write(config_path, content).map_err(NoteError::Io)?;
        Ok(())
    }

    /// Set the file extension (normalizes to start with a dot)
    pub fn set_file_ext(&mut self, ext: &str) {
        if ext.starts_with('.') {
            self.file_ext = ext.to_string();
        } else {
            self.file_ext = format!(".{}", ext);
        }
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "theme" => Ok(self.theme.to_string()),
            "file-ext" | "file_ext" => Ok(self.file_ext.clone()),
            other => Err(unknown_key(other)),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "theme" => self.theme = value.parse()?,
            "file-ext" | "file_ext" => {
                if value.trim_start_matches('.').is_empty() {
                    return Err(NoteError::validation("File extension cannot be empty"));
                }
                self.set_file_ext(value)
            }
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> NoteError {
    NoteError::validation(format!(
        "Unknown config key '{}' (expected theme or file-ext)",
        key
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = NotekeeperConfig::default();
        assert_eq!(config.file_ext, ".md");
        assert_eq!(config.theme, Theme::Light);
    }

    #[test]
    fn test_set_file_ext_without_dot() {
        let mut config = NotekeeperConfig::default();
        config.set_file_ext("txt");
        assert_eq!(config.file_ext, ".txt");
        config.set_file_ext(".md");
        assert_eq!(config.file_ext, ".md");
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = NotekeeperConfig::load(dir.path()).unwrap();
        assert_eq!(config, NotekeeperConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut config = NotekeeperConfig::default();
        config.set("theme", "Dark").unwrap();
        config.set("file-ext", "txt").unwrap();
        config.save(dir.path().join("nested")).unwrap();

        let loaded = NotekeeperConfig::load(dir.path().join("nested")).unwrap();
        assert_eq!(loaded.theme, Theme::Dark);
        assert_eq!(loaded.get("file-ext").unwrap(), ".txt");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: NotekeeperConfig = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.file_ext, ".md");
    }

    #[test]
    fn test_rejects_unknown_keys_and_values() {
        let mut config = NotekeeperConfig::default();
        assert!(config.set("colour", "red").is_err());
        assert!(config.set("theme", "solarized").is_err());
        assert!(config.set("file-ext", ".").is_err());
        assert!(config.get("nope").is_err());
        assert_eq!(config, NotekeeperConfig::default());
    }
}
