use super::Result;
use crate::error::{ConfigError, StorageError};
use crate::utils::validation::{parse_bool, parse_command, parse_limit};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Keys accepted by [`Config::set`]
pub const CONFIG_KEYS: &[&str] = &[
    "flatten.max_depth",
    "opener.command",
    "display.use_colors",
    "display.max_width",
];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub flatten: FlattenSettings,
    #[serde(default)]
    pub opener: OpenerSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FlattenSettings {
    /// Maximum number of containers open at once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct OpenerSettings {
    /// Program and arguments used instead of the platform default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    #[serde(default = "default_use_colors")]
    pub use_colors: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<usize>,
}

fn default_use_colors() -> bool {
    true
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            use_colors: default_use_colors(),
            max_width: None,
        }
    }
}

impl Config {
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
            message: format!("{}: {}", config_path.to_string_lossy(), e),
        })
    }

    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let toml_content = self.to_toml()?;

        fs::write(&config_path, toml_content).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| StorageError::ConfigSaveFailed {
            message: e.to_string(),
        })
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(StorageError::ConfigDirNotFound)?;
        Ok(config_dir.join("nxmisc").join("config.toml"))
    }

    /// Set a single dotted key from its text form
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), ConfigError> {
        match key {
            "flatten.max_depth" => self.flatten.max_depth = parse_limit(key, value)?,
            "opener.command" => self.opener.command = parse_command(key, value)?,
            "display.use_colors" => self.display.use_colors = parse_bool(key, value)?,
            "display.max_width" => self.display.max_width = parse_limit(key, value)?,
            _ => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Current value of a dotted key, rendered as text
    pub fn get(&self, key: &str) -> Option<String> {
        fn or_none<T: ToString>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "none".to_string())
        }

        match key {
            "flatten.max_depth" => Some(or_none(&self.flatten.max_depth)),
            "opener.command" => Some(
                self.opener
                    .command
                    .as_ref()
                    .map(|command| command.join(" "))
                    .unwrap_or_else(|| "default".to_string()),
            ),
            "display.use_colors" => Some(self.display.use_colors.to_string()),
            "display.max_width" => Some(or_none(&self.display.max_width)),
            _ => None,
        }
    }
}
