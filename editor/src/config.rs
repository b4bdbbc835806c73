use std::io;
use std::path::{Path, PathBuf};

use scenedit_core::abstract_editor::DEFAULT_MAX_UNDO;
use scenedit_ecs::ClonePolicy;
use serde::Deserialize;

/// Editor configuration loaded from `editor.toml`.
///
/// ```toml
/// [history]
/// max_undo = 100
///
/// [properties]
/// clone_policy = "skip_invisible"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub properties: PropertiesConfig,
}

/// Undo history settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undo steps kept before the oldest is evicted.
    pub max_undo: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
        }
    }
}

/// Properties panel settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PropertiesConfig {
    /// Which components property edits snapshot.
    pub clone_policy: ClonePolicy,
}

impl Default for PropertiesConfig {
    fn default() -> Self {
        Self {
            clone_policy: ClonePolicy::SkipInvisible,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl EditorConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Load the editor config from a TOML file.
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    EditorConfig::from_toml(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the editor config, falling back to defaults if the file is missing
/// or broken.
pub fn load_or_default(path: &Path) -> EditorConfig {
    match load_config(path) {
        Ok(config) => {
            log::info!(
                "Loaded editor config from {} (max_undo = {}, clone_policy = {:?})",
                path.display(),
                config.history.max_undo,
                config.properties.clone_policy
            );
            config
        }
        Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            log::info!("No editor config at {}, using defaults", path.display());
            EditorConfig::default()
        }
        Err(e) => {
            log::error!("{e}; using defaults");
            EditorConfig::default()
        }
    }
}
