//! Engine configuration
//!
//! Serde-backed configuration with TOML and RON loading. Every field has a
//! default, so partial config files work; an empty string is a valid
//! config.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graphics::SceneOptions;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Enable the debug logging sink
    pub debug: bool,

    /// Window parameters handed to the graphics backend by the host
    pub window: WindowConfig,

    /// Defaults for newly created render scenes
    pub scene: SceneConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debug: false,
            window: WindowConfig::default(),
            scene: SceneConfig::default(),
        }
    }
}

/// Window configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,

    /// Window width in pixels
    pub width: u32,

    /// Window height in pixels
    pub height: u32,

    /// Whether the window is resizable
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Halberd Application".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
        }
    }
}

/// Defaults applied to newly created render scenes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Vertical field of view in degrees
    pub fov: f32,

    /// Whether scene viewports follow window resizes
    pub resizable: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fov: 60.0,
            resizable: true,
        }
    }
}

impl From<SceneConfig> for SceneOptions {
    fn from(config: SceneConfig) -> Self {
        Self {
            fov: config.fov,
            resizable: config.resizable,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Parse a configuration from RON source.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    /// Load a configuration file, picking the format by extension
    /// (`.ron` is RON, anything else is treated as TOML).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("ron") => Self::from_ron_str(&source),
            _ => Self::from_toml_str(&source),
        }
    }

    /// Serialize the configuration as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse failure
    #[error("invalid TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialize failure
    #[error("config serialization failed: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// RON parse failure
    #[error("invalid RON config: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = EngineConfig::default();
        assert!(!config.debug);
        assert_relative_eq!(config.scene.fov, 60.0);
        assert!(config.scene.resizable);
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn empty_toml_yields_the_default_config() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = EngineConfig::from_toml_str(
            r#"
            debug = true

            [scene]
            fov = 75.0
            "#,
        )
        .unwrap();

        assert!(config.debug);
        assert_relative_eq!(config.scene.fov, 75.0);
        assert!(config.scene.resizable);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn toml_round_trip_preserves_the_config() {
        let mut config = EngineConfig::default();
        config.debug = true;
        config.window.title = "round trip".to_string();
        config.scene.fov = 45.0;

        let serialized = config.to_toml_string().unwrap();
        let parsed = EngineConfig::from_toml_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn ron_source_parses() {
        let config = EngineConfig::from_ron_str(
            "(debug: true, scene: (fov: 90.0, resizable: false))",
        )
        .unwrap();

        assert!(config.debug);
        assert_relative_eq!(config.scene.fov, 90.0);
        assert!(!config.scene.resizable);
    }

    #[test]
    fn scene_config_converts_to_scene_options() {
        let options: SceneOptions = SceneConfig {
            fov: 72.0,
            resizable: false,
        }
        .into();
        assert_relative_eq!(options.fov, 72.0);
        assert!(!options.resizable);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let result = EngineConfig::from_toml_str("debug = ");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }
}
