//! # Kernel Configuration
//!
//! Loaded once at startup from TOML. Every section and field has a default,
//! so an empty file (or no file at all) yields a runnable kernel:
//!
//! ```toml
//! [world]
//! capacity = 4096
//!
//! [spatial]
//! margin = 4.0
//! displacement_multiplier = 2.0
//!
//! [navigation]
//! cell_size = 32.0
//! width = 64
//! height = 64
//!
//! [game_loop]
//! tick_rate = 60
//! max_substeps = 8
//! event_capacity = 1024
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tessera_shared::{DEFAULT_ENTITY_CAPACITY, MAX_SUBSTEPS, NAV_CELL_SIZE, TICK_RATE};
use tessera_spatial::TreeConfig;
use thiserror::Error;

/// Errors raised while loading or checking a [`KernelConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// World sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Entity slots reserved up front.
    pub capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_ENTITY_CAPACITY,
        }
    }
}

/// Navigation grid layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Edge length of one cell in world units.
    pub cell_size: f32,
    /// Initial grid width in cells. The grid starts fully open.
    pub width: u32,
    /// Initial grid height in cells.
    pub height: u32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            cell_size: NAV_CELL_SIZE,
            width: 64,
            height: 64,
        }
    }
}

/// Fixed-timestep driver settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameLoopConfig {
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Most ticks one [`step`](crate::GameLoop::step) may run to catch up.
    pub max_substeps: u32,
    /// Capacity of the outbound world event channel.
    pub event_capacity: usize,
}

impl Default for GameLoopConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            max_substeps: MAX_SUBSTEPS,
            event_capacity: 1024,
        }
    }
}

/// Complete kernel configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// World sizing.
    pub world: WorldConfig,
    /// AABB tree tuning.
    pub spatial: TreeConfig,
    /// Navigation grid layout.
    pub navigation: NavigationConfig,
    /// Driver timing.
    pub game_loop: GameLoopConfig,
}

impl KernelConfig {
    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed input, [`ConfigError::Invalid`]
    /// if a value is out of range.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        fn positive(field: &'static str, value: f32) -> ConfigResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive finite number, got {value}"),
                })
            }
        }

        positive("spatial.margin", self.spatial.margin)?;
        positive(
            "spatial.displacement_multiplier",
            self.spatial.displacement_multiplier,
        )?;
        positive("navigation.cell_size", self.navigation.cell_size)?;

        if self.game_loop.tick_rate == 0 {
            return Err(ConfigError::Invalid {
                field: "game_loop.tick_rate",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.game_loop.max_substeps == 0 {
            return Err(ConfigError::Invalid {
                field: "game_loop.max_substeps",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.game_loop.event_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "game_loop.event_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Length of one simulation tick in seconds.
    #[must_use]
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.game_loop.tick_rate.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_all_defaults() {
        let config = KernelConfig::from_toml_str("").unwrap();
        assert_eq!(config, KernelConfig::default());
        assert_eq!(config.game_loop.tick_rate, TICK_RATE);
        assert_eq!(config.spatial, TreeConfig::default());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = KernelConfig::from_toml_str(
            r#"
            [navigation]
            cell_size = 16.0

            [game_loop]
            tick_rate = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.navigation.cell_size, 16.0);
        assert_eq!(config.navigation.width, 64);
        assert_eq!(config.game_loop.tick_rate, 30);
        assert_eq!(config.game_loop.max_substeps, MAX_SUBSTEPS);
        assert!((config.tick_seconds() - 1.0 / 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let err = KernelConfig::from_toml_str("[spatial]\nmargin = 0.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "spatial.margin",
                ..
            }
        ));

        let err = KernelConfig::from_toml_str("[game_loop]\ntick_rate = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "game_loop.tick_rate",
                ..
            }
        ));

        let err = KernelConfig::from_toml_str("[navigation]\ncell_size = -2.0").unwrap_err();
        assert!(err.to_string().contains("navigation.cell_size"));
    }

    #[test]
    fn test_malformed_text_is_parse_error() {
        let err = KernelConfig::from_toml_str("[world]\ncapacity = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = KernelConfig::load("/definitely/not/here/tessera.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
