//! Application configuration.
//!
//! Everything is optional in the file; missing keys take their defaults.
//!
//! ```toml
//! seed = 42
//! backend = "gpu"
//! log_filter = "info,terravox_rendering=debug"
//!
//! [world]
//! world_size = 40
//! allocation = { mode = "smart", safety_factor = 12 }
//! ```

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::Deserialize;
use terravox_rendering::{MeshError, WorldConfig};
use thiserror::Error;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Filter used when none is configured.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but are out of range.
    #[error("invalid world configuration: {0}")]
    Invalid(#[from] MeshError),
}

/// Meshing backend selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Reference mesher on the calling thread.
    #[default]
    Cpu,
    /// Compute kernel on a headless device.
    Gpu,
}

/// Top level configuration for the baker.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// World seed.
    pub seed: u64,
    /// `tracing` filter directives. `RUST_LOG` is appended at startup.
    pub log_filter: String,
    /// Which mesher to run.
    pub backend: Backend,
    /// Viewer position in chunk-grid space. Defaults to the grid centre.
    pub viewer: Option<[f32; 3]>,
    /// World shape and tuning.
    pub world: WorldConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            backend: Backend::default(),
            viewer: None,
            world: WorldConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
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
    /// Returns an error if the text cannot be parsed or validated.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unusable world shape.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        Ok(())
    }

    /// Where the world is generated from.
    #[must_use]
    pub fn viewer_position(&self) -> Vec3 {
        match self.viewer {
            Some(position) => Vec3::from_array(position),
            None => {
                let half = (self.world.world_size / 2 * terravox_procedural::CHUNK_SIZE) as f32;
                Vec3::new(half, 0.0, half)
            }
        }
    }
}
