//! Configuration for the dice front end: caller-side clamping policy,
//! engine capacity and rendering.

use crate::core::MAX_QUBITS;
use crate::render::DEFAULT_MAX_COLUMNS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "qdice.toml";

/// Failures while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value '{value}' for {var}")]
    Env { var: String, value: String },

    #[error("Invalid limits: {message}")]
    Limits { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// qdice configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiceConfig {
    #[serde(default)]
    pub limits: Limits,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

/// Ranges the front end clamps requests into before calling the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default = "default_min_outcomes")]
    pub min_outcomes: usize,

    #[serde(default = "default_max_outcomes")]
    pub max_outcomes: usize,

    #[serde(default = "default_min_shots")]
    pub min_shots: usize,

    #[serde(default = "default_max_shots")]
    pub max_shots: usize,

    #[serde(default = "default_shots")]
    pub default_shots: usize,
}

/// Execution engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Widest register the simulator accepts
    #[serde(default = "default_max_qubits")]
    pub max_qubits: usize,

    /// Fixed RNG seed; drawn from the OS when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Text diagrams wider than this fall back to HTML
    #[serde(default = "default_max_columns")]
    pub max_columns: usize,
}

// Defaults
fn default_min_outcomes() -> usize {
    2
}

fn default_max_outcomes() -> usize {
    20
}

fn default_min_shots() -> usize {
    1
}

fn default_max_shots() -> usize {
    10_000
}

fn default_shots() -> usize {
    1000
}

fn default_max_qubits() -> usize {
    MAX_QUBITS
}

fn default_max_columns() -> usize {
    DEFAULT_MAX_COLUMNS
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_outcomes: default_min_outcomes(),
            max_outcomes: default_max_outcomes(),
            min_shots: default_min_shots(),
            max_shots: default_max_shots(),
            default_shots: default_shots(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_qubits: default_max_qubits(),
            seed: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_columns: default_max_columns(),
        }
    }
}

impl Limits {
    pub fn clamp_outcomes(&self, n: usize) -> usize {
        n.clamp(self.min_outcomes, self.max_outcomes)
    }

    /// Clamps `shots`, using `default_shots` when absent.
    pub fn clamp_shots(&self, shots: Option<usize>) -> usize {
        shots
            .unwrap_or(self.default_shots)
            .clamp(self.min_shots, self.max_shots)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.min_outcomes == 0 || self.min_outcomes > self.max_outcomes {
            return Err(ConfigError::Limits {
                message: format!(
                    "outcome range [{}, {}] is empty or starts at 0",
                    self.min_outcomes, self.max_outcomes
                ),
            });
        }
        if self.min_shots > self.max_shots {
            return Err(ConfigError::Limits {
                message: format!("shot range [{}, {}] is empty", self.min_shots, self.max_shots),
            });
        }
        Ok(())
    }
}

impl DiceConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DiceConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.limits.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: env vars > config file > defaults.
    ///
    /// An explicit path must exist. Without one, `qdice.toml` in the working
    /// directory is used if present.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_vars()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_vars(&mut self) -> ConfigResult<()> {
        if let Ok(value) = std::env::var("QDICE_MAX_QUBITS") {
            self.engine.max_qubits = parse_env("QDICE_MAX_QUBITS", &value)?;
        }
        if let Ok(value) = std::env::var("QDICE_SEED") {
            self.engine.seed = Some(parse_env("QDICE_SEED", &value)?);
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var: var.to_string(),
        value: value.to_string(),
    })
}
