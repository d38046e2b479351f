//! # Configuration
//!
//! Run settings loaded from an optional TOML file and overridden by CLI flags.
//!
//! ```toml
//! seed = 7
//! definition = "road_network"
//! scale_limit = 5000
//! infeasible_policy = "skip_instance"
//!
//! [log]
//! format = "json"
//! ```
//!
//! Every field is optional. `GROWGRAPH_LOG_FORMAT` takes precedence over
//! `[log] format`.

use growgraph_core::driver::{DEFAULT_MAX_IDLE_ITERATIONS, DEFAULT_MAX_ITERATIONS};
use growgraph_core::{InfeasiblePolicy, SynthError, definitions};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable selecting the log formatter.
pub const LOG_FORMAT_ENV: &str = "GROWGRAPH_LOG_FORMAT";

/// Largest config file accepted (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// LOG SETTINGS
// =============================================================================

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parse a format name; anything but `json` is text.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub format: LogFormat,
}

// =============================================================================
// RUN SETTINGS
// =============================================================================

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrowgraphConfig {
    pub seed: u64,
    pub definition: String,
    pub scale_limit: u64,
    pub max_iterations: u64,
    pub max_idle_iterations: u64,
    pub infeasible_policy: InfeasiblePolicy,
    pub log: LogConfig,
}

impl Default for GrowgraphConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            definition: "social_network".to_string(),
            scale_limit: 1000,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_idle_iterations: DEFAULT_MAX_IDLE_ITERATIONS,
            infeasible_policy: InfeasiblePolicy::default(),
            log: LogConfig::default(),
        }
    }
}

/// Values given on the command line. `None` keeps the file (or default) value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub seed: Option<u64>,
    pub definition: Option<String>,
    pub scale_limit: Option<u64>,
    pub infeasible_policy: Option<InfeasiblePolicy>,
}

impl GrowgraphConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, SynthError> {
        toml::from_str(content)
            .map_err(|e| SynthError::SerializationError(format!("Invalid config: {}", e)))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self, SynthError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            SynthError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(SynthError::SerializationError(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            SynthError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// The file at `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SynthError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line values on top of this configuration.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(seed) = overrides.seed {
            self.seed = seed;
        }
        if let Some(definition) = overrides.definition {
            self.definition = definition;
        }
        if let Some(scale_limit) = overrides.scale_limit {
            self.scale_limit = scale_limit;
        }
        if let Some(policy) = overrides.infeasible_policy {
            self.infeasible_policy = policy;
        }
    }

    /// Check the merged configuration before running.
    pub fn validate(&self) -> Result<(), SynthError> {
        if !definitions::is_known(&self.definition) {
            return Err(SynthError::UnknownDefinition(self.definition.clone()));
        }
        if self.scale_limit == 0 {
            return Err(SynthError::InvalidStrategy(
                "scale_limit must be greater than 0".to_string(),
            ));
        }
        if self.max_iterations == 0 || self.max_idle_iterations == 0 {
            return Err(SynthError::InvalidStrategy(
                "iteration bounds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective log format: the environment wins over the file.
    #[must_use]
    pub fn log_format(&self, env_value: Option<&str>) -> LogFormat {
        env_value.map_or(self.log.format, LogFormat::from_name)
    }
}

// =============================================================================
// TESTS
// =============================================================================
