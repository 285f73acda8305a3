//! Mining configuration loading and resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::property::{BhaCore, CoreProperty, StarSat};
use crate::types::{MinerError, MinerResult};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "STREAM_MINER_CONFIG";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG: &str = ".stream-miner/config.json";

/// Which density closure to mine with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoreConfig {
    StarSat { threshold: usize },
    BhaCore { hubs: usize, authorities: usize },
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig::StarSat { threshold: 2 }
    }
}

impl CoreConfig {
    /// Instantiate the configured closure.
    pub fn build(&self) -> MinerResult<Box<dyn CoreProperty>> {
        let core: Box<dyn CoreProperty> = match *self {
            CoreConfig::StarSat { threshold } => Box::new(StarSat::new(threshold)?),
            CoreConfig::BhaCore { hubs, authorities } => Box::new(BhaCore::new(hubs, authorities)?),
        };
        Ok(core)
    }
}

/// Parameters of one mining run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// Minimum number of entities in a pattern's support.
    pub min_support: usize,
    /// Deepest extension level explored below the root pattern.
    pub max_depth: Option<usize>,
    /// Stop once this many patterns have been emitted.
    pub max_patterns: Option<usize>,
    pub core: CoreConfig,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            min_support: 2,
            max_depth: None,
            max_patterns: None,
            core: CoreConfig::default(),
        }
    }
}

impl MinerConfig {
    pub fn with_min_support(min_support: usize) -> Self {
        Self {
            min_support,
            ..Self::default()
        }
    }

    /// Check the search parameters only, leaving `core` alone.
    pub fn validate_search(&self) -> MinerResult<()> {
        if self.min_support == 0 {
            return Err(MinerError::Config("min_support must be at least 1".into()));
        }
        Ok(())
    }

    /// Check the search parameters and that `core` builds.
    pub fn validate(&self) -> MinerResult<()> {
        self.validate_search()?;
        self.core.build().map(|_| ())
    }

    pub fn from_json_str(json: &str) -> MinerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> MinerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Load the configuration from the first source found, falling back to
    /// defaults.
    pub fn resolve(explicit: Option<&Path>) -> MinerResult<Self> {
        match resolve_config_path(explicit) {
            Some(path) => {
                tracing::debug!("Loading miner config from {}", path.display());
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Resolve the configuration file path: explicit, then [`CONFIG_ENV`], then
/// [`LOCAL_CONFIG`] if it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(env_path));
    }

    let local = PathBuf::from(LOCAL_CONFIG);
    local.exists().then_some(local)
}
