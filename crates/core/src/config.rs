//! Engine configuration
//!
//! The engine has two tunables: the exponent of the scale a freshly
//! broadcast lane set starts from, and the seed of the per-width lane
//! generators. Both can come from a TOML file or from environment
//! variables, and are installed once per process.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, Result};

/// Default initial scale exponent (p = -12 means broadcast starts at 2^-12)
pub const DEFAULT_SCALE_EXPONENT: i32 = -12;

/// Smallest accepted initial scale exponent
pub const MIN_SCALE_EXPONENT: i32 = -64;

/// Largest accepted initial scale exponent
pub const MAX_SCALE_EXPONENT: i32 = 64;

const ENV_SCALE_EXPONENT: &str = "BITPLANE_INITIAL_SCALE_EXPONENT";
const ENV_SEED: &str = "BITPLANE_SEED";

static GLOBAL: OnceCell<EngineConfig> = OnceCell::new();

/// Process-wide engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Exponent `p` of the starting scale `2^p` used by `broadcast`
    pub initial_scale_exponent: i32,
    /// Seed for the per-width lane generators (OS entropy when unset)
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_scale_exponent: DEFAULT_SCALE_EXPONENT,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_SCALE_EXPONENT) {
            match raw.trim().parse::<i32>() {
                Ok(p) if (MIN_SCALE_EXPONENT..=MAX_SCALE_EXPONENT).contains(&p) => {
                    config.initial_scale_exponent = p;
                }
                _ => tracing::warn!(
                    value = %raw,
                    "Ignoring {}: expected an integer in [{}, {}]",
                    ENV_SCALE_EXPONENT,
                    MIN_SCALE_EXPONENT,
                    MAX_SCALE_EXPONENT
                ),
            }
        }

        if let Some(raw) = lookup(ENV_SEED) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => config.seed = Some(seed),
                Err(_) => tracing::warn!(value = %raw, "Ignoring {}: expected a u64", ENV_SEED),
            }
        }

        config
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded engine configuration");
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CoreError::ConfigSerialize(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that every field is in range
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SCALE_EXPONENT..=MAX_SCALE_EXPONENT).contains(&self.initial_scale_exponent) {
            return Err(CoreError::InvalidConfig(format!(
                "initial_scale_exponent {} outside [{}, {}]",
                self.initial_scale_exponent, MIN_SCALE_EXPONENT, MAX_SCALE_EXPONENT
            )));
        }
        Ok(())
    }

    /// The scale a broadcast starts from: `2^initial_scale_exponent`
    pub fn initial_scale(&self) -> f64 {
        2f64.powi(self.initial_scale_exponent)
    }

    /// Install this configuration as the process-wide one.
    ///
    /// Fails if a configuration was already installed or lazily loaded.
    pub fn install(self) -> Result<()> {
        self.validate()?;
        let exponent = self.initial_scale_exponent;
        let seeded = self.seed.is_some();
        GLOBAL
            .set(self)
            .map_err(|_| CoreError::ConfigAlreadyInstalled)?;
        tracing::info!(initial_scale_exponent = exponent, seeded, "Installed engine configuration");
        Ok(())
    }

    /// The process-wide configuration, loaded from the environment on first use
    pub fn global() -> &'static EngineConfig {
        GLOBAL.get_or_init(|| {
            let config = Self::from_env();
            tracing::debug!(
                initial_scale_exponent = config.initial_scale_exponent,
                seeded = config.seed.is_some(),
                "Loaded engine configuration from environment"
            );
            config
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.initial_scale_exponent, -12);
        assert_eq!(config.seed, None);
        assert_eq!(config.initial_scale(), 1.0 / 4096.0);
    }

    #[test]
    fn test_from_lookup() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("BITPLANE_INITIAL_SCALE_EXPONENT", "-3"),
            ("BITPLANE_SEED", "42"),
        ]));
        assert_eq!(config.initial_scale_exponent, -3);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.initial_scale(), 0.125);
    }

    #[test]
    fn test_from_lookup_ignores_bad_values() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("BITPLANE_INITIAL_SCALE_EXPONENT", "1000"),
            ("BITPLANE_SEED", "not-a-number"),
        ]));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = EngineConfig {
            initial_scale_exponent: MAX_SCALE_EXPONENT + 1,
            seed: None,
        };
        assert!(matches!(config.validate(), Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        let config = EngineConfig {
            initial_scale_exponent: 2,
            seed: Some(7),
        };
        config.to_file(&path).unwrap();
        let loaded = EngineConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "seed = 9\n").unwrap();
        let loaded = EngineConfig::from_file(&path).unwrap();
        assert_eq!(loaded.initial_scale_exponent, DEFAULT_SCALE_EXPONENT);
        assert_eq!(loaded.seed, Some(9));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "initial_scale_exponent = \"big\"\n").unwrap();
        let err = EngineConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse(_)));
        assert!(err.is_config_source());
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/engine.toml")).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
