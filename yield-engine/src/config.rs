//! Configuration for the yield engine

use serde::{Deserialize, Serialize};
use staking_core::Error;

/// Yield engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Minimum farming lock in blocks (one day at the protocol's
    /// block-time assumption)
    pub min_lock_period_blocks: u64,

    /// Cycles that must elapse between compounding claims
    pub min_cycles_between_compounds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_lock_period_blocks: 144,
            min_cycles_between_compounds: 1,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(v) = std::env::var("YIELD_MIN_LOCK_PERIOD_BLOCKS") {
            config.min_lock_period_blocks = v.parse().map_err(|_| {
                Error::Config("YIELD_MIN_LOCK_PERIOD_BLOCKS must be an unsigned integer".to_string())
            })?;
        }

        if let Ok(v) = std::env::var("YIELD_MIN_COMPOUND_CYCLES") {
            config.min_cycles_between_compounds = v.parse().map_err(|_| {
                Error::Config("YIELD_MIN_COMPOUND_CYCLES must be an unsigned integer".to_string())
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations the engine cannot operate under
    pub fn validate(&self) -> crate::Result<()> {
        if self.min_cycles_between_compounds == 0 {
            return Err(Error::Config(
                "min_cycles_between_compounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.min_lock_period_blocks, 144);
        assert_eq!(config.min_cycles_between_compounds, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
                min_lock_period_blocks = 288
                min_cycles_between_compounds = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.min_lock_period_blocks, 288);
        assert_eq!(config.min_cycles_between_compounds, 2);
    }

    #[test]
    fn test_validate_rejects_zero_compound_gate() {
        let config = Config {
            min_cycles_between_compounds: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
