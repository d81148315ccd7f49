//! Configuration for the staking core

use serde::{Deserialize, Serialize};

/// Staking core configuration.
///
/// Defaults match the deployed protocol parameters; the host may override
/// them per deployment via TOML or environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Minimum stake in micro-units (one whole base-asset unit)
    pub min_stake: u64,

    /// Flat protocol fee on stakes, in basis points
    pub protocol_fee_bps: u64,

    /// Upper bound on validator commission, in basis points
    pub max_commission_bps: u64,

    /// Blocks between unstaking initiation and eligibility (one cycle)
    pub unstaking_period_blocks: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_stake: 1_000_000,
            protocol_fee_bps: 100,          // 1%
            max_commission_bps: 2_000,      // 20%
            unstaking_period_blocks: 2_016, // standard cycle length
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(v) = std::env::var("STAKING_MIN_STAKE") {
            config.min_stake = parse_u64("STAKING_MIN_STAKE", &v)?;
        }

        if let Ok(v) = std::env::var("STAKING_PROTOCOL_FEE_BPS") {
            config.protocol_fee_bps = parse_u64("STAKING_PROTOCOL_FEE_BPS", &v)?;
        }

        if let Ok(v) = std::env::var("STAKING_MAX_COMMISSION_BPS") {
            config.max_commission_bps = parse_u64("STAKING_MAX_COMMISSION_BPS", &v)?;
        }

        if let Ok(v) = std::env::var("STAKING_UNSTAKING_PERIOD_BLOCKS") {
            config.unstaking_period_blocks = parse_u64("STAKING_UNSTAKING_PERIOD_BLOCKS", &v)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations the ledger cannot operate under
    pub fn validate(&self) -> crate::Result<()> {
        if self.protocol_fee_bps >= crate::rates::BPS_SCALE {
            return Err(crate::Error::Config(
                "protocol_fee_bps must be below 10000".to_string(),
            ));
        }
        if self.max_commission_bps > crate::rates::BPS_SCALE {
            return Err(crate::Error::Config(
                "max_commission_bps must not exceed 10000".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_u64(name: &str, value: &str) -> crate::Result<u64> {
    value
        .parse()
        .map_err(|_| crate::Error::Config(format!("{} must be an unsigned integer", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.min_stake, 1_000_000);
        assert_eq!(config.protocol_fee_bps, 100);
        assert_eq!(config.max_commission_bps, 2_000);
        assert_eq!(config.unstaking_period_blocks, 2_016);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            min_stake = 2000000
            protocol_fee_bps = 50
            max_commission_bps = 1500
            unstaking_period_blocks = 4032
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.min_stake, 2_000_000);
        assert_eq!(config.protocol_fee_bps, 50);
        assert_eq!(config.unstaking_period_blocks, 4_032);
    }

    #[test]
    fn test_validate_rejects_confiscatory_fee() {
        let config = Config {
            protocol_fee_bps: 10_000,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }
}
