use crate::error::{LoyaltyError, LoyaltyResult};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_CAP: usize = 50;
pub const DEFAULT_CODE_PREFIX: &str = "RWD-";

/// Engine configuration. Every field has a default, so a config file
/// only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltyConfig {
    /// Offset of the account's local time from UTC, in minutes.
    /// Calendar-day gating compares dates in this offset.
    pub utc_offset_minutes: i32,
    /// Program tag prepended to every redemption code.
    pub code_prefix: String,
    /// Fixes the master RNG seed. None draws one from OS entropy.
    pub rng_seed: Option<u64>,
    /// Reject redemptions that exceed the balance instead of clamping.
    pub strict_redemption: bool,
    /// Maximum retained ledger history entries.
    pub history_cap: usize,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            code_prefix: DEFAULT_CODE_PREFIX.to_string(),
            rng_seed: None,
            strict_redemption: false,
            history_cap: DEFAULT_HISTORY_CAP,
        }
    }
}

impl LoyaltyConfig {
    /// Load from a JSON file.
    /// In tests, use LoyaltyConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: LoyaltyConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Seeded, UTC, lenient-redemption config for tests.
    pub fn default_test() -> Self {
        Self {
            rng_seed: Some(0x5EED_CAFE),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> LoyaltyResult<()> {
        self.local_offset()?;
        if self.history_cap == 0 {
            return Err(LoyaltyError::InvalidConfig {
                reason: "history_cap must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The account's local time reference.
    pub fn local_offset(&self) -> LoyaltyResult<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| LoyaltyError::InvalidConfig {
                reason: format!(
                    "utc_offset_minutes {} is outside ±24h",
                    self.utc_offset_minutes
                ),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: LoyaltyConfig =
            serde_json::from_str(r#"{ "utc_offset_minutes": 120, "strict_redemption": true }"#)
                .unwrap();
        assert_eq!(config.utc_offset_minutes, 120);
        assert!(config.strict_redemption);
        assert_eq!(config.code_prefix, DEFAULT_CODE_PREFIX);
        assert_eq!(config.history_cap, DEFAULT_HISTORY_CAP);
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn rejects_offsets_beyond_a_day() {
        let config = LoyaltyConfig {
            utc_offset_minutes: 25 * 60,
            ..LoyaltyConfig::default()
        };
        assert!(matches!(config.validate(), Err(LoyaltyError::InvalidConfig { .. })));
    }

    #[test]
    fn rejects_zero_history_cap() {
        let config = LoyaltyConfig {
            history_cap: 0,
            ..LoyaltyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_a_file() {
        let path = std::env::temp_dir().join(format!("loyalty-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "code_prefix": "VIP-", "rng_seed": 9 }"#).unwrap();
        let config = LoyaltyConfig::load(path.to_str().unwrap()).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.code_prefix, "VIP-");
        assert_eq!(config.rng_seed, Some(9));
    }

    #[test]
    fn load_reports_missing_file() {
        assert!(LoyaltyConfig::load("/nonexistent/loyalty.json").is_err());
    }
}
