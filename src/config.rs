//! Configuration management for minichain

use serde::Deserialize;
use std::fs;

/// Tunables for the ledger engine.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Required count of leading zero hex digits a block hash must have.
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
    /// Smallest resolved-input total a transaction may carry.
    #[serde(default = "default_minimum_transaction")]
    pub minimum_transaction: u64,
    /// Upper bound on nonce attempts per block; `None` searches without bound.
    #[serde(default)]
    pub max_mine_attempts: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            minimum_transaction: default_minimum_transaction(),
            max_mine_attempts: None,
        }
    }
}

fn default_difficulty() -> usize {
    3
}

fn default_minimum_transaction() -> u64 {
    1
}

pub fn load_config() -> Result<LedgerConfig, Box<dyn std::error::Error>> {
    let config_str = fs::read_to_string("minichain.toml").unwrap_or_default();
    let config: LedgerConfig = if config_str.is_empty() {
        // Provide sane defaults when minichain.toml is absent
        LedgerConfig::default()
    } else {
        toml::from_str(&config_str)?
    };

    // Validate critical values
    if config.difficulty > 64 {
        return Err("difficulty cannot exceed the 64 hex digits of a SHA-256 hash".into());
    }

    if let Some(0) = config.max_mine_attempts {
        return Err("max_mine_attempts must be positive when set".into());
    }

    Ok(config)
}
