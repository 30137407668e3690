//! Round configuration.
//!
//! Layered lowest to highest: built-in defaults, a JSON file
//! ([`load_config_from_path`]), `ROUNDSEED_*` environment variables
//! ([`RoundConfig::apply_env_overrides`]), then CLI flags set by the binary.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::detect::DetectorThresholds;
use crate::error::ConfigError;
use crate::normalize::is_lower_hex;
use crate::scoring::ScoreOptions;

pub const ENV_PREV_ROOT_HASH: &str = "ROUNDSEED_PREV_ROOT_HASH";
pub const ENV_ROUND_ID: &str = "ROUNDSEED_ROUND_ID";
pub const ENV_MINER_ID: &str = "ROUNDSEED_MINER_ID";
pub const ENV_COLLECT_TIMEOUT_SECS: &str = "ROUNDSEED_COLLECT_TIMEOUT_SECS";

/// Genesis previous-round hash: 64 zero hex characters.
pub const GENESIS_PREV_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Everything one round needs besides its collectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Fixed round id; a fresh `round-<uuid>` is generated when absent.
    pub round_id: Option<String>,
    /// Previous round hash, 64 lowercase hex characters.
    pub prev_root_hash: String,
    /// Node that commits to this round's entropy.
    pub node_id: String,
    /// Contributor credited with the award.
    pub miner_id: String,
    /// Optional mixer salt (hex decoded when well-formed).
    pub salt: Option<String>,
    /// Bytes requested from each collector.
    pub collect_bytes: usize,
    /// Seconds to wait for collectors before substituting random bytes.
    pub collect_timeout_secs: f64,
    pub detector: DetectorThresholds,
    pub scoring: ScoreOptions,
    /// Hex buffers of earlier rounds, for the non-repeatability metric.
    pub prior_rounds: Vec<String>,
    /// Previous round's hex contribution per source id, for similarity screening.
    pub previous_contributions: BTreeMap<String, String>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            round_id: None,
            prev_root_hash: GENESIS_PREV_HASH.to_string(),
            node_id: "node-local".to_string(),
            miner_id: "local-miner".to_string(),
            salt: None,
            collect_bytes: 32,
            collect_timeout_secs: 5.0,
            detector: DetectorThresholds::default(),
            scoring: ScoreOptions::default(),
            prior_rounds: Vec::new(),
            previous_contributions: BTreeMap::new(),
        }
    }
}

/// Load a config JSON from disk. Missing fields take their defaults.
pub fn load_config_from_path(path: &Path) -> Result<RoundConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let config = serde_json::from_str::<RoundConfig>(&raw)?;
    config.validate()?;
    Ok(config)
}

fn decode_hex(key: &'static str, value: &str) -> Result<Vec<u8>, ConfigError> {
    hex::decode(value).map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

impl RoundConfig {
    /// Apply `ROUNDSEED_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_PREV_ROOT_HASH) {
            self.prev_root_hash = v.trim().to_string();
        }
        if let Some(v) = lookup(ENV_ROUND_ID) {
            self.round_id = Some(v.trim().to_string());
        }
        if let Some(v) = lookup(ENV_MINER_ID) {
            self.miner_id = v.trim().to_string();
        }
        if let Some(v) = lookup(ENV_COLLECT_TIMEOUT_SECS) {
            self.collect_timeout_secs = v.trim().parse::<f64>().map_err(|_| ConfigError::InvalidValue {
                key: "collect_timeout_secs",
                value: v.clone(),
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prev_root_hash.len() != 64 || !is_lower_hex(&self.prev_root_hash) {
            return Err(ConfigError::InvalidPrevHash(self.prev_root_hash.clone()));
        }
        if !self.collect_timeout_secs.is_finite() || self.collect_timeout_secs <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "collect_timeout_secs",
                value: self.collect_timeout_secs.to_string(),
            });
        }
        if self.collect_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "collect_bytes",
                value: "0".to_string(),
            });
        }
        if self.node_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "node_id",
                value: self.node_id.clone(),
            });
        }
        self.scoring.validate()?;
        self.prior_round_bytes()?;
        self.previous_contribution_bytes()?;
        Ok(())
    }

    pub fn collect_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.collect_timeout_secs)
    }

    /// Configured round id, or a fresh `round-<uuid v4>`.
    pub fn resolve_round_id(&self) -> String {
        match &self.round_id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => format!("round-{}", uuid::Uuid::new_v4()),
        }
    }

    /// Decoded prior-round buffers.
    pub fn prior_round_bytes(&self) -> Result<Vec<Vec<u8>>, ConfigError> {
        self.prior_rounds
            .iter()
            .map(|h| decode_hex("prior_rounds", h))
            .collect()
    }

    /// Every configured previous contribution, decoded, keyed by source id.
    pub fn previous_contribution_bytes(&self) -> Result<BTreeMap<String, Vec<u8>>, ConfigError> {
        self.previous_contributions
            .iter()
            .map(|(id, h)| Ok((id.clone(), decode_hex("previous_contributions", h)?)))
            .collect()
    }

    /// Decoded previous contribution for `source_id`, if configured.
    pub fn previous_contribution(&self, source_id: &str) -> Result<Option<Vec<u8>>, ConfigError> {
        self.previous_contributions
            .get(source_id)
            .map(|h| decode_hex("previous_contributions", h))
            .transpose()
    }

    /// Salt bytes: hex decoded when well-formed, otherwise UTF-8.
    pub fn salt_bytes(&self) -> Option<Vec<u8>> {
        self.salt.as_ref().map(|s| {
            if is_lower_hex(s) {
                hex::decode(s).unwrap_or_else(|_| s.as_bytes().to_vec())
            } else {
                s.as_bytes().to_vec()
            }
        })
    }
}
