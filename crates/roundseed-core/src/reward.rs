//! Score-to-token rewards and an immutable balance ledger.
//!
//! Brackets use their own coarse vocabulary (High/Medium/Low Entropy) and are
//! deliberately independent of [`ScoreCategory`](crate::scoring::ScoreCategory).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RewardError;

/// Reward bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardBracket {
    #[serde(rename = "High Entropy")]
    High,
    #[serde(rename = "Medium Entropy")]
    Medium,
    #[serde(rename = "Low Entropy")]
    Low,
}

impl RewardBracket {
    pub fn tokens(self) -> u64 {
        match self {
            Self::High => 5,
            Self::Medium => 3,
            Self::Low => 1,
        }
    }
}

impl std::fmt::Display for RewardBracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High Entropy"),
            Self::Medium => write!(f, "Medium Entropy"),
            Self::Low => write!(f, "Low Entropy"),
        }
    }
}

/// Tokens awarded for one score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub tokens: u64,
    pub bracket: RewardBracket,
    pub reason: String,
}

/// Map a score to a reward. Input is clamped to [0, 100] first.
pub fn compute_reward(score: i64) -> Reward {
    let score = score.clamp(0, 100);
    let bracket = match score {
        81..=100 => RewardBracket::High,
        50..=80 => RewardBracket::Medium,
        _ => RewardBracket::Low,
    };
    Reward {
        tokens: bracket.tokens(),
        bracket,
        reason: format!("{bracket} bracket (score {score})"),
    }
}

/// Like [`compute_reward`] for fractional scores, rounded to the nearest
/// integer. Non-finite input is rejected.
pub fn compute_reward_f64(score: f64) -> Result<Reward, RewardError> {
    if !score.is_finite() {
        return Err(RewardError::InvalidScore(score));
    }
    Ok(compute_reward(score.clamp(0.0, 100.0).round() as i64))
}

/// In-memory contributor balances.
///
/// Updates never mutate in place: [`BalanceLedger::award`] returns a new
/// snapshot and the caller decides which one to keep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLedger {
    balances: BTreeMap<String, u64>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// New ledger with `tokens` added to `miner_id` (starting from 0).
    pub fn award(&self, miner_id: &str, tokens: u64) -> Result<Self, RewardError> {
        let miner_id = miner_id.trim();
        if miner_id.is_empty() {
            return Err(RewardError::InvalidMinerId);
        }
        let mut balances = self.balances.clone();
        let entry = balances.entry(miner_id.to_string()).or_insert(0);
        *entry = entry.saturating_add(tokens);
        Ok(Self { balances })
    }

    /// Award the tokens of a computed [`Reward`].
    pub fn award_reward(&self, miner_id: &str, reward: &Reward) -> Result<Self, RewardError> {
        self.award(miner_id, reward.tokens)
    }

    pub fn balance_of(&self, miner_id: &str) -> u64 {
        self.balances.get(miner_id).copied().unwrap_or(0)
    }

    /// Sum of all balances, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.balances.values().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.balances.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
