//! The auditable artifact of one round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::commit::PublicCommit;
use crate::detect::DetectionResult;
use crate::error::RewardError;
use crate::reward::{BalanceLedger, RewardBracket};
use crate::scoring::ScoreBreakdown;

/// One completed round.
///
/// The first six fields are the stable external format; the rest are audit
/// detail. Persistence is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round_id: String,
    /// Previous round hash, 64 lowercase hex characters.
    pub prev_root_hash: String,
    pub timestamp: DateTime<Utc>,
    /// Commitments only; secrets and `E` never leave the round.
    pub reveals: Vec<PublicCommit>,
    /// Round seed, 64 lowercase hex characters.
    #[serde(rename = "R_round")]
    pub r_round: String,
    pub awarded: u64,

    pub reward_bracket: RewardBracket,
    pub score: ScoreBreakdown,
    /// Cheat screening, one entry per contribution in collection order.
    /// Advisory.
    pub detections: Vec<SourceDetection>,
    /// Hex of each contribution in mixed order.
    pub shuffled_order: Vec<String>,
}

/// Screening result for one contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDetection {
    pub source_id: String,
    #[serde(flatten)]
    pub result: DetectionResult,
}

impl RoundRecord {
    /// Credit this round's award to `miner_id`, returning the new ledger.
    pub fn settle(&self, ledger: &BalanceLedger, miner_id: &str) -> Result<BalanceLedger, RewardError> {
        ledger.award(miner_id, self.awarded)
    }

    /// Number of contributions screened as suspicious.
    pub fn flagged_count(&self) -> usize {
        self.detections.iter().filter(|d| d.result.cheated).count()
    }

    /// Screening results for every contribution from `source_id`.
    pub fn detections_for<'a>(
        &'a self,
        source_id: &'a str,
    ) -> impl Iterator<Item = &'a DetectionResult> + 'a {
        self.detections
            .iter()
            .filter(move |d| d.source_id == source_id)
            .map(|d| &d.result)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
