//! Manipulation heuristics over a single contribution.
//!
//! Checks run in order and the first hit wins:
//! 1. Repetition: one byte value makes up more than half the buffer
//! 2. Similarity: byte-wise equality with the previous round above 85%
//! 3. Entropy floor: Shannon entropy below 4.0 bits/byte
//!
//! Results are advisory. The orchestrator logs a positive flag and carries on.
//! Checks look at a contribution's raw bytes before mixing, never at the seed.

use serde::{Deserialize, Serialize};

use crate::conditioning::{max_byte_count, quick_shannon};

/// Which heuristic fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheatKind {
    Repetition,
    Similarity,
    LowEntropy,
}

/// Outcome of screening one contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub cheated: bool,
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<CheatKind>,
}

impl DetectionResult {
    pub fn clean() -> Self {
        Self {
            cheated: false,
            reason: None,
            kind: None,
        }
    }

    fn flagged(kind: CheatKind, reason: String) -> Self {
        Self {
            cheated: true,
            reason: Some(reason),
            kind: Some(kind),
        }
    }
}

/// Tunable limits. Defaults are the production values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorThresholds {
    /// Max share of the buffer one byte value may occupy (exclusive).
    pub max_repeat_ratio: f64,
    /// Max similarity with the previous round, in percent (exclusive).
    pub max_similarity_percent: f64,
    /// Min Shannon entropy in bits/byte (inclusive).
    pub min_entropy_bits: f64,
}

impl Default for DetectorThresholds {
    fn default() -> Self {
        Self {
            max_repeat_ratio: 0.5,
            max_similarity_percent: 85.0,
            min_entropy_bits: 4.0,
        }
    }
}

/// Share of the buffer taken by its most frequent byte value.
pub fn repetition_ratio(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    max_byte_count(data) as f64 / data.len() as f64
}

/// Percentage of positions with equal bytes over the shorter length.
pub fn similarity_percent(current: &[u8], previous: &[u8]) -> f64 {
    let len = current.len().min(previous.len());
    if len == 0 {
        return 0.0;
    }
    let same = current
        .iter()
        .zip(previous)
        .filter(|(a, b)| a == b)
        .count();
    same as f64 / len as f64 * 100.0
}

/// Screen with default thresholds.
pub fn detect(current: &[u8], previous: Option<&[u8]>) -> DetectionResult {
    detect_with(current, previous, &DetectorThresholds::default())
}

/// Screen with explicit thresholds.
pub fn detect_with(
    current: &[u8],
    previous: Option<&[u8]>,
    thresholds: &DetectorThresholds,
) -> DetectionResult {
    if current.is_empty() {
        return DetectionResult::clean();
    }

    if repetition_ratio(current) > thresholds.max_repeat_ratio {
        return DetectionResult::flagged(
            CheatKind::Repetition,
            "too many repeated values".to_string(),
        );
    }

    if let Some(prev) = previous {
        let similarity = similarity_percent(current, prev);
        if similarity > thresholds.max_similarity_percent {
            return DetectionResult::flagged(
                CheatKind::Similarity,
                format!("too similar to previous round ({similarity:.2}%)"),
            );
        }
    }

    let entropy = quick_shannon(current);
    if entropy < thresholds.min_entropy_bits {
        return DetectionResult::flagged(
            CheatKind::LowEntropy,
            format!("low entropy ({entropy:.2} bits/byte)"),
        );
    }

    DetectionResult::clean()
}
