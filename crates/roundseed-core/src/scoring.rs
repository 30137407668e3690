//! Uniqueness scoring of a round's contributions.
//!
//! Four sub-metrics, each normalized to [0, 1]:
//!
//! | Metric           | Measures                                   | Default weight |
//! |------------------|--------------------------------------------|----------------|
//! | `entropy_norm`   | Shannon bits/byte over the whole round / 8 | 0.40           |
//! | `non_repeat_norm`| 1 − max bitwise similarity to prior rounds | 0.25           |
//! | `amount_norm`    | total bits / `max_bits` (default 2048)     | 0.20           |
//! | `variation_norm` | CV of per-32-byte-block entropy / 0.5      | 0.15           |
//!
//! The weighted sum is clamped to [0, 1], scaled by 100 and rounded. Weights
//! need not sum to 1.

use serde::{Deserialize, Serialize};

use crate::conditioning::{MAX_BITS_PER_BYTE, quick_shannon};
use crate::error::ScoreError;

/// Default amount cap in bits.
pub const DEFAULT_MAX_BITS: usize = 2048;

/// Block size for the variation metric.
pub const VARIATION_BLOCK: usize = 32;

/// Coefficient of variation that maps to a full `variation_norm`.
pub const VARIATION_CV_CAP: f64 = 0.5;

/// Four-way quality label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreCategory {
    #[serde(rename = "Low")]
    Low,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Moderate-High")]
    ModerateHigh,
    #[serde(rename = "High Entropy")]
    HighEntropy,
}

impl ScoreCategory {
    /// Category for a 0–100 score.
    pub fn from_score(score: u8) -> Self {
        match score {
            85.. => Self::HighEntropy,
            65..=84 => Self::ModerateHigh,
            40..=64 => Self::Moderate,
            _ => Self::Low,
        }
    }
}

impl std::fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Moderate => write!(f, "Moderate"),
            Self::ModerateHigh => write!(f, "Moderate-High"),
            Self::HighEntropy => write!(f, "High Entropy"),
        }
    }
}

/// Relative weights of the sub-metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub entropy: f64,
    pub non_repeat: f64,
    pub amount: f64,
    pub variation: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            entropy: 0.40,
            non_repeat: 0.25,
            amount: 0.20,
            variation: 0.15,
        }
    }
}

impl ScoreWeights {
    /// Validated weights: each must be finite and non-negative.
    pub fn new(entropy: f64, non_repeat: f64, amount: f64, variation: f64) -> Result<Self, ScoreError> {
        let w = Self {
            entropy,
            non_repeat,
            amount,
            variation,
        };
        w.validate()?;
        Ok(w)
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        for (name, value) in [
            ("entropy", self.entropy),
            ("non_repeat", self.non_repeat),
            ("amount", self.amount),
            ("variation", self.variation),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoreError::InvalidWeights { name, value });
            }
        }
        Ok(())
    }
}

/// Scorer inputs beyond the contributions themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreOptions {
    /// Buffers from earlier rounds for the non-repeatability metric.
    #[serde(skip)]
    pub prior_rounds: Vec<Vec<u8>>,
    pub weights: ScoreWeights,
    pub max_bits: usize,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            prior_rounds: Vec::new(),
            weights: ScoreWeights::default(),
            max_bits: DEFAULT_MAX_BITS,
        }
    }
}

impl ScoreOptions {
    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.max_bits == 0 {
            return Err(ScoreError::InvalidMaxBits);
        }
        self.weights.validate()
    }
}

/// Score and its components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub score: u8,
    pub category: ScoreCategory,
    pub entropy_norm: f64,
    pub non_repeat_norm: f64,
    pub amount_norm: f64,
    pub variation_norm: f64,
}

impl ScoreBreakdown {
    /// Result for a round with nothing to score.
    pub fn empty() -> Self {
        Self {
            score: 0,
            category: ScoreCategory::Low,
            entropy_norm: 0.0,
            non_repeat_norm: 0.0,
            amount_norm: 0.0,
            variation_norm: 0.0,
        }
    }
}

fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Shannon entropy of `data` divided by 8, clamped to [0, 1].
pub fn entropy_norm(data: &[u8]) -> f64 {
    clamp01(quick_shannon(data) / MAX_BITS_PER_BYTE)
}

/// Total bit length over `max_bits`, clamped to [0, 1].
pub fn amount_norm(data: &[u8], max_bits: usize) -> f64 {
    if max_bits == 0 {
        return 0.0;
    }
    clamp01((data.len() * 8) as f64 / max_bits as f64)
}

/// Coefficient of variation of per-block entropy, over [`VARIATION_CV_CAP`].
///
/// Blocks are consecutive [`VARIATION_BLOCK`]-byte slices; a short trailing
/// block counts as its own block. Fewer than two blocks, or a zero mean,
/// yields 0.
pub fn variation_norm(data: &[u8]) -> f64 {
    let entropies: Vec<f64> = data.chunks(VARIATION_BLOCK).map(quick_shannon).collect();
    if entropies.len() < 2 {
        return 0.0;
    }
    let n = entropies.len() as f64;
    let mean = entropies.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = entropies.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / n;
    let cv = variance.sqrt() / mean;
    clamp01(cv / VARIATION_CV_CAP)
}

/// `1 − differing_bits / compared_bits` over the common prefix.
pub fn bitwise_similarity(a: &[u8], b: &[u8]) -> f64 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }
    let differing: u32 = a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum();
    1.0 - differing as f64 / (len * 8) as f64
}

/// 1 minus the highest bitwise similarity to any prior round; 1 with none.
pub fn non_repeat_norm(data: &[u8], prior_rounds: &[Vec<u8>]) -> f64 {
    let max_similarity = prior_rounds
        .iter()
        .map(|prior| bitwise_similarity(data, prior))
        .fold(0.0f64, f64::max);
    clamp01(1.0 - max_similarity)
}

/// Score a round's contributions, concatenated in the order given.
pub fn score<T: AsRef<[u8]>>(contributions: &[T], options: &ScoreOptions) -> ScoreBreakdown {
    let data: Vec<u8> = contributions
        .iter()
        .flat_map(|c| c.as_ref().iter().copied())
        .collect();
    if data.is_empty() {
        return ScoreBreakdown::empty();
    }

    let entropy = entropy_norm(&data);
    let non_repeat = non_repeat_norm(&data, &options.prior_rounds);
    let amount = amount_norm(&data, options.max_bits);
    let variation = variation_norm(&data);

    let w = &options.weights;
    let combined = clamp01(
        w.entropy * entropy + w.non_repeat * non_repeat + w.amount * amount + w.variation * variation,
    );
    let score = (combined * 100.0).round() as u8;

    ScoreBreakdown {
        score,
        category: ScoreCategory::from_score(score),
        entropy_norm: entropy,
        non_repeat_norm: non_repeat,
        amount_norm: amount,
        variation_norm: variation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn uniform(n: usize) -> Vec<u8> {
        (0..n).map(|i| (i % 256) as u8).collect()
    }

    #[test]
    fn test_empty_input_scores_zero_low() {
        let b = score::<Vec<u8>>(&[], &ScoreOptions::default());
        assert_eq!(b, ScoreBreakdown::empty());
        assert_eq!(b.category, ScoreCategory::Low);

        let b = score(&[Vec::<u8>::new(), Vec::new()], &ScoreOptions::default());
        assert_eq!(b.score, 0);
    }

    #[test]
    fn test_entropy_norm_extremes() {
        assert_eq!(entropy_norm(&[5u8; 100]), 0.0);
        assert!((entropy_norm(&uniform(256)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_amount_norm_caps() {
        assert!((amount_norm(&[0u8; 128], 2048) - 0.5).abs() < 1e-12);
        assert_eq!(amount_norm(&[0u8; 1024], 2048), 1.0);
        assert_eq!(amount_norm(&[0u8; 10], 0), 0.0);
    }

    #[test]
    fn test_variation_zero_for_repeated_full_entropy_pattern() {
        let block: Vec<u8> = (0..32).collect();
        let data = block.repeat(8);
        assert_eq!(variation_norm(&data), 0.0);
    }

    #[test]
    fn test_variation_positive_for_mixed_blocks() {
        let mut data: Vec<u8> = (0..32).collect();
        data.extend([0u8; 32]);
        data.extend(0..32u8);
        data.extend([1u8; 32]);
        // Block entropies 5, 0, 5, 0: mean 2.5, sd 2.5, cv 1.0 → clamped.
        assert_eq!(variation_norm(&data), 1.0);
    }

    #[test]
    fn test_variation_single_block_is_zero() {
        assert_eq!(variation_norm(&uniform(32)), 0.0);
    }

    #[test]
    fn test_bitwise_similarity() {
        assert_eq!(bitwise_similarity(&[0xff], &[0xff]), 1.0);
        assert_eq!(bitwise_similarity(&[0xff], &[0x00]), 0.0);
        assert!((bitwise_similarity(&[0x0f], &[0x00]) - 0.5).abs() < 1e-12);
        assert_eq!(bitwise_similarity(&[], &[1]), 0.0);
    }

    #[test]
    fn test_non_repeat_defaults_to_one() {
        assert_eq!(non_repeat_norm(&[1, 2, 3], &[]), 1.0);
    }

    #[test]
    fn test_non_repeat_uses_most_similar_prior() {
        let data = vec![0xaau8; 16];
        let priors = vec![vec![0x55u8; 16], data.clone()];
        assert_eq!(non_repeat_norm(&data, &priors), 0.0);
    }

    #[test]
    fn test_full_quality_round_scores_high() {
        let data = uniform(256);
        let b = score(&[data], &ScoreOptions::default());
        // entropy 1.0, non-repeat 1.0, amount 1.0, variation 0.0 → 85
        assert_eq!(b.score, 85);
        assert_eq!(b.category, ScoreCategory::HighEntropy);
    }

    #[test]
    fn test_constant_round_scores_low() {
        let b = score(&[vec![0u8; 16]], &ScoreOptions::default());
        // entropy 0, non-repeat 1.0, amount 128/2048, variation 0 → 25 + 1.25
        assert_eq!(b.score, 26);
        assert_eq!(b.category, ScoreCategory::Low);
    }

    #[test]
    fn test_weight_override_and_clamp() {
        let opts = ScoreOptions {
            weights: ScoreWeights::new(2.0, 2.0, 2.0, 2.0).unwrap(),
            ..ScoreOptions::default()
        };
        let b = score(&[uniform(256)], &opts);
        assert_eq!(b.score, 100);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        assert!(ScoreWeights::new(-0.1, 0.0, 0.0, 0.0).is_err());
        assert!(ScoreWeights::new(f64::NAN, 0.0, 0.0, 0.0).is_err());
        let opts = ScoreOptions {
            max_bits: 0,
            ..ScoreOptions::default()
        };
        assert_eq!(opts.validate(), Err(ScoreError::InvalidMaxBits));
    }

    #[test]
    fn test_category_thresholds() {
        assert_eq!(ScoreCategory::from_score(100), ScoreCategory::HighEntropy);
        assert_eq!(ScoreCategory::from_score(85), ScoreCategory::HighEntropy);
        assert_eq!(ScoreCategory::from_score(84), ScoreCategory::ModerateHigh);
        assert_eq!(ScoreCategory::from_score(65), ScoreCategory::ModerateHigh);
        assert_eq!(ScoreCategory::from_score(64), ScoreCategory::Moderate);
        assert_eq!(ScoreCategory::from_score(40), ScoreCategory::Moderate);
        assert_eq!(ScoreCategory::from_score(39), ScoreCategory::Low);
        assert_eq!(ScoreCategory::ModerateHigh.to_string(), "Moderate-High");
    }

    #[test]
    fn test_category_serializes_with_display_names() {
        let json = serde_json::to_string(&ScoreCategory::HighEntropy).unwrap();
        assert_eq!(json, "\"High Entropy\"");
    }

    proptest! {
        #[test]
        fn prop_sub_scores_in_unit_interval(
            data in proptest::collection::vec(any::<u8>(), 0..600),
            prior in proptest::collection::vec(any::<u8>(), 0..300),
        ) {
            let opts = ScoreOptions { prior_rounds: vec![prior], ..ScoreOptions::default() };
            let b = score(&[data], &opts);
            for v in [b.entropy_norm, b.non_repeat_norm, b.amount_norm, b.variation_norm] {
                prop_assert!((0.0..=1.0).contains(&v));
            }
            prop_assert!(b.score <= 100);
        }
    }
}
