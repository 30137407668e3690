//! Error types for the round pipeline.
//!
//! Only two kinds of failure ever leave the crate: input errors rejected at a
//! function boundary, and the commit/reveal mismatch that aborts a round.
//! Collector failures are recovered locally and never appear here.

use thiserror::Error;

/// Errors from the commit/reveal state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommitError {
    #[error("commitment mismatch for node {node_id}: expected {expected}, got {actual}")]
    Mismatch {
        node_id: String,
        expected: String,
        actual: String,
    },

    #[error("invalid commit transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("reveal for node {node_id} does not belong to round {expected_round} (got {actual_round})")]
    RoundMismatch {
        node_id: String,
        expected_round: String,
        actual_round: String,
    },

    #[error("node id must not be empty")]
    EmptyNodeId,
}

/// Errors from the secure mixer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MixError {
    #[error("mixer requires at least one contribution")]
    NoContributions,
}

/// Errors from the uniqueness scorer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    #[error("invalid score weight {name}: {value} (must be finite and non-negative)")]
    InvalidWeights { name: &'static str, value: f64 },

    #[error("max_bits must be positive")]
    InvalidMaxBits,
}

/// Errors from the reward engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RewardError {
    #[error("invalid score: {0} (must be a finite number)")]
    InvalidScore(f64),

    #[error("miner id must be a non-empty string")]
    InvalidMinerId,
}

/// Errors from the hash strategy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("hash algorithm unavailable: {0}")]
    Unavailable(&'static str),

    #[error("unknown hash algorithm: {0}")]
    Unknown(String),
}

/// Errors from loading or validating a [`RoundConfig`](crate::config::RoundConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("prev_root_hash must be 64 lowercase hex characters, got {0:?}")]
    InvalidPrevHash(String),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// Fatal round errors. A round either completes with a full record or
/// returns one of these; there is no partial record.
#[derive(Debug, Error)]
pub enum RoundError {
    #[error("commit/reveal verification failed: {0}")]
    Commit(#[from] CommitError),

    #[error("mixing failed: {0}")]
    Mix(#[from] MixError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no collectors registered")]
    NoCollectors,
}
