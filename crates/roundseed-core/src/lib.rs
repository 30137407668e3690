//! # roundseed-core
//!
//! **Fair, auditable round seeds from many small entropy sources.**
//!
//! `roundseed-core` gathers entropy from a handful of collectors (pointer,
//! keyboard, CPU jitter, the OS CSPRNG), binds it to a round with a
//! commit/reveal step, shuffles and hashes it into a 256-bit seed, screens
//! the inputs for cheating, scores the round, and awards tokens.
//!
//! ## Quick Start
//!
//! ```no_run
//! use roundseed_core::{RoundConfig, RoundOrchestrator};
//!
//! let orchestrator = RoundOrchestrator::with_default_collectors(RoundConfig::default())
//!     .expect("default config is valid");
//! let record = orchestrator.run_round().expect("round completes");
//! println!("{} -> {} ({} tokens)", record.round_id, record.r_round, record.awarded);
//! ```
//!
//! ## Architecture
//!
//! Collectors → Normalize → Commit/Reveal → Mix → Detect → Score → Reward → Record
//!
//! Only a commit/reveal mismatch aborts a round. A failing collector is
//! replaced by 32 random bytes, and detection flags are advisory.

pub mod collectors;
pub mod commit;
pub mod conditioning;
pub mod config;
pub mod detect;
pub mod error;
pub mod hash;
pub mod mixer;
pub mod normalize;
pub mod record;
pub mod reward;
pub mod round;
pub mod scoring;
pub mod source;

pub use collectors::{
    CpuJitterCollector, FixedCollector, KeyboardCollector, MouseCollector, OsRandomCollector,
    default_collectors,
};
pub use commit::{CommitState, CommitmentSession, PublicCommit, Reveal, compute_commitment, entropy_digest};
pub use conditioning::quick_shannon;
pub use config::{GENESIS_PREV_HASH, RoundConfig, load_config_from_path};
pub use detect::{CheatKind, DetectionResult, DetectorThresholds, detect, detect_with};
pub use error::{CommitError, ConfigError, HashError, MixError, RewardError, RoundError, ScoreError};
pub use hash::{HashAlgorithm, sha256, sha512};
pub use mixer::{MixInput, RoundSeed, mix, mix_with_rng, secure_shuffle};
pub use normalize::{fixed_width, normalize, random_fallback};
pub use record::{RoundRecord, SourceDetection};
pub use reward::{BalanceLedger, Reward, RewardBracket, compute_reward, compute_reward_f64};
pub use round::RoundOrchestrator;
pub use scoring::{ScoreBreakdown, ScoreCategory, ScoreOptions, ScoreWeights, score};
pub use source::{CollectorInfo, CollectorKind, CollectorOutput, EntropyCollector, EntropyContribution};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
