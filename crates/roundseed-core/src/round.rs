//! One round, end to end.
//!
//! Architecture:
//! 1. Fan out to every collector in parallel, one thread each
//! 2. Substitute 32 random bytes for any collector that fails, panics or
//!    misses the deadline
//! 3. Commit to the node's entropy digest, reveal, verify (fatal on mismatch)
//! 4. Shuffle and hash the contributions into the round seed
//! 5. Screen each contribution, score the round, compute the award
//! 6. Emit the [`RoundRecord`]
//!
//! The orchestrator keeps no state between rounds.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, error, info, warn};

use crate::collectors::default_collectors;
use crate::commit::{CommitmentSession, Reveal, entropy_digest};
use crate::config::RoundConfig;
use crate::detect::detect_with;
use crate::error::{ConfigError, RoundError};
use crate::mixer::{MixInput, mix};
use crate::normalize::normalize;
use crate::record::{RoundRecord, SourceDetection};
use crate::reward::compute_reward;
use crate::scoring::{ScoreOptions, score};
use crate::source::{CollectorOutput, EntropyCollector, EntropyContribution};

/// Sequences collectors and pipeline stages for one round at a time.
pub struct RoundOrchestrator {
    collectors: Vec<Arc<dyn EntropyCollector>>,
    config: RoundConfig,
    /// Decoded `config.prior_rounds`.
    prior_rounds: Vec<Vec<u8>>,
    /// Decoded `config.previous_contributions`.
    previous: BTreeMap<String, Vec<u8>>,
}

impl RoundOrchestrator {
    /// Create an orchestrator with no collectors.
    ///
    /// All config input is checked and decoded here; a constructed
    /// orchestrator never fails a round on configuration.
    pub fn new(config: RoundConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let prior_rounds = config.prior_round_bytes()?;
        let previous = config.previous_contribution_bytes()?;
        Ok(Self {
            collectors: Vec::new(),
            config,
            prior_rounds,
            previous,
        })
    }

    /// Create an orchestrator with the default mouse/keyboard/cpu/crypto set.
    pub fn with_default_collectors(config: RoundConfig) -> Result<Self, ConfigError> {
        let mut orchestrator = Self::new(config)?;
        for collector in default_collectors() {
            orchestrator.add_collector(collector);
        }
        Ok(orchestrator)
    }

    /// Register a collector.
    pub fn add_collector(&mut self, collector: Box<dyn EntropyCollector>) {
        self.collectors.push(Arc::from(collector));
    }

    pub fn collector_count(&self) -> usize {
        self.collectors.len()
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    /// Collect from every collector in parallel.
    ///
    /// Never fails: each collector that is unavailable, panics, returns
    /// nothing or misses the deadline contributes 32 random bytes instead.
    /// Output order follows registration order.
    pub fn collect_contributions(&self) -> Vec<EntropyContribution> {
        let n_bytes = self.config.collect_bytes;
        let timeout = self.config.collect_timeout();
        let mut slots: Vec<Option<CollectorOutput>> = vec![None; self.collectors.len()];
        let (tx, rx) = mpsc::channel::<(usize, Option<CollectorOutput>, Duration)>();

        let mut pending = 0usize;
        for (idx, collector) in self.collectors.iter().enumerate() {
            if !collector.is_available() {
                warn!("collector {} unavailable, substituting random bytes", collector.name());
                slots[idx] = Some(CollectorOutput::Fallback);
                continue;
            }
            let name = collector.name();
            let collector = Arc::clone(collector);
            let tx = tx.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("collector-{name}"))
                .spawn(move || {
                    let t0 = Instant::now();
                    let output = catch_unwind(AssertUnwindSafe(|| collector.collect(n_bytes))).ok();
                    let _ = tx.send((idx, output, t0.elapsed()));
                });
            match spawned {
                Ok(_) => pending += 1,
                Err(e) => {
                    error!("failed to spawn collector {name}: {e}");
                    slots[idx] = Some(CollectorOutput::Fallback);
                }
            }
        }
        drop(tx);

        let deadline = Instant::now() + timeout;
        while pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((idx, output, elapsed)) => {
                    pending -= 1;
                    let name = self.collectors[idx].name();
                    slots[idx] = Some(match output {
                        Some(out) => {
                            debug!("collector {name} finished in {:.3}s", elapsed.as_secs_f64());
                            out
                        }
                        None => {
                            error!("collector {name} panicked, substituting random bytes");
                            CollectorOutput::Fallback
                        }
                    });
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.collectors
            .iter()
            .zip(slots)
            .map(|(collector, slot)| {
                let output = match slot {
                    Some(out) => out,
                    None => {
                        warn!(
                            "collector {} missed the {:.1}s deadline, substituting random bytes",
                            collector.name(),
                            timeout.as_secs_f64()
                        );
                        CollectorOutput::Fallback
                    }
                };
                if output == CollectorOutput::Fallback {
                    debug!("collector {}: fallback bytes used", collector.name());
                }
                EntropyContribution::new(collector.name(), normalize(output))
            })
            .collect()
    }

    /// Collect from the registered collectors and run a full round.
    pub fn run_round(&self) -> Result<RoundRecord, RoundError> {
        if self.collectors.is_empty() {
            return Err(RoundError::NoCollectors);
        }
        let contributions = self.collect_contributions();
        self.run_round_with(contributions)
    }

    /// Run a full round over already-collected contributions.
    pub fn run_round_with(&self, contributions: Vec<EntropyContribution>) -> Result<RoundRecord, RoundError> {
        self.execute(contributions, |_| {})
    }

    /// Round body. `intercept` sees the reveal between disclosure and
    /// verification, the window in which a dishonest node could swap it.
    pub(crate) fn execute<F>(
        &self,
        contributions: Vec<EntropyContribution>,
        intercept: F,
    ) -> Result<RoundRecord, RoundError>
    where
        F: FnOnce(&mut Reveal),
    {
        if contributions.is_empty() {
            return Err(RoundError::NoCollectors);
        }
        let config = &self.config;
        let round_id = config.resolve_round_id();
        info!("round {round_id}: {} contributions", contributions.len());

        let contributions: Vec<EntropyContribution> = contributions
            .into_iter()
            .map(|c| EntropyContribution::new(c.source_id, normalize(CollectorOutput::Bytes(c.raw_bytes))))
            .collect();

        // Commit / reveal
        let e = entropy_digest(contributions.iter().map(|c| c.raw_bytes.as_slice()));
        let mut session = CommitmentSession::build(config.node_id.clone(), round_id.clone(), e)?;
        let commitment = session.commit()?;
        debug!("round {round_id}: node {} committed {}", config.node_id, hex::encode(commitment));

        let mut reveal = session.reveal()?;
        intercept(&mut reveal);
        if let Err(e) = reveal.check().and_then(|_| session.verify(&reveal)) {
            error!("round {round_id} aborted: {e}");
            return Err(e.into());
        }

        // Mix
        let mut input = MixInput::new(contributions.iter().map(|c| c.raw_bytes.clone()))
            .with_round_id(round_id.clone())
            .with_prev_hash(config.prev_root_hash.clone());
        if let Some(salt) = config.salt_bytes() {
            input = input.with_salt(salt);
        }
        let seed = mix(input)?;
        debug!("round {round_id}: seed {}", seed.final_hash_hex());

        // Screen
        let mut detections = Vec::with_capacity(contributions.len());
        for c in &contributions {
            let previous = self.previous.get(&c.source_id).map(Vec::as_slice);
            let result = detect_with(&c.raw_bytes, previous, &config.detector);
            if result.cheated {
                warn!(
                    "round {round_id}: contribution from {} flagged: {}",
                    c.source_id,
                    result.reason.as_deref().unwrap_or("unspecified")
                );
            }
            detections.push(SourceDetection {
                source_id: c.source_id.clone(),
                result,
            });
        }

        // Score and reward
        let options = ScoreOptions {
            prior_rounds: self.prior_rounds.clone(),
            ..config.scoring.clone()
        };
        let buffers: Vec<&[u8]> = contributions.iter().map(|c| c.raw_bytes.as_slice()).collect();
        let breakdown = score(&buffers, &options);
        let reward = compute_reward(i64::from(breakdown.score));

        info!(
            "round {round_id}: score {} ({}), awarded {} tokens ({})",
            breakdown.score, breakdown.category, reward.tokens, reward.bracket
        );

        Ok(RoundRecord {
            round_id,
            prev_root_hash: config.prev_root_hash.clone(),
            timestamp: Utc::now(),
            reveals: vec![reveal.public()],
            r_round: seed.final_hash_hex(),
            awarded: reward.tokens,
            reward_bracket: reward.bracket,
            score: breakdown,
            detections,
            shuffled_order: seed.shuffled_order,
        })
    }
}
