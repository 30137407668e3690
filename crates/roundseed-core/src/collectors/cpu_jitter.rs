//! CpuJitterCollector: timing jitter of repeated cheap syscalls.
//!
//! **Raw output characteristics:** XOR-folded timing deltas, handed over as
//! lowercase hex text. Shannon entropy typically 5-7 bits/byte; lower on
//! machines with a coarse clock.

use crate::source::{CollectorInfo, CollectorKind, CollectorOutput, EntropyCollector};

use super::helpers::{extract_timing_entropy, mono_nanos};

/// Minimum number of timed calls per collection.
const JITTER_ROUNDS: usize = 256;

static CPU_JITTER_INFO: CollectorInfo = CollectorInfo {
    name: "cpu",
    description: "Timing jitter of repeated getpid() syscalls",
    kind: CollectorKind::Timing,
};

/// Entropy collector that times `getpid()` calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuJitterCollector;

#[cfg(unix)]
fn timed_call() {
    // SAFETY: getpid() is always safe: it is a read-only syscall.
    unsafe {
        libc::getpid();
    }
}

#[cfg(not(unix))]
fn timed_call() {
    std::hint::black_box(std::process::id());
}

fn collect_jitter(n_bytes: usize) -> Vec<u8> {
    let rounds = JITTER_ROUNDS.max(n_bytes + 2);
    let mut timings = Vec::with_capacity(rounds);
    for _ in 0..rounds {
        timed_call();
        timings.push(mono_nanos());
    }
    extract_timing_entropy(&timings, n_bytes)
}

impl EntropyCollector for CpuJitterCollector {
    fn info(&self) -> &CollectorInfo {
        &CPU_JITTER_INFO
    }

    fn is_available(&self) -> bool {
        true
    }

    fn collect(&self, n_bytes: usize) -> CollectorOutput {
        let raw = collect_jitter(n_bytes);
        if raw.is_empty() {
            return CollectorOutput::Fallback;
        }
        CollectorOutput::HexText(hex::encode(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_hex_of_requested_length() {
        match CpuJitterCollector.collect(32) {
            CollectorOutput::HexText(h) => {
                assert_eq!(h.len(), 64);
                assert!(crate::normalize::is_lower_hex(&h));
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    #[ignore] // Run with: cargo test -- --ignored
    fn jitter_is_not_constant() {
        let raw = collect_jitter(512);
        let distinct = raw.iter().collect::<std::collections::HashSet<_>>().len();
        assert!(distinct > 4, "only {distinct} distinct bytes");
    }
}
