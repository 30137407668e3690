//! Timing primitives shared by the jitter-based collectors.

use std::sync::OnceLock;
use std::time::Instant;

/// Monotonic nanoseconds since a process-local epoch.
pub fn mono_nanos() -> u64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_nanos() as u64
}

/// XOR-fold all 8 bytes of a `u64` into one byte.
#[inline]
pub fn xor_fold_u64(v: u64) -> u8 {
    let b = v.to_le_bytes();
    b[0] ^ b[1] ^ b[2] ^ b[3] ^ b[4] ^ b[5] ^ b[6] ^ b[7]
}

/// Extract entropy bytes from raw timestamps.
///
/// Consecutive deltas are XORed pairwise and each result is XOR-folded into
/// one byte. Returns at most `n_bytes`; needs at least 3 timestamps to
/// produce anything.
pub fn extract_timing_entropy(timings: &[u64], n_bytes: usize) -> Vec<u8> {
    if timings.len() < 3 {
        return Vec::new();
    }
    let deltas: Vec<u64> = timings
        .windows(2)
        .map(|w| w[1].wrapping_sub(w[0]))
        .collect();
    let mut raw: Vec<u8> = deltas
        .windows(2)
        .map(|w| xor_fold_u64(w[0] ^ w[1]))
        .collect();
    raw.truncate(n_bytes);
    raw
}
