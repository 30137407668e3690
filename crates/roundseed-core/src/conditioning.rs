//! Byte-frequency statistics shared by the detector and the scorer.
//!
//! Every entropy figure in the crate comes from here so that the cheat
//! detector's entropy floor and the scorer's `entropy_norm` can never drift
//! apart.

/// Maximum Shannon entropy of byte data in bits/byte.
pub const MAX_BITS_PER_BYTE: f64 = 8.0;

/// Per-byte-value occurrence counts.
pub fn byte_histogram(data: &[u8]) -> [u64; 256] {
    let mut counts = [0u64; 256];
    for &b in data {
        counts[b as usize] += 1;
    }
    counts
}

/// Shannon entropy in bits/byte of a histogram covering `total` samples.
pub fn shannon_of_counts(counts: &[u64; 256], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    let mut h = 0.0;
    for &c in counts {
        if c > 0 {
            let p = c as f64 / n;
            h -= p * p.log2();
        }
    }
    h
}

/// Quick Shannon entropy in bits/byte for a byte slice.
pub fn quick_shannon(data: &[u8]) -> f64 {
    shannon_of_counts(&byte_histogram(data), data.len())
}

/// Count of the most frequent byte value.
pub fn max_byte_count(data: &[u8]) -> u64 {
    byte_histogram(data).iter().copied().max().unwrap_or(0)
}
