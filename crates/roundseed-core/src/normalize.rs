//! Coerces collector output into one canonical byte buffer.
//!
//! Normalization never fails: anything unusable becomes 32 bytes from the OS
//! CSPRNG so a round always has something to mix.

use crate::source::CollectorOutput;

/// Fixed contribution width in bytes (64 hex characters).
pub const FIXED_WIDTH: usize = 32;

/// Size of the random substitute for missing or invalid data.
pub const FALLBACK_LEN: usize = 32;

/// Normalize one collector output to bytes.
///
/// - `Bytes`: passed through; empty becomes the random fallback.
/// - `HexText`: decoded when it is even-length lowercase hex, otherwise
///   treated as UTF-8 text.
/// - `Text`: UTF-8 bytes; empty becomes the random fallback.
/// - `Fallback`: random fallback.
pub fn normalize(output: CollectorOutput) -> Vec<u8> {
    match output {
        CollectorOutput::Bytes(bytes) if !bytes.is_empty() => bytes,
        CollectorOutput::HexText(text) => normalize_text(&text),
        CollectorOutput::Text(text) => normalize_text(&text),
        CollectorOutput::Bytes(_) | CollectorOutput::Fallback => random_fallback(),
    }
}

fn normalize_text(text: &str) -> Vec<u8> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return random_fallback();
    }
    if is_lower_hex(trimmed) {
        if let Ok(bytes) = hex::decode(trimmed) {
            return bytes;
        }
    }
    text.as_bytes().to_vec()
}

/// True for non-empty, even-length strings of `0-9a-f` only.
pub fn is_lower_hex(s: &str) -> bool {
    !s.is_empty()
        && s.len() % 2 == 0
        && s.bytes().all(|c| c.is_ascii_digit() || (b'a'..=b'f').contains(&c))
}

/// Zero-pad at the end or truncate to exactly `width` bytes.
pub fn fixed_width(bytes: &[u8], width: usize) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out.resize(width, 0);
    out
}

/// [`FALLBACK_LEN`] bytes from the OS CSPRNG.
pub fn random_fallback() -> Vec<u8> {
    let mut buf = vec![0u8; FALLBACK_LEN];
    fill_random(&mut buf);
    buf
}

/// Fill buffer with OS random bytes via the `getrandom` crate.
///
/// # Panics
/// Panics if the OS CSPRNG fails; that is a fatal platform issue.
pub(crate) fn fill_random(buf: &mut [u8]) {
    getrandom::fill(buf).expect("OS CSPRNG failed");
}
