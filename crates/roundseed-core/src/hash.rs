//! Capability-checked digest strategy.
//!
//! Callers name an algorithm and either get a digest or an explicit
//! [`HashError::Unavailable`]. Nothing silently falls back to a different
//! algorithm.

use std::str::FromStr;

use sha2::{Digest, Sha256, Sha512};

use crate::error::HashError;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256: commitments and the round seed.
    Sha256,
    /// SHA-512: per-node entropy digest `E`.
    Sha512,
    /// BLAKE3, 256-bit output.
    Blake3,
    /// Keccak-256. Not compiled into this build.
    Keccak256,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 4] = [Self::Sha256, Self::Sha512, Self::Blake3, Self::Keccak256];

    /// Whether this build can compute the algorithm.
    pub fn is_available(self) -> bool {
        !matches!(self, Self::Keccak256)
    }

    /// Digest length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            Self::Sha512 => 64,
            Self::Sha256 | Self::Blake3 | Self::Keccak256 => 32,
        }
    }

    /// Hash `data`, or fail if the algorithm is unavailable.
    pub fn digest(self, data: &[u8]) -> Result<Vec<u8>, HashError> {
        match self {
            Self::Sha256 => Ok(sha256(data).to_vec()),
            Self::Sha512 => Ok(sha512(data).to_vec()),
            Self::Blake3 => Ok(blake3::hash(data).as_bytes().to_vec()),
            Self::Keccak256 => Err(HashError::Unavailable("keccak256")),
        }
    }

    /// Lowercase hex digest.
    pub fn digest_hex(self, data: &[u8]) -> Result<String, HashError> {
        self.digest(data).map(hex::encode)
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Sha512 => write!(f, "sha512"),
            Self::Blake3 => write!(f, "blake3"),
            Self::Keccak256 => write!(f, "keccak256"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "").as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            "blake3" => Ok(Self::Blake3),
            "keccak256" | "keccak" => Ok(Self::Keccak256),
            other => Err(HashError::Unknown(other.to_string())),
        }
    }
}

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-512 of `data`.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(&Sha512::digest(data));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            HashAlgorithm::Sha256.digest_hex(b"abc").unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_output_lengths_match_digests() {
        for algo in HashAlgorithm::ALL.into_iter().filter(|a| a.is_available()) {
            assert_eq!(algo.digest(b"x").unwrap().len(), algo.output_len(), "{algo}");
        }
    }

    #[test]
    fn test_keccak_is_explicitly_unavailable() {
        let err = HashAlgorithm::Keccak256.digest(b"x").unwrap_err();
        assert_eq!(err, HashError::Unavailable("keccak256"));
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("blake3".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Blake3);
        assert!(matches!("md5".parse::<HashAlgorithm>(), Err(HashError::Unknown(_))));
    }

    #[test]
    fn test_hex_is_lowercase() {
        let h = HashAlgorithm::Sha512.digest_hex(b"round").unwrap();
        assert_eq!(h.len(), 128);
        assert!(h.chars().all(|c| !c.is_ascii_uppercase()));
    }
}
