//! Secure mixing of a round's contributions into one seed.
//!
//! Pipeline:
//! 1. Normalize every contribution to bytes, then pad or truncate it to
//!    [`FIXED_WIDTH`] bytes
//! 2. Fisher–Yates shuffle driven by a CSPRNG (unbiased `random_range`)
//! 3. Pre-image = salt || round id || previous hash || shuffled pieces
//! 4. SHA-256 of the pre-image is the round seed
//!
//! Only the contributions are permuted. The metadata prefix stays in fixed
//! position so the seed is bound to the round it was committed under.

use rand::{CryptoRng, Rng};

use crate::error::MixError;
use crate::hash::sha256;
use crate::normalize::{FIXED_WIDTH, fixed_width, is_lower_hex, normalize};
use crate::source::CollectorOutput;

/// Inputs to one mix.
#[derive(Debug, Clone, Default)]
pub struct MixInput {
    pub contributions: Vec<CollectorOutput>,
    pub salt: Option<Vec<u8>>,
    pub round_id: Option<String>,
    /// Previous round hash; lowercase hex is decoded, anything else is used as text.
    pub prev_hash: Option<String>,
}

impl MixInput {
    pub fn new<I, T>(contributions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<CollectorOutput>,
    {
        Self {
            contributions: contributions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn with_round_id(mut self, round_id: impl Into<String>) -> Self {
        self.round_id = Some(round_id.into());
        self
    }

    pub fn with_prev_hash(mut self, prev_hash: impl Into<String>) -> Self {
        self.prev_hash = Some(prev_hash.into());
        self
    }
}

/// Mixed output of a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSeed {
    pub final_hash: [u8; 32],
    /// Lowercase hex of each contribution in shuffled order.
    pub shuffled_order: Vec<String>,
    pub pre_image: Vec<u8>,
}

impl RoundSeed {
    pub fn final_hash_hex(&self) -> String {
        hex::encode(self.final_hash)
    }
}

/// In-place Fisher–Yates shuffle.
///
/// `random_range` rejection-samples, so every permutation is equally likely.
pub fn secure_shuffle<T, R>(items: &mut [T], rng: &mut R)
where
    R: Rng + CryptoRng,
{
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

fn metadata_bytes(value: &str) -> Vec<u8> {
    if is_lower_hex(value) {
        if let Ok(bytes) = hex::decode(value) {
            return bytes;
        }
    }
    value.as_bytes().to_vec()
}

/// Mix with the thread-local CSPRNG.
pub fn mix(input: MixInput) -> Result<RoundSeed, MixError> {
    mix_with_rng(input, &mut rand::rng())
}

/// Mix with a caller-supplied CSPRNG. Seeded generators make the
/// permutation, and therefore the seed, reproducible.
pub fn mix_with_rng<R>(input: MixInput, rng: &mut R) -> Result<RoundSeed, MixError>
where
    R: Rng + CryptoRng,
{
    if input.contributions.is_empty() {
        return Err(MixError::NoContributions);
    }

    let mut pieces: Vec<Vec<u8>> = input
        .contributions
        .into_iter()
        .map(|c| fixed_width(&normalize(c), FIXED_WIDTH))
        .collect();
    secure_shuffle(&mut pieces, rng);

    let mut pre_image = Vec::new();
    if let Some(salt) = &input.salt {
        pre_image.extend_from_slice(salt);
    }
    if let Some(round_id) = &input.round_id {
        pre_image.extend_from_slice(round_id.as_bytes());
    }
    if let Some(prev) = &input.prev_hash {
        pre_image.extend_from_slice(&metadata_bytes(prev));
    }
    for piece in &pieces {
        pre_image.extend_from_slice(piece);
    }

    Ok(RoundSeed {
        final_hash: sha256(&pre_image),
        shuffled_order: pieces.iter().map(hex::encode).collect(),
        pre_image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pieces(n: u8) -> Vec<Vec<u8>> {
        (0..n).map(|i| vec![i; 32]).collect()
    }

    #[test]
    fn test_empty_input_rejected() {
        let input = MixInput::new(Vec::<Vec<u8>>::new());
        assert_eq!(mix(input), Err(MixError::NoContributions));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let make = || {
            MixInput::new(pieces(8))
                .with_round_id("round-1")
                .with_prev_hash("00".repeat(32))
        };
        let a = mix_with_rng(make(), &mut StdRng::seed_from_u64(42)).unwrap();
        let b = mix_with_rng(make(), &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unseeded_runs_differ() {
        let a = mix(MixInput::new(pieces(16))).unwrap();
        let b = mix(MixInput::new(pieces(16))).unwrap();
        assert_ne!(a.final_hash, b.final_hash);
    }

    #[test]
    fn test_pre_image_is_permutation_plus_metadata() {
        let input = MixInput::new(pieces(5))
            .with_salt(b"salt".to_vec())
            .with_round_id("r9")
            .with_prev_hash("abcd");
        let seed = mix(input).unwrap();

        let prefix = [b"salt".as_slice(), b"r9".as_slice(), &[0xabu8, 0xcd][..]].concat();
        assert!(seed.pre_image.starts_with(&prefix));
        assert_eq!(seed.pre_image.len(), prefix.len() + 5 * 32);

        let mut shuffled = seed.shuffled_order.clone();
        shuffled.sort();
        let mut expected: Vec<String> = pieces(5).iter().map(hex::encode).collect();
        expected.sort();
        assert_eq!(shuffled, expected);

        let body: Vec<u8> = seed
            .shuffled_order
            .iter()
            .flat_map(|h| hex::decode(h).unwrap())
            .collect();
        assert_eq!(&seed.pre_image[prefix.len()..], body.as_slice());
        assert_eq!(seed.final_hash, sha256(&seed.pre_image));
    }

    #[test]
    fn test_non_hex_prev_hash_used_as_text() {
        let seed = mix(MixInput::new(pieces(1)).with_prev_hash("genesis")).unwrap();
        assert!(seed.pre_image.starts_with(b"genesis"));
    }

    #[test]
    fn test_contributions_are_normalized() {
        let input = MixInput {
            contributions: vec![CollectorOutput::HexText("ff00".into())],
            ..MixInput::default()
        };
        let seed = mix(input).unwrap();
        let mut expected = vec![0xff, 0x00];
        expected.resize(FIXED_WIDTH, 0);
        assert_eq!(seed.pre_image, expected);
        assert_eq!(seed.shuffled_order, vec![format!("ff00{}", "00".repeat(30))]);
    }

    #[test]
    fn test_pieces_keep_their_boundaries() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sorted_pieces = |contributions: Vec<Vec<u8>>| {
            let seed = mix_with_rng(MixInput::new(contributions), &mut rng).unwrap();
            let mut sorted = seed.shuffled_order;
            sorted.sort();
            sorted
        };
        let a = sorted_pieces(vec![b"ab".to_vec(), b"c".to_vec()]);
        let b = sorted_pieces(vec![b"a".to_vec(), b"bc".to_vec()]);
        assert_ne!(a, b);
        assert!(a.iter().all(|h| h.len() == 2 * FIXED_WIDTH));
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut first_counts = [0u32; 4];
        for _ in 0..4000 {
            let mut v = [0usize, 1, 2, 3];
            secure_shuffle(&mut v, &mut rng);
            first_counts[v[0]] += 1;
        }
        for c in first_counts {
            assert!((800..1200).contains(&c), "skewed first-position counts: {first_counts:?}");
        }
    }
}
