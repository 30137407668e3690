//! Commit/reveal binding of a node's entropy to a round.
//!
//! ```text
//! Built ──commit()──▶ Committed ──verify(ok)──▶ Verified
//!                         │
//!                         └──verify(mismatch)──▶ Failed
//! ```
//!
//! The commitment is `SHA-256(E || secret || round_id)` where `E` is the
//! 512-bit digest of every normalized contribution of the node and `secret`
//! is 256 bits fresh from the OS CSPRNG. A mismatch on verify is the only
//! fatal condition in a round.

use serde::Serialize;

use crate::error::CommitError;
use crate::hash::{sha256, sha512};
use crate::normalize::{FIXED_WIDTH, fill_random, fixed_width};

/// Per-node entropy digest `E`: SHA-512 over the contributions in order,
/// each fixed to [`FIXED_WIDTH`] bytes first.
pub fn entropy_digest<'a, I>(contributions: I) -> [u8; 64]
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut buf = Vec::new();
    for c in contributions {
        buf.extend_from_slice(&fixed_width(c, FIXED_WIDTH));
    }
    sha512(&buf)
}

/// `SHA-256(E || secret || round_id)`.
pub fn compute_commitment(e: &[u8; 64], secret: &[u8; 32], round_id: &str) -> [u8; 32] {
    let mut pre = Vec::with_capacity(64 + 32 + round_id.len());
    pre.extend_from_slice(e);
    pre.extend_from_slice(secret);
    pre.extend_from_slice(round_id.as_bytes());
    sha256(&pre)
}

fn digests_equal(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Lifecycle state of a [`CommitmentSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitState {
    Built,
    Committed,
    Verified,
    Failed,
}

impl CommitState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Built => "built",
            Self::Committed => "committed",
            Self::Verified => "verified",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Failed)
    }
}

impl std::fmt::Display for CommitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Disclosed commitment opening.
///
/// Fields are public so a reveal can travel between processes; use
/// [`Reveal::check`] before trusting one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    pub node_id: String,
    pub round_id: String,
    pub e: [u8; 64],
    pub secret: [u8; 32],
    pub commitment: [u8; 32],
}

impl Reveal {
    /// Build a reveal, checking the commitment invariant up front.
    pub fn new(
        node_id: impl Into<String>,
        round_id: impl Into<String>,
        e: [u8; 64],
        secret: [u8; 32],
        commitment: [u8; 32],
    ) -> Result<Self, CommitError> {
        let reveal = Self {
            node_id: node_id.into(),
            round_id: round_id.into(),
            e,
            secret,
            commitment,
        };
        reveal.check()?;
        Ok(reveal)
    }

    /// Recompute the commitment and compare bit-for-bit.
    pub fn check(&self) -> Result<(), CommitError> {
        let recomputed = compute_commitment(&self.e, &self.secret, &self.round_id);
        if digests_equal(&recomputed, &self.commitment) {
            Ok(())
        } else {
            Err(CommitError::Mismatch {
                node_id: self.node_id.clone(),
                expected: hex::encode(self.commitment),
                actual: hex::encode(recomputed),
            })
        }
    }

    pub fn commitment_hex(&self) -> String {
        hex::encode(self.commitment)
    }

    pub fn e_hex(&self) -> String {
        hex::encode(self.e)
    }

    /// The public part that goes into a round record.
    pub fn public(&self) -> PublicCommit {
        PublicCommit {
            node_id: self.node_id.clone(),
            commit: self.commitment_hex(),
        }
    }
}

/// Commitment as published in a round record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct PublicCommit {
    pub node_id: String,
    pub commit: String,
}

/// One node's commit/reveal session for one round.
#[derive(Debug, Clone)]
pub struct CommitmentSession {
    node_id: String,
    round_id: String,
    e: [u8; 64],
    secret: [u8; 32],
    commitment: [u8; 32],
    state: CommitState,
}

impl CommitmentSession {
    /// Build a session with a fresh 256-bit secret.
    pub fn build(
        node_id: impl Into<String>,
        round_id: impl Into<String>,
        e: [u8; 64],
    ) -> Result<Self, CommitError> {
        let mut secret = [0u8; 32];
        fill_random(&mut secret);
        Self::build_with_secret(node_id, round_id, e, secret)
    }

    /// Build a session with a caller-chosen secret.
    pub fn build_with_secret(
        node_id: impl Into<String>,
        round_id: impl Into<String>,
        e: [u8; 64],
        secret: [u8; 32],
    ) -> Result<Self, CommitError> {
        let node_id = node_id.into();
        if node_id.trim().is_empty() {
            return Err(CommitError::EmptyNodeId);
        }
        let round_id = round_id.into();
        let commitment = compute_commitment(&e, &secret, &round_id);
        Ok(Self {
            node_id,
            round_id,
            e,
            secret,
            commitment,
            state: CommitState::Built,
        })
    }

    pub fn state(&self) -> CommitState {
        self.state
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn round_id(&self) -> &str {
        &self.round_id
    }

    fn transition(&mut self, expected: CommitState, to: CommitState) -> Result<(), CommitError> {
        if self.state != expected {
            return Err(CommitError::InvalidTransition {
                from: self.state.as_str(),
                to: to.as_str(),
            });
        }
        self.state = to;
        Ok(())
    }

    /// Record the commitment. Must happen before any reveal is disclosed.
    pub fn commit(&mut self) -> Result<[u8; 32], CommitError> {
        self.transition(CommitState::Built, CommitState::Committed)?;
        Ok(self.commitment)
    }

    /// Disclose the opening. Only valid once committed.
    pub fn reveal(&self) -> Result<Reveal, CommitError> {
        if self.state == CommitState::Built {
            return Err(CommitError::InvalidTransition {
                from: self.state.as_str(),
                to: "revealed",
            });
        }
        Reveal::new(
            self.node_id.clone(),
            self.round_id.clone(),
            self.e,
            self.secret,
            self.commitment,
        )
    }

    /// Check a disclosed reveal against the recorded commitment.
    ///
    /// Any mismatch moves the session to `Failed`.
    pub fn verify(&mut self, reveal: &Reveal) -> Result<(), CommitError> {
        if self.state != CommitState::Committed {
            return Err(CommitError::InvalidTransition {
                from: self.state.as_str(),
                to: CommitState::Verified.as_str(),
            });
        }
        let result = self.check_reveal(reveal);
        self.state = if result.is_ok() {
            CommitState::Verified
        } else {
            CommitState::Failed
        };
        result
    }

    fn check_reveal(&self, reveal: &Reveal) -> Result<(), CommitError> {
        if reveal.round_id != self.round_id {
            return Err(CommitError::RoundMismatch {
                node_id: reveal.node_id.clone(),
                expected_round: self.round_id.clone(),
                actual_round: reveal.round_id.clone(),
            });
        }
        let recomputed = compute_commitment(&reveal.e, &reveal.secret, &reveal.round_id);
        if digests_equal(&recomputed, &self.commitment) {
            Ok(())
        } else {
            Err(CommitError::Mismatch {
                node_id: reveal.node_id.clone(),
                expected: hex::encode(self.commitment),
                actual: hex::encode(recomputed),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn session() -> CommitmentSession {
        let e = entropy_digest([b"mouse".as_slice(), b"keyboard".as_slice()]);
        CommitmentSession::build_with_secret("node-1", "round-7", e, [3u8; 32]).unwrap()
    }

    #[test]
    fn test_happy_path_reaches_verified() {
        let mut s = session();
        assert_eq!(s.state(), CommitState::Built);
        s.commit().unwrap();
        let reveal = s.reveal().unwrap();
        s.verify(&reveal).unwrap();
        assert_eq!(s.state(), CommitState::Verified);
        assert!(s.state().is_terminal());
    }

    #[test]
    fn test_reveal_before_commit_rejected() {
        let s = session();
        assert!(matches!(s.reveal(), Err(CommitError::InvalidTransition { .. })));
    }

    #[test]
    fn test_double_commit_rejected() {
        let mut s = session();
        s.commit().unwrap();
        assert!(matches!(s.commit(), Err(CommitError::InvalidTransition { .. })));
    }

    #[test]
    fn test_tampered_secret_fails_and_is_terminal() {
        let mut s = session();
        s.commit().unwrap();
        let mut reveal = s.reveal().unwrap();
        reveal.secret[0] ^= 1;
        let err = s.verify(&reveal).unwrap_err();
        assert!(matches!(err, CommitError::Mismatch { .. }));
        assert_eq!(s.state(), CommitState::Failed);
        assert!(s.verify(&reveal).is_err());
    }

    #[test]
    fn test_reveal_new_checks_invariant() {
        let e = [1u8; 64];
        let secret = [2u8; 32];
        let good = compute_commitment(&e, &secret, "r");
        assert!(Reveal::new("n", "r", e, secret, good).is_ok());
        assert!(Reveal::new("n", "r", e, secret, [0u8; 32]).is_err());
    }

    #[test]
    fn test_empty_node_id_rejected() {
        assert_eq!(
            CommitmentSession::build("  ", "r", [0u8; 64]).unwrap_err(),
            CommitError::EmptyNodeId
        );
    }

    #[test]
    fn test_entropy_digest_is_512_bits_and_order_sensitive() {
        let a = entropy_digest([b"ab".as_slice(), b"cd".as_slice()]);
        let b = entropy_digest([b"cd".as_slice(), b"ab".as_slice()]);
        assert_eq!(hex::encode(a).len(), 128);
        assert_ne!(a, b);
    }

    #[test]
    fn test_entropy_digest_respects_piece_boundaries() {
        let a = entropy_digest([b"ab".as_slice(), b"c".as_slice()]);
        let b = entropy_digest([b"a".as_slice(), b"bc".as_slice()]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_entropy_digest_uses_fixed_width_pieces() {
        let long = [7u8; 40];
        assert_eq!(
            entropy_digest([long.as_slice()]),
            entropy_digest([&long[..FIXED_WIDTH]])
        );
        assert_eq!(
            entropy_digest([b"ab".as_slice()]),
            sha512(&fixed_width(b"ab", FIXED_WIDTH))
        );
    }

    #[test]
    fn test_fresh_secrets_differ() {
        let a = CommitmentSession::build("n", "r", [0u8; 64]).unwrap();
        let b = CommitmentSession::build("n", "r", [0u8; 64]).unwrap();
        assert_ne!(a.commitment, b.commitment);
    }

    proptest! {
        #[test]
        fn prop_commit_round_trip(
            e in proptest::collection::vec(any::<u8>(), 64),
            secret in any::<[u8; 32]>(),
            round_id in "[a-z0-9-]{0,24}",
        ) {
            let mut e_arr = [0u8; 64];
            e_arr.copy_from_slice(&e);
            let mut s = CommitmentSession::build_with_secret("node", round_id, e_arr, secret).unwrap();
            s.commit().unwrap();
            let reveal = s.reveal().unwrap();
            prop_assert!(s.verify(&reveal).is_ok());
        }

        #[test]
        fn prop_changing_any_field_fails(
            secret in any::<[u8; 32]>(),
            idx in 0usize..64,
            which in 0u8..3,
        ) {
            let e = [7u8; 64];
            let mut s = CommitmentSession::build_with_secret("node", "round", e, secret).unwrap();
            s.commit().unwrap();
            let mut reveal = s.reveal().unwrap();
            match which {
                0 => reveal.e[idx] ^= 0x80,
                1 => reveal.secret[idx % 32] ^= 0x01,
                _ => {
                    reveal.round_id.push('x');
                }
            }
            prop_assert!(s.verify(&reveal).is_err());
            prop_assert_eq!(s.state(), CommitState::Failed);
        }
    }
}
