//! Collector trait and the closed set of shapes a collector may return.
//!
//! Every entropy collector implements [`EntropyCollector`], which provides
//! metadata via [`CollectorInfo`], availability checking, and one collection
//! call returning a [`CollectorOutput`].

/// Kind of signal a collector harvests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectorKind {
    /// Operating-system CSPRNG.
    Crypto,
    /// CPU/scheduler timing jitter.
    Timing,
    /// Human interaction (keyboard, pointer).
    Interaction,
    /// Fixed replayed data.
    Fixed,
}

impl std::fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Crypto => write!(f, "crypto"),
            Self::Timing => write!(f, "timing"),
            Self::Interaction => write!(f, "interaction"),
            Self::Fixed => write!(f, "fixed"),
        }
    }
}

/// Metadata about a collector.
#[derive(Debug, Clone)]
pub struct CollectorInfo {
    /// Unique identifier, used as the contribution's `source_id` (e.g. `"crypto"`).
    pub name: &'static str,
    /// One-line human-readable description.
    pub description: &'static str,
    /// Signal kind.
    pub kind: CollectorKind,
}

/// What a collector hands back for one round.
///
/// The adapter inside each collector decides the variant, so the normalizer
/// never has to sniff shapes at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorOutput {
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Lowercase hex text; decoded to binary when well-formed.
    HexText(String),
    /// Arbitrary text, taken as UTF-8 bytes.
    Text(String),
    /// No data. Normalization substitutes 32 random bytes.
    Fallback,
}

impl From<Vec<u8>> for CollectorOutput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for CollectorOutput {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// Trait that every entropy collector must implement.
pub trait EntropyCollector: Send + Sync {
    /// Collector metadata.
    fn info(&self) -> &CollectorInfo;

    /// Check if this collector can operate on the current machine.
    fn is_available(&self) -> bool;

    /// Collect up to `n_bytes` of entropy for one round.
    ///
    /// Implementations keep their own time budget. A panic here is caught by
    /// the orchestrator and treated the same as [`CollectorOutput::Fallback`].
    fn collect(&self, n_bytes: usize) -> CollectorOutput;

    /// Convenience: name from info.
    fn name(&self) -> &'static str {
        self.info().name
    }
}

/// One collector's normalized output for a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntropyContribution {
    pub source_id: String,
    pub raw_bytes: Vec<u8>,
}

impl EntropyContribution {
    pub fn new(source_id: impl Into<String>, raw_bytes: Vec<u8>) -> Self {
        Self {
            source_id: source_id.into(),
            raw_bytes,
        }
    }
}
