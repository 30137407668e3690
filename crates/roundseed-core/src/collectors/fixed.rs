//! FixedCollector: replays a preset output every round.

use crate::source::{CollectorInfo, CollectorKind, CollectorOutput, EntropyCollector};

/// Collector returning the same output on every call.
#[derive(Debug, Clone)]
pub struct FixedCollector {
    info: CollectorInfo,
    output: CollectorOutput,
}

impl FixedCollector {
    pub fn new(name: &'static str, output: impl Into<CollectorOutput>) -> Self {
        Self {
            info: CollectorInfo {
                name,
                description: "fixed replayed output",
                kind: CollectorKind::Fixed,
            },
            output: output.into(),
        }
    }
}

impl EntropyCollector for FixedCollector {
    fn info(&self) -> &CollectorInfo {
        &self.info
    }

    fn is_available(&self) -> bool {
        true
    }

    fn collect(&self, _n_bytes: usize) -> CollectorOutput {
        self.output.clone()
    }
}
