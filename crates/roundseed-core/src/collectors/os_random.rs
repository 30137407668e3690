//! OsRandomCollector: bytes straight from the operating-system CSPRNG.

use crate::source::{CollectorInfo, CollectorKind, CollectorOutput, EntropyCollector};

static OS_RANDOM_INFO: CollectorInfo = CollectorInfo {
    name: "crypto",
    description: "Operating-system CSPRNG via getrandom",
    kind: CollectorKind::Crypto,
};

/// Collector backed by `getrandom`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandomCollector;

impl EntropyCollector for OsRandomCollector {
    fn info(&self) -> &CollectorInfo {
        &OS_RANDOM_INFO
    }

    fn is_available(&self) -> bool {
        let mut probe = [0u8; 1];
        getrandom::fill(&mut probe).is_ok()
    }

    fn collect(&self, n_bytes: usize) -> CollectorOutput {
        let mut buf = vec![0u8; n_bytes];
        match getrandom::fill(&mut buf) {
            Ok(()) => CollectorOutput::Bytes(buf),
            Err(e) => {
                log::warn!("crypto collector: getrandom failed: {e}");
                CollectorOutput::Fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_requested_length() {
        let c = OsRandomCollector;
        assert!(c.is_available());
        match c.collect(48) {
            CollectorOutput::Bytes(b) => assert_eq!(b.len(), 48),
            other => panic!("unexpected output: {other:?}"),
        }
    }
}
