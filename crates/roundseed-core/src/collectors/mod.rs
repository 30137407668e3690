//! Built-in entropy collectors.

pub mod helpers;

pub mod cpu_jitter;
pub mod fixed;
pub mod interaction;
pub mod os_random;

pub use cpu_jitter::CpuJitterCollector;
pub use fixed::FixedCollector;
pub use interaction::{KeyboardCollector, MouseCollector};
pub use os_random::OsRandomCollector;

use crate::source::EntropyCollector;

/// Default collector set: mouse, keyboard, cpu and crypto.
///
/// Interaction collectors come back already started so a headless round
/// still gets data from them.
pub fn default_collectors() -> Vec<Box<dyn EntropyCollector>> {
    vec![
        Box::new(MouseCollector::started()),
        Box::new(KeyboardCollector::started()),
        Box::new(CpuJitterCollector),
        Box::new(OsRandomCollector),
    ]
}
