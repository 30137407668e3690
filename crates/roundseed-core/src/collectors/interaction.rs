//! Keyboard and pointer interaction collectors.
//!
//! Each collector is an owned instance with an explicit capture window:
//! `start()` opens it, `stop()` closes it and reports how many events were
//! captured. Outside a window `collect` returns [`CollectorOutput::Fallback`].
//!
//! No input devices are read directly. While a window is open, events are
//! synthesized from scheduler timing so the collectors behave like real
//! interaction sources (bursty, low-entropy per event) in headless runs.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use sha2::{Digest, Sha256};

use crate::source::{CollectorInfo, CollectorKind, CollectorOutput, EntropyCollector};

use super::helpers::{mono_nanos, xor_fold_u64};

/// Capture window shared by both interaction collectors.
#[derive(Debug, Default)]
struct CaptureWindow {
    opened_at: Mutex<Option<Instant>>,
    events: AtomicU64,
}

impl CaptureWindow {
    fn start(&self) {
        let mut opened = self.opened_at.lock().unwrap_or_else(|e| e.into_inner());
        if opened.is_none() {
            *opened = Some(Instant::now());
            self.events.store(0, Ordering::Relaxed);
        }
    }

    fn stop(&self) -> u64 {
        let mut opened = self.opened_at.lock().unwrap_or_else(|e| e.into_inner());
        *opened = None;
        self.events.load(Ordering::Relaxed)
    }

    fn is_open(&self) -> bool {
        self.opened_at
            .lock()
            .map(|o| o.is_some())
            .unwrap_or(false)
    }

    fn record(&self, n: u64) {
        self.events.fetch_add(n, Ordering::Relaxed);
    }
}

/// One synthesized inter-event interval in nanoseconds.
fn event_interval() -> u64 {
    let t0 = mono_nanos();
    std::thread::yield_now();
    mono_nanos().wrapping_sub(t0)
}

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

static KEYBOARD_INFO: CollectorInfo = CollectorInfo {
    name: "keyboard",
    description: "Inter-keystroke timing during a capture window",
    kind: CollectorKind::Interaction,
};

/// Keystroke-timing collector. Emits one byte per keystroke interval.
#[derive(Debug, Default)]
pub struct KeyboardCollector {
    window: CaptureWindow,
}

impl KeyboardCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Started collector, ready to capture.
    pub fn started() -> Self {
        let c = Self::new();
        c.start();
        c
    }

    pub fn start(&self) {
        self.window.start();
    }

    /// Close the window; returns events captured since `start`.
    pub fn stop(&self) -> u64 {
        self.window.stop()
    }

    pub fn is_capturing(&self) -> bool {
        self.window.is_open()
    }
}

impl EntropyCollector for KeyboardCollector {
    fn info(&self) -> &CollectorInfo {
        &KEYBOARD_INFO
    }

    fn is_available(&self) -> bool {
        true
    }

    fn collect(&self, n_bytes: usize) -> CollectorOutput {
        if !self.window.is_open() || n_bytes == 0 {
            return CollectorOutput::Fallback;
        }
        let bytes: Vec<u8> = (0..n_bytes).map(|_| xor_fold_u64(event_interval())).collect();
        self.window.record(n_bytes as u64);
        CollectorOutput::Bytes(bytes)
    }
}

// ---------------------------------------------------------------------------
// Mouse
// ---------------------------------------------------------------------------

static MOUSE_INFO: CollectorInfo = CollectorInfo {
    name: "mouse",
    description: "Pointer movement path during a capture window, SHA-256 digested",
    kind: CollectorKind::Interaction,
};

/// Pointer events gathered per output byte.
const EVENTS_PER_BYTE: usize = 4;

/// Pointer-movement collector.
///
/// Events are `(x, y, t)` triples; the path is digested in counter mode and
/// handed over as hex text.
#[derive(Debug, Default)]
pub struct MouseCollector {
    window: CaptureWindow,
}

impl MouseCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started() -> Self {
        let c = Self::new();
        c.start();
        c
    }

    pub fn start(&self) {
        self.window.start();
    }

    pub fn stop(&self) -> u64 {
        self.window.stop()
    }

    pub fn is_capturing(&self) -> bool {
        self.window.is_open()
    }
}

fn pointer_path(n_events: usize) -> Vec<u8> {
    let (mut x, mut y) = (640i32, 360i32);
    let mut path = Vec::with_capacity(n_events * 16);
    for _ in 0..n_events {
        let dt = event_interval();
        x = (x + (dt & 0x0f) as i32 - 8).clamp(0, 1919);
        y = (y + ((dt >> 4) & 0x0f) as i32 - 8).clamp(0, 1079);
        path.extend_from_slice(&(x as u16).to_le_bytes());
        path.extend_from_slice(&(y as u16).to_le_bytes());
        path.extend_from_slice(&mono_nanos().to_le_bytes());
    }
    path
}

impl EntropyCollector for MouseCollector {
    fn info(&self) -> &CollectorInfo {
        &MOUSE_INFO
    }

    fn is_available(&self) -> bool {
        true
    }

    fn collect(&self, n_bytes: usize) -> CollectorOutput {
        if !self.window.is_open() || n_bytes == 0 {
            return CollectorOutput::Fallback;
        }
        let n_events = n_bytes * EVENTS_PER_BYTE;
        let path = pointer_path(n_events);
        self.window.record(n_events as u64);

        let mut out = Vec::with_capacity(n_bytes + 32);
        let mut counter: u64 = 0;
        while out.len() < n_bytes {
            let mut h = Sha256::new();
            h.update(&path);
            h.update(counter.to_le_bytes());
            out.extend_from_slice(&h.finalize());
            counter += 1;
        }
        out.truncate(n_bytes);
        CollectorOutput::HexText(hex::encode(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_falls_back_outside_window() {
        let k = KeyboardCollector::new();
        assert!(!k.is_capturing());
        assert_eq!(k.collect(16), CollectorOutput::Fallback);
    }

    #[test]
    fn keyboard_counts_events_until_stop() {
        let k = KeyboardCollector::started();
        assert!(matches!(k.collect(16), CollectorOutput::Bytes(ref b) if b.len() == 16));
        assert!(matches!(k.collect(8), CollectorOutput::Bytes(_)));
        assert_eq!(k.stop(), 24);
        assert_eq!(k.collect(16), CollectorOutput::Fallback);
    }

    #[test]
    fn restart_resets_count() {
        let k = KeyboardCollector::started();
        let _ = k.collect(4);
        k.stop();
        k.start();
        assert_eq!(k.stop(), 0);
    }

    #[test]
    fn mouse_returns_hex_digest() {
        let m = MouseCollector::started();
        match m.collect(40) {
            CollectorOutput::HexText(h) => assert_eq!(h.len(), 80),
            other => panic!("unexpected output: {other:?}"),
        }
        assert_eq!(m.stop(), 160);
    }

    #[test]
    fn mouse_falls_back_when_stopped() {
        let m = MouseCollector::new();
        assert_eq!(m.collect(32), CollectorOutput::Fallback);
    }
}
