//! Wall-clock milliseconds that advance with the tokio clock.

use std::time::{SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

/// Anchors wall-clock time once, then advances it by `tokio::time::Instant`.
///
/// Deadlines and expiry timers therefore share one notion of time, including
/// when the tokio clock is paused in tests.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeClock {
    anchor_ms: u64,
    anchor: Instant,
}

impl RuntimeClock {
    pub fn new() -> Self {
        let anchor_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self {
            anchor_ms,
            anchor: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.anchor_ms + self.anchor.elapsed().as_millis() as u64
    }
}

impl Default for RuntimeClock {
    fn default() -> Self {
        Self::new()
    }
}
