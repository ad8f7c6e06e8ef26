//! Per-seat expiry timers.
//!
//! Each locked seat owns at most one spawned timer task. Aborting the task
//! on relock, confirm or unlock is best effort: a timer that still fires
//! re-validates the captured deadline under the registry lock and does
//! nothing if the seat has moved on. Dropping the last manager handle drops
//! the timer table, which aborts every pending task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::clock::RuntimeClock;
use crate::manager::{Shared, lock_shared};
use crate::state::ExpiryCheck;

/// Abort handles of the pending expiry tasks, keyed by seat id
#[derive(Debug, Default)]
pub struct ExpiryTimers {
    handles: HashMap<String, AbortHandle>,
}

impl ExpiryTimers {
    /// Installs the timer for a fresh lock, aborting any previous one.
    pub fn arm(&mut self, seat_id: &str, handle: AbortHandle) {
        if let Some(previous) = self.handles.insert(seat_id.to_string(), handle) {
            previous.abort();
        }
    }

    /// Aborts the seat's pending timer. Returns whether one was pending.
    pub fn cancel(&mut self, seat_id: &str) -> bool {
        match self.handles.remove(seat_id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Forgets the handle of a timer that has just fired.
    pub fn disarm(&mut self, seat_id: &str) {
        self.handles.remove(seat_id);
    }

    pub fn is_armed(&self, seat_id: &str) -> bool {
        self.handles.contains_key(seat_id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for ExpiryTimers {
    fn drop(&mut self) {
        for handle in self.handles.values() {
            handle.abort();
        }
    }
}

/// What a timer captures when it is armed
#[derive(Debug, Clone)]
pub(crate) struct ExpiryJob {
    pub seat_id: String,
    pub deadline: u64,
    pub grace: Duration,
}

impl ExpiryJob {
    /// Spawns the timer on `runtime` to fire `grace` after the deadline.
    pub(crate) fn spawn(
        self,
        runtime: &Handle,
        shared: Weak<Mutex<Shared>>,
        clock: RuntimeClock,
    ) -> AbortHandle {
        let delay = Duration::from_millis(self.deadline.saturating_sub(clock.now_ms())) + self.grace;
        runtime.spawn(self.run(shared, clock, delay)).abort_handle()
    }

    pub(crate) async fn run(
        self,
        shared: Weak<Mutex<Shared>>,
        clock: RuntimeClock,
        mut delay: Duration,
    ) {
        loop {
            tokio::time::sleep(delay).await;

            // Registry gone: the manager was dropped
            let Some(shared) = shared.upgrade() else {
                return;
            };

            match self.fire(&shared, &clock) {
                ExpiryCheck::Released | ExpiryCheck::Stale => return,
                ExpiryCheck::NotDue { remaining_ms } => {
                    delay = Duration::from_millis(remaining_ms) + self.grace;
                }
            }
        }
    }

    fn fire(&self, shared: &Arc<Mutex<Shared>>, clock: &RuntimeClock) -> ExpiryCheck {
        let mut shared = lock_shared(shared);
        let check = shared
            .store
            .expire(&self.seat_id, self.deadline, clock.now_ms());

        if check == ExpiryCheck::Released {
            shared.timers.disarm(&self.seat_id);
            tracing::info!(seat_id = %self.seat_id, "Lock expired and released");
        }
        check
    }
}
