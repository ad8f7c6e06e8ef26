//! Seat reservation manager: the entry point the transport layer talks to.
//!
//! Wraps a [`SeatStore`] and the expiry timers behind one mutex. Every
//! operation runs to completion inside that critical section without
//! awaiting, so the check-then-set of lock, confirm and unlock is atomic with
//! respect to other calls and to the expiry timers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;

use crate::clock::RuntimeClock;
use crate::config::ReservationConfig;
use crate::error::{ConfigError, ReservationError};
use crate::infrastructure::SeatStore;
use crate::infrastructure_in_memory::InMemorySeatStore;
use crate::scheduler::{ExpiryJob, ExpiryTimers};
use crate::types::{AdminGrant, Booking, LockGrant, Principal, SeatState, Snapshot, UnlockOutcome};

/// State guarded by the manager's mutex
pub(crate) struct Shared {
    pub store: Box<dyn SeatStore + Send>,
    pub timers: ExpiryTimers,
}

impl Shared {
    /// Drops the seat's timer unless the seat is still locked.
    fn settle_timer(&mut self, seat_id: &str) {
        let locked = self
            .store
            .status(seat_id)
            .is_some_and(|status| status.state() == SeatState::Locked);
        if !locked {
            self.timers.cancel(seat_id);
        }
    }
}

/// Every operation leaves the registry consistent, so a panic on another
/// thread while holding the lock does not invalidate it.
pub(crate) fn lock_shared(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cloneable handle to one seat registry. Clones share the same seats.
#[derive(Clone)]
pub struct SeatReservationManager {
    shared: Arc<Mutex<Shared>>,
    config: Arc<ReservationConfig>,
    clock: RuntimeClock,
    runtime: Handle,
}

impl SeatReservationManager {
    /// Creates seats "1" through `config.seat_count`, all available.
    /// Must be called from within a tokio runtime, which runs the expiry timers.
    pub fn new(config: ReservationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let store = InMemorySeatStore::new(config.seat_ids());
        Self::with_store(config, store)
    }

    /// Creates a manager over an existing store.
    pub fn with_store(
        config: ReservationConfig,
        store: impl SeatStore + Send + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;

        tracing::debug!(
            seats = store.len(),
            lock_duration_ms = config.lock_duration_ms,
            "Seat registry initialized"
        );

        Ok(Self {
            shared: Arc::new(Mutex::new(Shared {
                store: Box::new(store),
                timers: ExpiryTimers::default(),
            })),
            config: Arc::new(config),
            clock: RuntimeClock::new(),
            runtime,
        })
    }

    pub fn config(&self) -> &ReservationConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Locks an available seat for `user_id` for the configured duration.
    pub fn lock(&self, seat_id: &str, user_id: &str) -> Result<LockGrant, ReservationError> {
        let mut shared = lock_shared(&self.shared);
        let now = self.clock.now_ms();

        match shared
            .store
            .lock(seat_id, user_id, now, self.config.lock_duration_ms)
        {
            Ok(grant) => {
                let job = ExpiryJob {
                    seat_id: grant.seat_id.clone(),
                    deadline: grant.expires_at,
                    grace: self.config.expiry_grace(),
                };
                let handle = job.spawn(&self.runtime, Arc::downgrade(&self.shared), self.clock);
                shared.timers.arm(seat_id, handle);

                tracing::debug!(
                    seat_id = %grant.seat_id,
                    owner = %grant.owner,
                    expires_at = grant.expires_at,
                    "Seat locked"
                );
                Ok(grant)
            }
            Err(err) => {
                // A lapsed lock may have been reclaimed before the failure
                shared.settle_timer(seat_id);
                Err(err)
            }
        }
    }

    /// Books a seat the caller currently holds a live lock on.
    pub fn confirm(&self, seat_id: &str, user_id: &str) -> Result<Booking, ReservationError> {
        let mut shared = lock_shared(&self.shared);
        let now = self.clock.now_ms();

        let result = shared.store.confirm(seat_id, user_id, now);
        shared.settle_timer(seat_id);

        match &result {
            Ok(booking) => {
                tracing::info!(seat_id = %booking.seat_id, owner = %booking.owner, "Seat booked")
            }
            Err(ReservationError::Expired { .. }) => {
                tracing::info!(seat_id = %seat_id, user_id = %user_id, "Confirm after lock expiry")
            }
            Err(_) => {}
        }
        result
    }

    /// Releases a lock early. Idempotent for authorized callers; never
    /// undoes a booking.
    pub fn unlock(
        &self,
        seat_id: &str,
        principal: &Principal,
    ) -> Result<UnlockOutcome, ReservationError> {
        let mut shared = lock_shared(&self.shared);

        let outcome = shared.store.unlock(seat_id, principal)?;
        shared.settle_timer(seat_id);

        if outcome.released {
            let previous_owner = outcome.previous_owner.as_deref().unwrap_or_default();
            if principal.is_admin() {
                tracing::warn!(seat_id = %seat_id, previous_owner = %previous_owner, "Lock force-released by admin");
            } else {
                tracing::debug!(seat_id = %seat_id, "Lock released by owner");
            }
        }
        Ok(outcome)
    }

    /// Reclaims every lock whose deadline has passed, without waiting for
    /// its timer. Returns the number of seats released.
    pub fn sweep_expired(&self) -> usize {
        let mut shared = lock_shared(&self.shared);
        let now = self.clock.now_ms();

        let released = shared.store.sweep_expired(now);
        for seat_id in &released {
            shared.timers.cancel(seat_id);
        }
        if !released.is_empty() {
            tracing::info!(released = released.len(), "Swept expired locks");
        }
        released.len()
    }

    /// Point-in-time view of all seats. Never reclaims lapsed locks.
    pub fn snapshot(&self) -> Snapshot {
        let shared = lock_shared(&self.shared);
        shared.store.snapshot(self.clock.now_ms())
    }

    /// Mints an admin grant if `key` matches the configured admin key.
    /// The comparison runs in constant time.
    pub fn authorize_admin(&self, key: &str) -> Option<AdminGrant> {
        let expected = self.config.admin_key()?;
        constant_time_eq::constant_time_eq(expected.as_bytes(), key.as_bytes())
            .then(AdminGrant::new)
    }

    /// Number of expiry timers currently armed
    pub fn pending_expiries(&self) -> usize {
        lock_shared(&self.shared).timers.len()
    }

    pub fn seat_count(&self) -> usize {
        lock_shared(&self.shared).store.len()
    }
}
