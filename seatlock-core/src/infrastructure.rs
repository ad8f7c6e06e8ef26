use crate::error::{ExportError, ReservationError};
use crate::state::ExpiryCheck;
use crate::types::{Booking, LockGrant, Principal, SeatStatus, Snapshot, UnlockOutcome};

/// Contract for the seat registry behind a reservation manager.
///
/// Implementations are plain synchronous state; the manager provides the
/// mutual exclusion and the timers.
pub trait SeatStore {
    /// Lock a seat for `user_id` until `now + duration_ms`
    fn lock(
        &mut self,
        seat_id: &str,
        user_id: &str,
        now: u64,
        duration_ms: u64,
    ) -> Result<LockGrant, ReservationError>;

    /// Turn the caller's live lock into a booking
    fn confirm(&mut self, seat_id: &str, user_id: &str, now: u64)
        -> Result<Booking, ReservationError>;

    /// Release a lock early
    fn unlock(
        &mut self,
        seat_id: &str,
        principal: &Principal,
    ) -> Result<UnlockOutcome, ReservationError>;

    /// Expiry timer callback for the lock that had `captured_deadline`
    fn expire(&mut self, seat_id: &str, captured_deadline: u64, now: u64) -> ExpiryCheck;

    /// Reclaim every lapsed lock. Returns the ids of the seats released.
    fn sweep_expired(&mut self, now: u64) -> Vec<String>;

    fn status(&self, seat_id: &str) -> Option<&SeatStatus>;

    fn snapshot(&self, now: u64) -> Snapshot;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Destination for exported snapshots. Write-only: nothing is read back.
pub trait SnapshotSink {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), ExportError>;
}
