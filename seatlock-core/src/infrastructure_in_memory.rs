use crate::error::ReservationError;
use crate::infrastructure::SeatStore;
use crate::state::{ExpiryCheck, Seat};
use crate::types::{Booking, LockGrant, Principal, SeatStatus, Snapshot, UnlockOutcome};
use std::collections::HashMap;

/// Fixed set of seats held in memory. The id set never changes after
/// construction.
pub struct InMemorySeatStore {
    // Map of Seat ID -> Seat
    seats: HashMap<String, Seat>,
}

impl InMemorySeatStore {
    /// Creates one available seat per id. Duplicate ids collapse into one seat.
    pub fn new<I, S>(seat_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let seats = seat_ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                (id.clone(), Seat::new(id))
            })
            .collect();
        Self { seats }
    }

    /// Seats "1" through `count`
    pub fn with_numbered_seats(count: usize) -> Self {
        Self::new((1..=count).map(|n| n.to_string()))
    }

    fn seat_mut(&mut self, seat_id: &str) -> Result<&mut Seat, ReservationError> {
        self.seats
            .get_mut(seat_id)
            .ok_or_else(|| ReservationError::not_found(seat_id))
    }
}

impl SeatStore for InMemorySeatStore {
    fn lock(
        &mut self,
        seat_id: &str,
        user_id: &str,
        now: u64,
        duration_ms: u64,
    ) -> Result<LockGrant, ReservationError> {
        self.seat_mut(seat_id)?.lock(user_id, now, duration_ms)
    }

    fn confirm(
        &mut self,
        seat_id: &str,
        user_id: &str,
        now: u64,
    ) -> Result<Booking, ReservationError> {
        self.seat_mut(seat_id)?.confirm(user_id, now)
    }

    fn unlock(
        &mut self,
        seat_id: &str,
        principal: &Principal,
    ) -> Result<UnlockOutcome, ReservationError> {
        self.seat_mut(seat_id)?.unlock(principal)
    }

    fn expire(&mut self, seat_id: &str, captured_deadline: u64, now: u64) -> ExpiryCheck {
        match self.seats.get_mut(seat_id) {
            Some(seat) => seat.expire(captured_deadline, now),
            None => ExpiryCheck::Stale,
        }
    }

    fn sweep_expired(&mut self, now: u64) -> Vec<String> {
        let mut released = Vec::new();
        for seat in self.seats.values_mut() {
            if seat.reclaim_if_expired(now).is_some() {
                released.push(seat.id().to_string());
            }
        }
        released.sort();
        released
    }

    fn status(&self, seat_id: &str) -> Option<&SeatStatus> {
        self.seats.get(seat_id).map(Seat::status)
    }

    fn snapshot(&self, now: u64) -> Snapshot {
        Snapshot {
            taken_at: now,
            seats: self
                .seats
                .values()
                .map(|seat| (seat.id().to_string(), seat.view()))
                .collect(),
        }
    }

    fn len(&self) -> usize {
        self.seats.len()
    }
}
