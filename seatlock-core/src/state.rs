//! Single-seat state machine.
//!
//! `Available -> Locked -> Booked`, with `Locked -> Available` on expiry or
//! unlock. Every transition either succeeds completely or leaves the seat
//! untouched; the only mutation on a failure path is reclaiming a lock whose
//! deadline has already passed.

use crate::error::{ConflictReason, DeniedAction, ReservationError};
use crate::types::{Booking, LockGrant, Principal, SeatStatus, SeatView, UnlockOutcome};

/// What an expiry timer found when it fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryCheck {
    /// The lock it was armed for lapsed and the seat is available again
    Released,
    /// Same lock, but the deadline is still ahead (timer fired early)
    NotDue { remaining_ms: u64 },
    /// The seat moved on; nothing to do
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    id: String,
    status: SeatStatus,
}

impl Seat {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: SeatStatus::Available,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> &SeatStatus {
        &self.status
    }

    pub fn view(&self) -> SeatView {
        SeatView::from(&self.status)
    }

    /// Resets a lock whose deadline is at or before `now`.
    /// Returns the owner who lost it.
    pub fn reclaim_if_expired(&mut self, now: u64) -> Option<String> {
        if !self.status.is_due(now) {
            return None;
        }
        std::mem::replace(&mut self.status, SeatStatus::Available).into_owner()
    }

    pub fn lock(
        &mut self,
        user_id: &str,
        now: u64,
        duration_ms: u64,
    ) -> Result<LockGrant, ReservationError> {
        if user_id.is_empty() {
            return Err(ReservationError::InvalidRequest {
                reason: "user id must not be empty".to_string(),
            });
        }

        self.reclaim_if_expired(now);

        match &self.status {
            SeatStatus::Booked { .. } => Err(self.conflict(ConflictReason::AlreadyBooked)),
            SeatStatus::Locked { .. } => Err(self.conflict(ConflictReason::LockedByOther)),
            SeatStatus::Available => {
                let expires_at = now.saturating_add(duration_ms);
                self.status = SeatStatus::Locked {
                    owner: user_id.to_string(),
                    expires_at,
                };
                Ok(LockGrant {
                    seat_id: self.id.clone(),
                    owner: user_id.to_string(),
                    expires_at,
                })
            }
        }
    }

    pub fn confirm(&mut self, user_id: &str, now: u64) -> Result<Booking, ReservationError> {
        let deadline = match &self.status {
            SeatStatus::Booked { .. } => return Err(self.conflict(ConflictReason::AlreadyBooked)),
            SeatStatus::Available => {
                return Err(ReservationError::InvalidState {
                    seat_id: self.id.clone(),
                });
            }
            SeatStatus::Locked { owner, expires_at } => {
                if owner != user_id {
                    return Err(ReservationError::Forbidden {
                        seat_id: self.id.clone(),
                        action: DeniedAction::Confirm,
                    });
                }
                *expires_at
            }
        };

        if self.reclaim_if_expired(now).is_some() {
            return Err(ReservationError::Expired {
                seat_id: self.id.clone(),
                expired_at: deadline,
            });
        }

        self.status = SeatStatus::Booked {
            owner: user_id.to_string(),
        };
        Ok(Booking {
            seat_id: self.id.clone(),
            owner: user_id.to_string(),
        })
    }

    /// Clears a lock held by `principal` (or any lock, for an admin).
    /// A seat that is available or booked is left as is.
    pub fn unlock(&mut self, principal: &Principal) -> Result<UnlockOutcome, ReservationError> {
        if let Some(owner) = self.status.owner() {
            if !principal.may_release(owner) {
                return Err(ReservationError::Forbidden {
                    seat_id: self.id.clone(),
                    action: DeniedAction::Unlock,
                });
            }
        }

        let previous_owner = match self.status {
            SeatStatus::Locked { .. } => {
                std::mem::replace(&mut self.status, SeatStatus::Available).into_owner()
            }
            _ => None,
        };

        Ok(UnlockOutcome {
            seat_id: self.id.clone(),
            released: previous_owner.is_some(),
            previous_owner,
        })
    }

    /// Expiry timer callback. Acts only if the seat still holds the lock
    /// whose deadline the timer captured.
    pub fn expire(&mut self, captured_deadline: u64, now: u64) -> ExpiryCheck {
        match self.status.expires_at() {
            Some(deadline) if deadline == captured_deadline => {
                if self.reclaim_if_expired(now).is_some() {
                    ExpiryCheck::Released
                } else {
                    ExpiryCheck::NotDue {
                        remaining_ms: deadline.saturating_sub(now),
                    }
                }
            }
            _ => ExpiryCheck::Stale,
        }
    }

    fn conflict(&self, reason: ConflictReason) -> ReservationError {
        ReservationError::Conflict {
            seat_id: self.id.clone(),
            reason,
            held_by: match reason {
                ConflictReason::LockedByOther => self.status.owner().map(str::to_string),
                ConflictReason::AlreadyBooked => None,
            },
            expires_at: self.status.expires_at(),
        }
    }
}
