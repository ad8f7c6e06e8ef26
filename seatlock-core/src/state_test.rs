#[cfg(test)]
mod tests {
    use crate::error::{ConflictReason, DeniedAction, ReservationError};
    use crate::state::{ExpiryCheck, Seat};
    use crate::types::{AdminGrant, Principal, SeatState, SeatStatus};

    const MINUTE: u64 = 60_000;

    fn locked_seat(owner: &str, now: u64) -> Seat {
        let mut seat = Seat::new("1");
        seat.lock(owner, now, MINUTE).expect("seat starts available");
        seat
    }

    fn assert_invariants(seat: &Seat) {
        let view = seat.view();
        assert_eq!(
            view.owner.is_some(),
            matches!(view.state, SeatState::Locked | SeatState::Booked)
        );
        assert_eq!(view.expires_at.is_some(), view.state == SeatState::Locked);
    }

    #[test]
    fn test_lock_available_seat() {
        let mut seat = Seat::new("1");
        let grant = seat.lock("alice", 1000, MINUTE).unwrap();

        assert_eq!(grant.seat_id, "1");
        assert_eq!(grant.owner, "alice");
        assert_eq!(grant.expires_at, 1000 + MINUTE);
        assert_eq!(
            seat.status(),
            &SeatStatus::Locked {
                owner: "alice".to_string(),
                expires_at: 1000 + MINUTE
            }
        );
        assert_invariants(&seat);
    }

    #[test]
    fn test_lock_live_lock_conflicts_with_holder_details() {
        let mut seat = locked_seat("alice", 1000);

        let err = seat.lock("bob", 2000, MINUTE).unwrap_err();
        assert_eq!(
            err,
            ReservationError::Conflict {
                seat_id: "1".to_string(),
                reason: ConflictReason::LockedByOther,
                held_by: Some("alice".to_string()),
                expires_at: Some(1000 + MINUTE),
            }
        );
        assert_eq!(seat.status().owner(), Some("alice"));
    }

    #[test]
    fn test_relock_by_holder_does_not_extend() {
        let mut seat = locked_seat("alice", 1000);

        let err = seat.lock("alice", 2000, MINUTE).unwrap_err();
        assert_eq!(err.code(), "CONFLICT");
        assert_eq!(seat.status().expires_at(), Some(1000 + MINUTE));
    }

    #[test]
    fn test_lock_reclaims_lapsed_lock() {
        let mut seat = locked_seat("dave", 1000);

        // deadline == now counts as expired
        let grant = seat.lock("erin", 1000 + MINUTE, MINUTE).unwrap();
        assert_eq!(grant.owner, "erin");
        assert_eq!(grant.expires_at, 1000 + 2 * MINUTE);
        assert_invariants(&seat);
    }

    #[test]
    fn test_lock_booked_seat_conflicts() {
        let mut seat = locked_seat("alice", 1000);
        seat.confirm("alice", 2000).unwrap();

        let err = seat.lock("carol", 3000, MINUTE).unwrap_err();
        assert!(matches!(
            err,
            ReservationError::Conflict {
                reason: ConflictReason::AlreadyBooked,
                held_by: None,
                ..
            }
        ));
        assert_eq!(err.to_string(), "seat '1' is already booked");
    }

    #[test]
    fn test_lock_requires_user_id() {
        let mut seat = Seat::new("1");
        let err = seat.lock("", 1000, MINUTE).unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");
        assert_eq!(seat.status(), &SeatStatus::Available);
    }

    #[test]
    fn test_confirm_by_owner_books_seat() {
        let mut seat = locked_seat("alice", 1000);

        let booking = seat.confirm("alice", 5000).unwrap();
        assert_eq!(booking.owner, "alice");
        assert_eq!(
            seat.status(),
            &SeatStatus::Booked {
                owner: "alice".to_string()
            }
        );
        assert_invariants(&seat);
    }

    #[test]
    fn test_confirm_error_ladder() {
        let mut available = Seat::new("7");
        assert_eq!(
            available.confirm("alice", 1000).unwrap_err(),
            ReservationError::InvalidState {
                seat_id: "7".to_string()
            }
        );

        let mut seat = locked_seat("alice", 1000);
        assert_eq!(
            seat.confirm("bob", 2000).unwrap_err(),
            ReservationError::Forbidden {
                seat_id: "1".to_string(),
                action: DeniedAction::Confirm,
            }
        );

        seat.confirm("alice", 2000).unwrap();
        assert_eq!(seat.confirm("alice", 3000).unwrap_err().code(), "CONFLICT");
    }

    #[test]
    fn test_confirm_after_deadline_expires_and_resets() {
        let mut seat = locked_seat("alice", 1000);

        let err = seat.confirm("alice", 1000 + MINUTE).unwrap_err();
        assert_eq!(
            err,
            ReservationError::Expired {
                seat_id: "1".to_string(),
                expired_at: 1000 + MINUTE,
            }
        );
        assert_eq!(seat.status(), &SeatStatus::Available);
    }

    #[test]
    fn test_confirm_lapsed_lock_by_stranger_is_forbidden_and_untouched() {
        let mut seat = locked_seat("alice", 1000);

        let err = seat.confirm("bob", 1000 + 2 * MINUTE).unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        assert_eq!(seat.status().state(), SeatState::Locked);
    }

    #[test]
    fn test_unlock_rules() {
        let mut seat = locked_seat("alice", 1000);

        let err = seat.unlock(&Principal::user("bob")).unwrap_err();
        assert_eq!(
            err,
            ReservationError::Forbidden {
                seat_id: "1".to_string(),
                action: DeniedAction::Unlock,
            }
        );

        let outcome = seat.unlock(&Principal::user("alice")).unwrap();
        assert!(outcome.released);
        assert_eq!(outcome.previous_owner.as_deref(), Some("alice"));
        assert_eq!(seat.status(), &SeatStatus::Available);

        // Available: anyone may call it, nothing changes
        let again = seat.unlock(&Principal::user("bob")).unwrap();
        assert!(!again.released);
        assert_eq!(seat.status(), &SeatStatus::Available);
    }

    #[test]
    fn test_admin_unlock_clears_foreign_lock_but_not_booking() {
        let admin = Principal::Admin(AdminGrant::new());

        let mut seat = locked_seat("alice", 1000);
        assert!(seat.unlock(&admin).unwrap().released);

        seat.lock("bob", 2000, MINUTE).unwrap();
        seat.confirm("bob", 3000).unwrap();

        let outcome = seat.unlock(&admin).unwrap();
        assert!(!outcome.released);
        assert_eq!(seat.status().state(), SeatState::Booked);
        assert_eq!(
            seat.unlock(&Principal::user("carol")).unwrap_err().code(),
            "FORBIDDEN"
        );
    }

    #[test]
    fn test_expire_checks_captured_deadline() {
        let mut seat = locked_seat("alice", 1000);
        let deadline = 1000 + MINUTE;

        assert_eq!(
            seat.expire(deadline, deadline - 5),
            ExpiryCheck::NotDue { remaining_ms: 5 }
        );
        assert_eq!(seat.expire(deadline + 1, deadline + 10), ExpiryCheck::Stale);
        assert_eq!(seat.status().state(), SeatState::Locked);

        assert_eq!(seat.expire(deadline, deadline + 10), ExpiryCheck::Released);
        assert_eq!(seat.status(), &SeatStatus::Available);

        // duplicate firing
        assert_eq!(seat.expire(deadline, deadline + 20), ExpiryCheck::Stale);
    }

    #[test]
    fn test_expire_never_touches_booking() {
        let mut seat = locked_seat("alice", 1000);
        seat.confirm("alice", 2000).unwrap();

        assert_eq!(seat.expire(1000 + MINUTE, 1000 + 2 * MINUTE), ExpiryCheck::Stale);
        assert_eq!(seat.status().state(), SeatState::Booked);
        assert_invariants(&seat);
    }
}
