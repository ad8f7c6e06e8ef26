use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coarse seat state, as reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatState {
    /// Free to be locked
    Available,
    /// Held by one user until a deadline
    Locked,
    /// Confirmed; terminal
    Booked,
}

impl std::fmt::Display for SeatState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeatState::Available => write!(f, "available"),
            SeatState::Locked => write!(f, "locked"),
            SeatState::Booked => write!(f, "booked"),
        }
    }
}

/// Seat status together with the data each state owns.
///
/// An owner exists only while `Locked` or `Booked`, and a deadline only
/// while `Locked`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatStatus {
    Available,
    Locked {
        owner: String,
        /// Unix milliseconds after which the lock is no longer valid
        expires_at: u64,
    },
    Booked {
        owner: String,
    },
}

impl SeatStatus {
    pub fn state(&self) -> SeatState {
        match self {
            SeatStatus::Available => SeatState::Available,
            SeatStatus::Locked { .. } => SeatState::Locked,
            SeatStatus::Booked { .. } => SeatState::Booked,
        }
    }

    pub fn owner(&self) -> Option<&str> {
        match self {
            SeatStatus::Available => None,
            SeatStatus::Locked { owner, .. } | SeatStatus::Booked { owner } => Some(owner),
        }
    }

    pub fn expires_at(&self) -> Option<u64> {
        match self {
            SeatStatus::Locked { expires_at, .. } => Some(*expires_at),
            _ => None,
        }
    }

    /// True for a lock whose deadline is at or before `now`.
    pub fn is_due(&self, now: u64) -> bool {
        matches!(self, SeatStatus::Locked { expires_at, .. } if *expires_at <= now)
    }

    pub fn into_owner(self) -> Option<String> {
        match self {
            SeatStatus::Available => None,
            SeatStatus::Locked { owner, .. } | SeatStatus::Booked { owner } => Some(owner),
        }
    }
}

/// Read-only view of one seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub state: SeatState,
    pub owner: Option<String>,
    pub expires_at: Option<u64>,
}

impl From<&SeatStatus> for SeatView {
    fn from(status: &SeatStatus) -> Self {
        Self {
            state: status.state(),
            owner: status.owner().map(str::to_string),
            expires_at: status.expires_at(),
        }
    }
}

/// Point-in-time view of every seat in a registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the snapshot was taken (Unix milliseconds)
    pub taken_at: u64,
    pub seats: BTreeMap<String, SeatView>,
}

impl Snapshot {
    pub fn get(&self, seat_id: &str) -> Option<&SeatView> {
        self.seats.get(seat_id)
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Counts seats per state
    pub fn summary(&self) -> SeatSummary {
        let mut summary = SeatSummary::default();
        for view in self.seats.values() {
            match view.state {
                SeatState::Available => summary.available += 1,
                SeatState::Locked => summary.locked += 1,
                SeatState::Booked => summary.booked += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSummary {
    pub available: usize,
    pub locked: usize,
    pub booked: usize,
}
