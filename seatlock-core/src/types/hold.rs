use serde::{Deserialize, Serialize};

/// A lock granted on a seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockGrant {
    pub seat_id: String,
    pub owner: String,
    /// Unix milliseconds at which the lock lapses
    pub expires_at: u64,
}

/// A confirmed booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub seat_id: String,
    pub owner: String,
}

/// Result of an unlock call. `released` is false when there was no lock to clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockOutcome {
    pub seat_id: String,
    pub released: bool,
    pub previous_owner: Option<String>,
}

/// Capability proving the holder was authorized as an administrator.
///
/// Only the reservation manager mints these, after checking the configured
/// admin key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminGrant {
    _sealed: (),
}

impl AdminGrant {
    pub(crate) fn new() -> Self {
        Self { _sealed: () }
    }
}

/// Who is asking to release a seat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    User(String),
    Admin(AdminGrant),
}

impl Principal {
    pub fn user(user_id: impl Into<String>) -> Self {
        Principal::User(user_id.into())
    }

    /// Whether this principal may clear a hold owned by `owner`.
    pub fn may_release(&self, owner: &str) -> bool {
        match self {
            Principal::User(user_id) => user_id == owner,
            Principal::Admin(_) => true,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Principal::Admin(_))
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Principal::User(user_id) => write!(f, "{}", user_id),
            Principal::Admin(_) => write!(f, "<admin>"),
        }
    }
}
