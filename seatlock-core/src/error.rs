use thiserror::Error;

/// Why a seat could not be taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    AlreadyBooked,
    LockedByOther,
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictReason::AlreadyBooked => write!(f, "is already booked"),
            ConflictReason::LockedByOther => write!(f, "is currently locked by another user"),
        }
    }
}

/// The operation a caller was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeniedAction {
    Confirm,
    Unlock,
}

impl std::fmt::Display for DeniedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeniedAction::Confirm => write!(f, "you do not own the lock for this seat"),
            DeniedAction::Unlock => write!(f, "only the owner or an administrator can unlock this seat"),
        }
    }
}

/// Expected, caller-recoverable failures of the reservation operations.
///
/// Every variant leaves the registry in a valid state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    #[error("seat '{seat_id}' not found")]
    NotFound { seat_id: String },

    #[error("seat '{seat_id}' {reason}")]
    Conflict {
        seat_id: String,
        reason: ConflictReason,
        held_by: Option<String>,
        expires_at: Option<u64>,
    },

    #[error("seat '{seat_id}' is not locked; lock it before confirming")]
    InvalidState { seat_id: String },

    #[error("seat '{seat_id}': {action}")]
    Forbidden { seat_id: String, action: DeniedAction },

    #[error("lock on seat '{seat_id}' has expired")]
    Expired { seat_id: String, expired_at: u64 },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl ReservationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ReservationError::NotFound { .. } => "NOT_FOUND",
            ReservationError::Conflict { .. } => "CONFLICT",
            ReservationError::InvalidState { .. } => "INVALID_STATE",
            ReservationError::Forbidden { .. } => "FORBIDDEN",
            ReservationError::Expired { .. } => "EXPIRED",
            ReservationError::InvalidRequest { .. } => "INVALID_REQUEST",
        }
    }

    pub(crate) fn not_found(seat_id: &str) -> Self {
        ReservationError::NotFound {
            seat_id: seat_id.to_string(),
        }
    }
}

/// Rejected startup configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("seat_count must be greater than 0")]
    NoSeats,
    #[error("lock_duration_ms must be greater than 0")]
    ZeroLockDuration,
    #[error("the reservation manager must be created inside a tokio runtime")]
    NoRuntime,
}

/// Failure writing a snapshot to an external sink
#[derive(Debug, Error)]
pub enum ExportError {
    #[cfg(feature = "sqlite")]
    #[error("sqlite export failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[cfg(feature = "sqlite")]
    #[error("failed to encode snapshot summary: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("snapshot sink unavailable: {0}")]
    Unavailable(String),
}
