use std::collections::BTreeMap;

use axum::http::StatusCode;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use seatlock_core::types::{SeatState, SeatSummary, Snapshot};
use seatlock_core::ReservationError;

// ─── Formatting Helpers ─────────────────────────────────────────────────────

/// Unix milliseconds as an ISO-8601 UTC timestamp
pub fn iso8601(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| ms.to_string())
}

pub fn status_for(err: &ReservationError) -> StatusCode {
    match err {
        ReservationError::NotFound { .. } => StatusCode::NOT_FOUND,
        ReservationError::Conflict { .. } => StatusCode::CONFLICT,
        ReservationError::InvalidState { .. } => StatusCode::BAD_REQUEST,
        ReservationError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        ReservationError::Forbidden { .. } => StatusCode::FORBIDDEN,
        ReservationError::Expired { .. } => StatusCode::GONE,
    }
}

// ─── Request Types ──────────────────────────────────────────────────────────

/// Ids arrive as strings or bare JSON numbers
#[derive(Deserialize)]
#[serde(untagged)]
pub enum IdParam {
    Text(String),
    Number(serde_json::Number),
}

impl IdParam {
    pub fn into_string(self) -> String {
        match self {
            IdParam::Text(s) => s,
            IdParam::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeatRequest {
    pub seat_id: Option<IdParam>,
    pub user_id: Option<IdParam>,
}

impl SeatRequest {
    /// Both ids are required for lock and confirm
    pub fn require_both(self) -> Result<(String, String), String> {
        let seat_id = self.seat_id.map(IdParam::into_string).unwrap_or_default();
        let user_id = self.user_id.map(IdParam::into_string).unwrap_or_default();
        if seat_id.is_empty() || user_id.is_empty() {
            return Err("seatId and userId are required".to_string());
        }
        Ok((seat_id, user_id))
    }

    /// Unlock only needs the seat; the user may be omitted by an admin
    pub fn require_seat(self) -> Result<(String, Option<String>), String> {
        let seat_id = self.seat_id.map(IdParam::into_string).unwrap_or_default();
        if seat_id.is_empty() {
            return Err("seatId is required".to_string());
        }
        let user_id = self.user_id.map(IdParam::into_string);
        Ok((seat_id, user_id.filter(|u| !u.is_empty())))
    }
}

// ─── Response Types ─────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            owner: None,
            expires_at: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
            code: None,
            owner: None,
            expires_at: None,
        }
    }

    /// Failure payload for a core error; conflicts carry the current holder
    pub fn from_error(err: &ReservationError) -> Self {
        let mut response = Self::err(err.to_string());
        response.code = Some(err.code());
        if let ReservationError::Conflict {
            held_by, expires_at, ..
        } = err
        {
            response.owner = held_by.clone();
            response.expires_at = expires_at.map(iso8601);
        }
        response
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockResponse {
    pub id: String,
    pub owner: String,
    pub expires_at: String,
}

#[derive(Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub owner: String,
}

#[derive(Serialize)]
pub struct UnlockResponse {
    pub message: String,
    pub released: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatInfo {
    pub state: SeatState,
    pub owner: Option<String>,
    pub expires_at: Option<String>,
}

#[derive(Serialize)]
pub struct SeatsResponse {
    pub seats: BTreeMap<String, SeatInfo>,
}

impl From<Snapshot> for SeatsResponse {
    fn from(snapshot: Snapshot) -> Self {
        let seats = snapshot
            .seats
            .into_iter()
            .map(|(id, view)| {
                let info = SeatInfo {
                    state: view.state,
                    owner: view.owner,
                    expires_at: view.expires_at.map(iso8601),
                };
                (id, info)
            })
            .collect();
        Self { seats }
    }
}

#[derive(Serialize)]
pub struct SweepResponse {
    pub released: usize,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub seats: SeatSummary,
    pub version: String,
}
