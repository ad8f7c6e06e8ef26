//! Concurrent lock race against an in-process manager.

use serde::Serialize;

use seatlock_core::types::SeatState;
use seatlock_core::{ReservationConfig, SeatReservationManager};

use crate::handlers::iso8601;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub user: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub seat_id: String,
    pub attempts: Vec<Attempt>,
    pub winner: Option<String>,
    pub confirmed: bool,
    pub final_state: Option<SeatState>,
}

/// Fires one lock per user at the same seat in parallel, then confirms with
/// whoever won.
pub async fn run(
    config: ReservationConfig,
    seat_id: &str,
    users: &[String],
) -> anyhow::Result<SimulationReport> {
    let manager = SeatReservationManager::new(config)?;
    tracing::info!(seat_id = %seat_id, users = users.len(), "Running concurrent lock simulation");

    let tasks: Vec<_> = users
        .iter()
        .cloned()
        .map(|user| {
            let manager = manager.clone();
            let seat_id = seat_id.to_string();
            tokio::spawn(async move {
                let result = manager.lock(&seat_id, &user);
                (user, result)
            })
        })
        .collect();

    let mut attempts = Vec::with_capacity(tasks.len());
    let mut winner = None;
    for task in tasks {
        let (user, result) = task.await?;
        match result {
            Ok(grant) => {
                winner = Some(user.clone());
                attempts.push(Attempt {
                    user,
                    success: true,
                    expires_at: Some(iso8601(grant.expires_at)),
                    error: None,
                });
            }
            Err(err) => attempts.push(Attempt {
                user,
                success: false,
                expires_at: None,
                error: Some(err.to_string()),
            }),
        }
    }

    let confirmed = match &winner {
        Some(owner) => match manager.confirm(seat_id, owner) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(owner = %owner, error = %e, "Winner could not confirm");
                false
            }
        },
        None => {
            tracing::warn!(seat_id = %seat_id, "No one managed to lock the seat");
            false
        }
    };

    Ok(SimulationReport {
        seat_id: seat_id.to_string(),
        attempts,
        winner,
        confirmed,
        final_state: manager.snapshot().get(seat_id).map(|view| view.state),
    })
}
