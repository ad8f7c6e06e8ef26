use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;

use seatlock_core::error::ExportError;
use seatlock_core::infrastructure::SnapshotSink;
use seatlock_core::types::{AdminGrant, Principal};
use seatlock_core::{ReservationConfig, SeatReservationManager};

use crate::handlers::*;

pub type AppState = SeatReservationManager;

pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    pub export: Option<String>,
    pub export_interval_secs: u64,
    pub max_in_flight: usize,
}

pub async fn run(config: ReservationConfig, options: ServeOptions) -> anyhow::Result<()> {
    let manager = SeatReservationManager::new(config).context("Invalid reservation config")?;

    if manager.config().admin_key().is_some() {
        tracing::info!("🔐 Admin key configured");
    } else {
        tracing::warn!("⚠️  No SEATLOCK_ADMIN_KEY set, admin unlock and sweep are disabled");
    }

    if let Some(target) = &options.export {
        match open_sink(target) {
            Ok(sink) => {
                let every = Duration::from_secs(options.export_interval_secs.max(1));
                spawn_exporter(manager.clone(), sink, every);
            }
            Err(e) => tracing::error!("{:#}. Snapshot export disabled.", e),
        }
    }

    tracing::info!(
        seats = manager.seat_count(),
        lock_duration_ms = manager.config().lock_duration_ms,
        "Seat registry ready"
    );

    let app = router(manager).layer(ConcurrencyLimitLayer::new(options.max_in_flight.max(1)));

    let addr = format!("{}:{}", options.host, options.port);
    tracing::info!("🎟️  Seatlock server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

pub fn router(manager: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/seats", get(list_seats))
        .route("/lock", post(lock_seat))
        .route("/confirm", post(confirm_seat))
        .route("/unlock", post(unlock_seat))
        .route("/sweep", post(sweep_expired))
        .layer(CorsLayer::permissive())
        .with_state(manager)
}

// ─── Admin Credentials ──────────────────────────────────────────────────────

/// Mints an admin grant when the request carries the configured bearer key
fn admin_grant(manager: &AppState, headers: &HeaderMap) -> Option<AdminGrant> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))?;
    manager.authorize_admin(token)
}

// ─── Request Bodies ─────────────────────────────────────────────────────────

/// A request without a JSON body reads as one with no fields, so it fails
/// field validation like any other incomplete request. Malformed JSON is
/// reported in the envelope rather than as axum's plain-text rejection.
fn read_body(body: Result<Json<SeatRequest>, JsonRejection>) -> Result<SeatRequest, String> {
    match body {
        Ok(Json(req)) => Ok(req),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(SeatRequest::default()),
        Err(rejection) => {
            tracing::debug!(status = %rejection.status(), "Rejected request body");
            Err(rejection.body_text())
        }
    }
}

// ─── Handlers ───────────────────────────────────────────────────────────────

async fn health(State(manager): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        seats: manager.snapshot().summary(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn list_seats(State(manager): State<AppState>) -> Json<SeatsResponse> {
    Json(SeatsResponse::from(manager.snapshot()))
}

async fn lock_seat(
    State(manager): State<AppState>,
    body: Result<Json<SeatRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse<LockResponse>>) {
    let (seat_id, user_id) = match read_body(body).and_then(SeatRequest::require_both) {
        Ok(ids) => ids,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e))),
    };

    match manager.lock(&seat_id, &user_id) {
        Ok(grant) => {
            tracing::info!(seat_id = %grant.seat_id, user_id = %grant.owner, "Seat locked");
            (
                StatusCode::OK,
                Json(ApiResponse::ok(LockResponse {
                    id: grant.seat_id,
                    owner: grant.owner,
                    expires_at: iso8601(grant.expires_at),
                })),
            )
        }
        Err(err) => {
            tracing::info!(seat_id = %seat_id, user_id = %user_id, reason = err.code(), "Lock denied");
            (status_for(&err), Json(ApiResponse::from_error(&err)))
        }
    }
}

async fn confirm_seat(
    State(manager): State<AppState>,
    body: Result<Json<SeatRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse<BookingResponse>>) {
    let (seat_id, user_id) = match read_body(body).and_then(SeatRequest::require_both) {
        Ok(ids) => ids,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e))),
    };

    match manager.confirm(&seat_id, &user_id) {
        Ok(booking) => (
            StatusCode::OK,
            Json(ApiResponse::ok(BookingResponse {
                id: booking.seat_id,
                owner: booking.owner,
            })),
        ),
        Err(err) => {
            tracing::info!(seat_id = %seat_id, user_id = %user_id, reason = err.code(), "Confirm denied");
            (status_for(&err), Json(ApiResponse::from_error(&err)))
        }
    }
}

async fn unlock_seat(
    State(manager): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SeatRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse<UnlockResponse>>) {
    let (seat_id, user_id) = match read_body(body).and_then(SeatRequest::require_seat) {
        Ok(ids) => ids,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e))),
    };

    let principal = match admin_grant(&manager, &headers) {
        Some(grant) => Principal::Admin(grant),
        None => Principal::User(user_id.unwrap_or_default()),
    };

    match manager.unlock(&seat_id, &principal) {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse::ok(UnlockResponse {
                message: format!("Lock released (if it existed) for seat {}", seat_id),
                released: outcome.released,
            })),
        ),
        Err(err) => {
            tracing::warn!(seat_id = %seat_id, caller = %principal, reason = err.code(), "Unlock denied");
            (status_for(&err), Json(ApiResponse::from_error(&err)))
        }
    }
}

async fn sweep_expired(
    State(manager): State<AppState>,
    headers: HeaderMap,
) -> (StatusCode, Json<ApiResponse<SweepResponse>>) {
    if admin_grant(&manager, &headers).is_none() {
        tracing::warn!("🚫 Unauthorized sweep request");
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::err("Administrator credentials required")),
        );
    }

    let released = manager.sweep_expired();
    (StatusCode::OK, Json(ApiResponse::ok(SweepResponse { released })))
}

// ─── Snapshot Export ────────────────────────────────────────────────────────

fn open_sink(target: &str) -> anyhow::Result<Box<dyn SnapshotSink + Send>> {
    let Some(path) = target.strip_prefix("sqlite:") else {
        anyhow::bail!("Unknown export target '{}'. Use 'sqlite:<path>'", target);
    };

    #[cfg(feature = "sqlite")]
    {
        tracing::info!("💾 Snapshot export: SQLite ({})", path);
        let sink = seatlock_core::infrastructure_sqlite::SqliteSnapshotSink::open(path)
            .with_context(|| format!("Failed to open SQLite database at '{}'", path))?;
        Ok(Box::new(sink))
    }
    #[cfg(not(feature = "sqlite"))]
    {
        let _ = path;
        anyhow::bail!(
            "SQLite export requested but the `sqlite` feature is not enabled. \
             Rebuild with: cargo build --features sqlite"
        )
    }
}

/// Periodically writes a snapshot to `sink`. The registry lock is released
/// before the write starts.
fn spawn_exporter(
    manager: AppState,
    sink: Box<dyn SnapshotSink + Send>,
    every: Duration,
) {
    let sink = Arc::new(Mutex::new(sink));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let snapshot = manager.snapshot();
            let sink = Arc::clone(&sink);

            let written = tokio::task::spawn_blocking(move || {
                let mut sink = sink
                    .lock()
                    .map_err(|_| ExportError::Unavailable("sink lock poisoned".to_string()))?;
                sink.write(&snapshot)
            })
            .await;

            match written {
                Ok(Ok(())) => tracing::debug!("Snapshot exported"),
                Ok(Err(e)) => tracing::error!(error = %e, "Snapshot export failed"),
                Err(e) => tracing::error!(error = %e, "Snapshot export task panicked"),
            }
        }
    });
}
