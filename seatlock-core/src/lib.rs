//! # seatlock-core
//!
//! In-memory seat reservation core. Clients contend for a fixed set of seats
//! through a two-phase protocol: `lock` a seat for a limited time, then
//! `confirm` it into a booking before the lock lapses. Lapsed locks are
//! reclaimed by per-seat expiry timers, or lazily by the next caller.

pub mod clock;
pub mod config;
pub mod error;
pub mod infrastructure;
#[path = "infrastructure_in_memory.rs"]
pub mod infrastructure_in_memory;
#[cfg(feature = "sqlite")]
#[path = "infrastructure_sqlite.rs"]
pub mod infrastructure_sqlite;
pub mod manager;
pub mod scheduler;
pub mod state;
pub mod types;

pub use config::ReservationConfig;
pub use error::{ConfigError, ReservationError};
pub use manager::SeatReservationManager;

#[cfg(test)]
mod scheduler_test;
#[cfg(test)]
mod state_test;
