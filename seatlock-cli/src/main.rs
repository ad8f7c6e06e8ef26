mod handlers;
mod server;
mod simulate;


use clap::{Parser, Subcommand};
use seatlock_core::config::{
    DEFAULT_EXPIRY_GRACE_MS, DEFAULT_LOCK_DURATION_MS, DEFAULT_SEAT_COUNT,
};
use seatlock_core::ReservationConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "seatlock",
    about = "Seatlock — lock-then-confirm seat reservation server",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Reservation settings shared by every command that builds a manager
#[derive(clap::Args, Clone)]
struct ReservationArgs {
    /// Number of seats, created with ids 1..=N
    #[arg(long, default_value_t = DEFAULT_SEAT_COUNT, env = "SEATLOCK_SEATS")]
    seats: usize,

    /// How long a lock holds before it lapses
    #[arg(long, default_value_t = DEFAULT_LOCK_DURATION_MS, env = "SEATLOCK_LOCK_DURATION_MS")]
    lock_duration_ms: u64,

    /// Delay after a lock's deadline before its expiry timer fires
    #[arg(long, default_value_t = DEFAULT_EXPIRY_GRACE_MS, env = "SEATLOCK_EXPIRY_GRACE_MS")]
    expiry_grace_ms: u64,

    /// Bearer token that grants administrator rights (force unlock, sweep)
    #[arg(long, env = "SEATLOCK_ADMIN_KEY", hide_env_values = true)]
    admin_key: Option<String>,
}

impl ReservationArgs {
    fn into_config(self) -> ReservationConfig {
        ReservationConfig {
            seat_count: self.seats,
            lock_duration_ms: self.lock_duration_ms,
            expiry_grace_ms: self.expiry_grace_ms,
            admin_key: self.admin_key,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP reservation server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000", env = "PORT")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[command(flatten)]
        reservation: ReservationArgs,

        /// Snapshot export target: "sqlite:<path>"
        #[arg(long, env = "SEATLOCK_EXPORT")]
        export: Option<String>,

        /// Seconds between snapshot exports
        #[arg(long, default_value = "5")]
        export_interval_secs: u64,

        /// Maximum requests handled at once
        #[arg(long, default_value = "512")]
        max_in_flight: usize,
    },

    /// Race concurrent lock requests for one seat and confirm with the winner
    Simulate {
        /// Users competing for the seat
        #[arg(long, value_delimiter = ',', default_value = "alice,bob,carol,dave")]
        users: Vec<String>,

        /// Seat to contend for
        #[arg(long, default_value = "1")]
        seat: String,

        #[command(flatten)]
        reservation: ReservationArgs,
    },

    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            host,
            reservation,
            export,
            export_interval_secs,
            max_in_flight,
        } => {
            let options = server::ServeOptions {
                host,
                port,
                export,
                export_interval_secs,
                max_in_flight,
            };
            server::run(reservation.into_config(), options).await?;
        }
        Commands::Simulate {
            users,
            seat,
            reservation,
        } => {
            let report = simulate::run(reservation.into_config(), &seat, &users).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Version => {
            println!("seatlock {}", env!("CARGO_PKG_VERSION"));
            println!("Lock-then-confirm seat reservation core");
        }
    }

    Ok(())
}
