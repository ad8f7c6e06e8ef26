//! SQLite-backed snapshot export.
//! Writes the latest state of every seat to a table so external tools can
//! inspect it. Nothing is read back at startup.
//!
//! Enable with the `sqlite` feature flag:
//! ```toml
//! seatlock-core = { path = "../seatlock-core", features = ["sqlite"] }
//! ```

use rusqlite::{params, Connection};

use crate::error::ExportError;
use crate::infrastructure::SnapshotSink;
use crate::types::Snapshot;

/// A snapshot sink backed by SQLite.
///
/// Uses WAL mode so readers can inspect the file while the server writes.
pub struct SqliteSnapshotSink {
    conn: Connection,
}

impl SqliteSnapshotSink {
    /// Open (or create) a SQLite database at the given path.
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS seats (
                seat_id     TEXT PRIMARY KEY,
                state       TEXT NOT NULL,
                owner       TEXT,
                expires_at  INTEGER,
                taken_at    INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_seats_state ON seats(state);

            CREATE TABLE IF NOT EXISTS exports (
                taken_at INTEGER NOT NULL,
                summary  TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }
}

impl SnapshotSink for SqliteSnapshotSink {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), ExportError> {
        let summary = serde_json::to_string(&snapshot.summary())?;

        let tx = self.conn.transaction()?;
        {
            let mut upsert = tx.prepare(
                "INSERT INTO seats (seat_id, state, owner, expires_at, taken_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(seat_id) DO UPDATE SET
                    state = excluded.state,
                    owner = excluded.owner,
                    expires_at = excluded.expires_at,
                    taken_at = excluded.taken_at",
            )?;
            for (seat_id, view) in &snapshot.seats {
                upsert.execute(params![
                    seat_id,
                    view.state.to_string(),
                    view.owner,
                    view.expires_at,
                    snapshot.taken_at,
                ])?;
            }
        }
        tx.execute(
            "INSERT INTO exports (taken_at, summary) VALUES (?1, ?2)",
            params![snapshot.taken_at, summary],
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::SeatStore;
    use crate::infrastructure_in_memory::InMemorySeatStore;

    fn row(sink: &SqliteSnapshotSink, seat_id: &str) -> (String, Option<String>, Option<u64>) {
        sink.conn
            .query_row(
                "SELECT state, owner, expires_at FROM seats WHERE seat_id = ?1",
                params![seat_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap()
    }

    #[test]
    fn test_sqlite_sink_upserts_latest_state() {
        let mut store = InMemorySeatStore::with_numbered_seats(3);
        let mut sink = SqliteSnapshotSink::open_in_memory().unwrap();

        store.lock("1", "alice", 1000, 60_000).unwrap();
        sink.write(&store.snapshot(1000)).unwrap();
        assert_eq!(
            row(&sink, "1"),
            ("locked".to_string(), Some("alice".to_string()), Some(61_000))
        );

        store.confirm("1", "alice", 2000).unwrap();
        sink.write(&store.snapshot(2000)).unwrap();
        assert_eq!(
            row(&sink, "1"),
            ("booked".to_string(), Some("alice".to_string()), None)
        );
        assert_eq!(row(&sink, "3"), ("available".to_string(), None, None));

        let seats: i64 = sink
            .conn
            .query_row("SELECT COUNT(*) FROM seats", [], |row| row.get(0))
            .unwrap();
        let exports: i64 = sink
            .conn
            .query_row("SELECT COUNT(*) FROM exports", [], |row| row.get(0))
            .unwrap();
        assert_eq!((seats, exports), (3, 2));
    }
}
