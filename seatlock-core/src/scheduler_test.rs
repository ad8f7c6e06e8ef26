#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::clock::RuntimeClock;
    use crate::infrastructure::SeatStore;
    use crate::infrastructure_in_memory::InMemorySeatStore;
    use crate::manager::{Shared, lock_shared};
    use crate::scheduler::{ExpiryJob, ExpiryTimers};
    use crate::types::SeatState;

    fn idle_task() -> tokio::task::JoinHandle<()> {
        tokio::spawn(std::future::pending::<()>())
    }

    #[tokio::test]
    async fn test_arm_replaces_and_aborts_previous_timer() {
        let mut timers = ExpiryTimers::default();
        let first = idle_task();
        let second = idle_task();

        timers.arm("1", first.abort_handle());
        timers.arm("1", second.abort_handle());
        assert_eq!(timers.len(), 1);

        assert!(first.await.unwrap_err().is_cancelled());
        assert!(!second.is_finished());
        assert!(timers.is_armed("1"));
    }

    #[tokio::test]
    async fn test_cancel_and_disarm() {
        let mut timers = ExpiryTimers::default();
        let cancelled = idle_task();
        let fired = idle_task();

        timers.arm("1", cancelled.abort_handle());
        timers.arm("2", fired.abort_handle());

        assert!(timers.cancel("1"));
        assert!(!timers.cancel("1"));
        assert!(cancelled.await.unwrap_err().is_cancelled());

        // disarm forgets the handle without aborting the task
        timers.disarm("2");
        assert!(timers.is_empty());
        tokio::task::yield_now().await;
        assert!(!fired.is_finished());
    }

    #[tokio::test]
    async fn test_dropping_timers_aborts_pending_tasks() {
        let pending = idle_task();
        let mut timers = ExpiryTimers::default();
        timers.arm("1", pending.abort_handle());

        drop(timers);
        assert!(pending.await.unwrap_err().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_wakeup_rearms_until_deadline() {
        let clock = RuntimeClock::new();
        let shared = Arc::new(Mutex::new(Shared {
            store: Box::new(InMemorySeatStore::with_numbered_seats(1)),
            timers: ExpiryTimers::default(),
        }));
        let grant = lock_shared(&shared)
            .store
            .lock("1", "alice", clock.now_ms(), 1_000)
            .unwrap();

        let job = ExpiryJob {
            seat_id: "1".to_string(),
            deadline: grant.expires_at,
            grace: Duration::from_millis(10),
        };
        // first wakeup lands well before the deadline
        let task = tokio::spawn(job.run(Arc::downgrade(&shared), clock, Duration::from_millis(100)));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!task.is_finished());
        assert_eq!(
            lock_shared(&shared).store.status("1").map(|s| s.state()),
            Some(SeatState::Locked)
        );

        tokio::time::sleep(Duration::from_millis(600)).await;
        task.await.unwrap();
        assert_eq!(
            lock_shared(&shared).store.status("1").map(|s| s.state()),
            Some(SeatState::Available)
        );
    }
}
