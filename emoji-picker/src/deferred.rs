//! Debounced work with a bounded delay.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Runs the latest scheduled task once input goes quiet.
///
/// Each [`Deferred::schedule`] replaces the pending task and pushes its
/// deadline out by `idle`, but never past `max` after the first request of
/// the current burst, so a steady stream of requests cannot starve it.
/// With both delays zero, tasks run synchronously.
///
/// Requires a tokio runtime unless both delays are zero.
#[derive(Clone)]
pub struct Deferred {
    idle: Duration,
    max: Duration,
    pending: Arc<Mutex<Pending>>,
}

#[derive(Default)]
struct Pending {
    handle: Option<JoinHandle<()>>,
    burst_started: Option<Instant>,
    generation: u64,
}

impl std::fmt::Debug for Deferred {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("idle", &self.idle)
            .field("max", &self.max)
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl Deferred {
    pub fn new(idle: Duration, max: Duration) -> Self {
        Self {
            idle,
            max: max.max(idle),
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    /// Whether a task is waiting to run.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .map(|p| p.handle.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Replace the pending task with `task`.
    pub fn schedule<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.max.is_zero() {
            self.cancel();
            task();
            return;
        }

        let Ok(mut pending) = self.pending.lock() else {
            return;
        };
        if let Some(handle) = pending.handle.take() {
            handle.abort();
        }

        let now = Instant::now();
        let burst_started = *pending.burst_started.get_or_insert(now);
        let deadline = (now + self.idle).min(burst_started + self.max);

        pending.generation += 1;
        let generation = pending.generation;
        let shared = Arc::clone(&self.pending);

        pending.handle = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            {
                let Ok(mut pending) = shared.lock() else {
                    return;
                };
                if pending.generation != generation {
                    return;
                }
                pending.burst_started = None;
                pending.handle = None;
            }
            task();
        }));
    }

    /// Drop the pending task, if any.
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.handle.take() {
                handle.abort();
            }
            pending.burst_started = None;
            pending.generation += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Box<dyn FnOnce() + Send>) {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let sink = runs.clone();
        (runs, move |value| {
            let sink = sink.clone();
            Box::new(move || sink.lock().unwrap().push(value))
        })
    }

    #[test]
    fn test_zero_delays_run_synchronously() {
        let deferred = Deferred::new(Duration::ZERO, Duration::ZERO);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        deferred.schedule(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_latest_after_idle() {
        let deferred = Deferred::new(Duration::from_millis(50), Duration::from_millis(200));
        let (runs, task) = recorder();

        deferred.schedule(task(1));
        tokio::time::sleep(Duration::from_millis(20)).await;
        deferred.schedule(task(2));
        assert!(deferred.is_pending());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(*runs.lock().unwrap(), vec![2]);
        assert!(!deferred.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_delay_bounds_bursts() {
        let deferred = Deferred::new(Duration::from_millis(50), Duration::from_millis(200));
        let (runs, task) = recorder();

        // A request every 30 ms keeps resetting the idle timer
        for i in 0..10 {
            deferred.schedule(task(i));
            tokio::time::sleep(Duration::from_millis(30)).await;
        }

        // The burst started at 0, so the first run happened by 200 ms
        let runs = runs.lock().unwrap();
        assert!(!runs.is_empty());
        assert!(runs[0] <= 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_task() {
        let deferred = Deferred::new(Duration::from_millis(50), Duration::from_millis(200));
        let (runs, task) = recorder();

        deferred.schedule(task(1));
        deferred.cancel();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(runs.lock().unwrap().is_empty());
    }
}
