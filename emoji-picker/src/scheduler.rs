//! Flush scheduling for [`Store`](crate::Store).
//!
//! A store asks its scheduler to run one flush task whenever it goes from
//! clean to dirty. When that task runs decides what counts as a "tick":
//!
//! - [`FrameScheduler`] hands tasks to a [`FrameLoop`] owned by the host's
//!   render loop; multiple buffered wakeups collapse into a single frame.
//! - [`TokioScheduler`] spawns each task after yielding to the runtime.
//! - [`ManualScheduler`] queues tasks until `run_pending` is called, for
//!   tests and hosts that drive frames themselves.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send>;

/// Schedules flush tasks.
pub trait Scheduler: Send + Sync {
    /// Run `task` on a later tick.
    fn schedule(&self, task: Task);
}

/// Scheduler that queues tasks until [`ManualScheduler::run_pending`].
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<VecDeque<Task>>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

impl ManualScheduler {
    /// Create a new scheduler with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Run the tasks queued so far.
    ///
    /// Tasks scheduled while running are left for the next call. Returns the
    /// number of tasks run.
    pub fn run_pending(&self) -> usize {
        let tasks: Vec<Task> = self
            .queue
            .lock()
            .map(|mut q| q.drain(..).collect())
            .unwrap_or_default();
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, task: Task) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(task);
        }
    }
}

/// Scheduler that spawns each task on the current tokio runtime.
///
/// The task yields once before running so that every synchronous `set` in
/// the current task lands in the same flush. Must be used from within a
/// runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, task: Task) {
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            task();
        });
    }
}

/// Sender half of a frame channel.
#[derive(Clone)]
pub struct FrameScheduler {
    tasks: Arc<Mutex<Vec<Task>>>,
    tx: mpsc::Sender<()>,
}

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler").finish_non_exhaustive()
    }
}

impl Scheduler for FrameScheduler {
    /// Queue the task and wake the frame loop.
    ///
    /// Non-blocking. A full channel already guarantees a pending frame, and
    /// a closed one means the loop is shutting down; both are ignored.
    fn schedule(&self, task: Task) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(task);
        }
        let _ = self.tx.try_send(());
    }
}

/// Receiver half of a frame channel, driven by the host's render loop.
pub struct FrameLoop {
    tasks: Arc<Mutex<Vec<Task>>>,
    rx: mpsc::Receiver<()>,
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop").finish_non_exhaustive()
    }
}

impl FrameLoop {
    /// Wait for the next wakeup, then run one frame.
    ///
    /// Redundant buffered wakeups are drained first so they collapse into a
    /// single frame. Returns the number of tasks run, or `None` once every
    /// [`FrameScheduler`] has been dropped.
    pub async fn next_frame(&mut self) -> Option<usize> {
        self.rx.recv().await?;
        self.drain();
        Some(self.run_frame())
    }

    /// Run every queued task now.
    pub fn run_frame(&self) -> usize {
        let tasks: Vec<Task> = self
            .tasks
            .lock()
            .map(|mut tasks| tasks.drain(..).collect())
            .unwrap_or_default();
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    /// Run frames until every sender is dropped.
    pub async fn run(mut self) {
        while let Some(count) = self.next_frame().await {
            log::trace!("[scheduler] frame ran {count} tasks");
        }
    }

    fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}

/// Create a new frame channel pair.
pub fn frame_channel() -> (FrameScheduler, FrameLoop) {
    let (tx, rx) = mpsc::channel(16);
    let tasks = Arc::new(Mutex::new(Vec::new()));
    (
        FrameScheduler {
            tasks: Arc::clone(&tasks),
            tx,
        },
        FrameLoop { tasks, rx },
    )
}
