//! Bounded worker pool with a completion channel.
//!
//! Work runs on a dedicated rayon pool; finished results are sent back over a
//! crossbeam channel and collected by the owning thread once per tick. The
//! owner never blocks except in [`TaskExecutor::wait_all`].
//!
//! # Usage
//!
//! ```ignore
//! let mut executor = TaskExecutor::<u32>::new(2)?;
//!
//! // Queue work (non-blocking)
//! let task_id = executor.spawn(move || expensive_computation());
//!
//! // Collect whatever finished since last frame
//! for (id, result) in executor.drain_completed() {
//!     // Use result
//! }
//! ```

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{unbounded, Receiver, Sender};
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Unique identifier for a spawned task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
  fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    Self(COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  /// Get the raw ID value.
  pub fn raw(&self) -> u64 {
    self.0
  }
}

/// Task executor producing results of type `T`.
pub struct TaskExecutor<T> {
  pool: ThreadPool,
  sender: Sender<(TaskId, T)>,
  receiver: Receiver<(TaskId, T)>,
  /// Spawned but not yet collected.
  in_flight: HashSet<TaskId>,
}

impl<T: Send + 'static> TaskExecutor<T> {
  /// Create an executor with `num_threads` workers (0 = one per CPU).
  pub fn new(num_threads: usize) -> Result<Self, ThreadPoolBuildError> {
    let pool = ThreadPoolBuilder::new()
      .num_threads(num_threads)
      .thread_name(|i| format!("voxel-worker-{i}"))
      .build()?;
    let (sender, receiver) = unbounded();

    Ok(Self {
      pool,
      sender,
      receiver,
      in_flight: HashSet::new(),
    })
  }

  /// Queue `work` on the pool (non-blocking).
  ///
  /// Everything `work` captures is dropped before its result is published.
  pub fn spawn<F>(&mut self, work: F) -> TaskId
  where
    F: FnOnce() -> T + Send + 'static,
  {
    let task_id = TaskId::next();
    let sender = self.sender.clone();
    self.in_flight.insert(task_id);

    self.pool.spawn(move || {
      let result = work();
      // Receiver only goes away with the executor; nobody is left to care.
      let _ = sender.send((task_id, result));
    });

    task_id
  }

  /// Collect every result that finished since the last call (non-blocking).
  pub fn drain_completed(&mut self) -> Vec<(TaskId, T)> {
    let completed: Vec<_> = self.receiver.try_iter().collect();
    for (id, _) in &completed {
      self.in_flight.remove(id);
    }
    completed
  }

  /// Block until every spawned task has finished, returning their results.
  pub fn wait_all(&mut self) -> Vec<(TaskId, T)> {
    let mut completed = Vec::with_capacity(self.in_flight.len());
    while !self.in_flight.is_empty() {
      match self.receiver.recv() {
        Ok((id, result)) => {
          self.in_flight.remove(&id);
          completed.push((id, result));
        }
        // We hold a sender, so the channel cannot disconnect.
        Err(_) => break,
      }
    }
    completed
  }

  /// True while a task has not been collected yet.
  pub fn is_pending(&self, task_id: TaskId) -> bool {
    self.in_flight.contains(&task_id)
  }

  /// Number of tasks queued, running, or finished but uncollected.
  pub fn pending_count(&self) -> usize {
    self.in_flight.len()
  }

  /// Worker threads in the pool.
  pub fn num_threads(&self) -> usize {
    self.pool.current_num_threads()
  }
}

// =============================================================================
// Tests
// =============================================================================
