use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fanjoin_utils_rs::concurrent::CompletionBarrier;
use futures::FutureExt;
use tokio::sync::{Mutex, Semaphore};

use crate::coordinator::callbacks::{BatchCompletion, FinalCallback, ItemCallback, UnitOutcome};
use crate::coordinator::dispatcher::{DispatchJob, Dispatcher, DispatcherHandle, TokioContextDispatcher};
use crate::coordinator::errors::{CoordinatorError, UnitFailure};
use crate::coordinator::work_unit::{WorkUnit, WorkUnitHandle};

pub const DEFAULT_POOL_CAPACITY: usize = 10;

/// Per-batch knobs for [`Coordinator::run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
  item_callback: Option<ItemCallback>,
  final_callback: Option<FinalCallback>,
  pool_capacity: usize,
  deadline: Option<Duration>,
}

impl Default for RunOptions {
  fn default() -> Self {
    Self {
      item_callback: None,
      final_callback: None,
      pool_capacity: DEFAULT_POOL_CAPACITY,
      deadline: None,
    }
  }
}

impl RunOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_item_callback(mut self, callback: ItemCallback) -> Self {
    self.item_callback = Some(callback);
    self
  }

  pub fn with_final_callback(mut self, callback: FinalCallback) -> Self {
    self.final_callback = Some(callback);
    self
  }

  /// Upper bound on concurrently executing units, 1..=capacity.
  pub fn with_pool_capacity(mut self, pool_capacity: usize) -> Self {
    self.pool_capacity = pool_capacity;
    self
  }

  /// When set, `run` gives up waiting after this duration and fires the final
  /// callback with a partial completion instead of blocking forever.
  pub fn with_deadline(mut self, deadline: Duration) -> Self {
    self.deadline = Some(deadline);
    self
  }
}

#[derive(Debug, Default)]
struct BatchState {
  total: usize,
  completed: usize,
  item_callback: Option<ItemCallback>,
  final_callback: Option<FinalCallback>,
}

// The critical section shared by every unit of a batch: item callback,
// counter increment, and the final-callback check all happen under one lock,
// so exactly one completion observes completed == total.
#[derive(Debug, Clone)]
pub(crate) struct CompletionHandler {
  state: Arc<Mutex<BatchState>>,
  barrier: CompletionBarrier,
}

impl CompletionHandler {
  async fn complete(&self, outcome: UnitOutcome) {
    let mut state = self.state.lock().await;
    if state.completed >= state.total {
      tracing::warn!(
        index = outcome.index,
        "completion signaled after batch already finished; ignoring"
      );
      return;
    }
    if let Some(callback) = &state.item_callback {
      callback.run(outcome).await;
    }
    state.completed += 1;
    if state.completed == state.total {
      let completion = BatchCompletion {
        completed: state.completed,
        total: state.total,
      };
      if let Some(callback) = state.final_callback.take() {
        callback.run(completion).await;
      }
      state.item_callback = None;
      self.barrier.signal().await;
    }
  }
}

/// Completion handle bound to one dispatched unit.
///
/// Asynchronous units receive a clone through [`WorkUnit::process_with`] and
/// invoke [`Continuation::complete`] (or [`Continuation::fail`]) when their
/// work finishes. A per-unit flag makes invocation idempotent: only the first
/// call is counted, later calls are logged and dropped.
#[derive(Debug, Clone)]
pub struct Continuation {
  index: usize,
  unit: WorkUnitHandle,
  fired: Arc<AtomicBool>,
  handler: CompletionHandler,
}

impl Continuation {
  pub(crate) fn new(index: usize, unit: WorkUnitHandle, handler: CompletionHandler) -> Self {
    Self {
      index,
      unit,
      fired: Arc::new(AtomicBool::new(false)),
      handler,
    }
  }

  pub async fn complete(&self) {
    self.finish(None).await;
  }

  pub async fn fail(&self, failure: UnitFailure) {
    self.finish(Some(failure)).await;
  }

  async fn finish(&self, error: Option<UnitFailure>) {
    if self
      .fired
      .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
      .is_err()
    {
      tracing::warn!(index = self.index, "continuation invoked more than once; ignoring");
      return;
    }
    let outcome = UnitOutcome {
      index: self.index,
      unit: self.unit.clone(),
      error,
    };
    self.handler.complete(outcome).await;
  }
}

/// Fan-out/join coordinator.
///
/// One instance is reusable across sequential batches; overlapping `run`
/// calls on the same instance are not supported. Each coordinator owns its
/// counter mutex and gate, so independent instances never contend.
#[derive(Debug, Clone)]
pub struct Coordinator {
  dispatcher: DispatcherHandle,
  state: Arc<Mutex<BatchState>>,
  barrier: CompletionBarrier,
}

impl Default for Coordinator {
  fn default() -> Self {
    Self::new()
  }
}

impl Coordinator {
  pub fn new() -> Self {
    Self::with_dispatcher(DispatcherHandle::new(TokioContextDispatcher::new()))
  }

  pub fn with_dispatcher(dispatcher: DispatcherHandle) -> Self {
    Self {
      dispatcher,
      state: Arc::new(Mutex::new(BatchState::default())),
      barrier: CompletionBarrier::new(false),
    }
  }

  /// Dispatches every unit onto the worker pool and blocks until the whole
  /// batch has signaled completion.
  ///
  /// The final callback fires exactly once per run, strictly after every item
  /// callback of the batch, regardless of the order asynchronous units finish
  /// in. An empty batch fires the final callback immediately and returns
  /// without waiting.
  pub async fn run(&self, units: Vec<WorkUnitHandle>, options: RunOptions) -> Result<BatchCompletion, CoordinatorError> {
    if options.pool_capacity < 1 {
      return Err(CoordinatorError::InvalidPoolCapacity(options.pool_capacity));
    }
    let total = units.len();
    self.barrier.reset().await;
    {
      let mut state = self.state.lock().await;
      state.total = total;
      state.completed = 0;
      state.item_callback = options.item_callback;
      state.final_callback = options.final_callback;
    }
    if total == 0 {
      // never dispatch a wait with a zero target
      let mut state = self.state.lock().await;
      let completion = BatchCompletion { completed: 0, total: 0 };
      if let Some(callback) = state.final_callback.take() {
        callback.run(completion).await;
      }
      state.item_callback = None;
      return Ok(completion);
    }

    tracing::debug!(total, pool_capacity = options.pool_capacity, "dispatching batch");
    let semaphore = Arc::new(Semaphore::new(options.pool_capacity));
    let handler = CompletionHandler {
      state: Arc::clone(&self.state),
      barrier: self.barrier.clone(),
    };
    for (index, unit) in units.into_iter().enumerate() {
      let continuation = Continuation::new(index, unit.clone(), handler.clone());
      let semaphore = Arc::clone(&semaphore);
      let job = DispatchJob::new(move || async move {
        let _permit = match semaphore.acquire_owned().await {
          Ok(permit) => permit,
          Err(_) => {
            tracing::warn!(index, "worker pool semaphore closed before dispatch");
            return;
          }
        };
        Self::dispatch_unit(unit, continuation).await;
      });
      self.dispatcher.schedule(job).await;
    }

    match options.deadline {
      None => {
        self.barrier.wait().await;
      }
      Some(deadline) => {
        if tokio::time::timeout(deadline, self.barrier.wait()).await.is_err() {
          let mut state = self.state.lock().await;
          let completion = BatchCompletion {
            completed: state.completed,
            total: state.total,
          };
          if let Some(callback) = state.final_callback.take() {
            callback.run(completion).await;
          }
          state.item_callback = None;
          tracing::warn!(
            completed = completion.completed,
            total = completion.total,
            "batch deadline expired"
          );
          return Ok(completion);
        }
      }
    }

    let state = self.state.lock().await;
    Ok(BatchCompletion {
      completed: state.completed,
      total: state.total,
    })
  }

  /// Blocks on the gate until it opens. Pairs with an external [`Coordinator::set`].
  pub async fn wait(&self) {
    self.barrier.wait().await;
  }

  /// Runs `extra` between submission and blocking, then blocks on the gate.
  pub async fn wait_with<F, Fut>(&self, extra: F)
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>, {
    extra().await;
    self.barrier.wait().await;
  }

  /// Opens the gate unconditionally, bypassing the completion count. Escape
  /// hatch for releasing a blocked waiter from outside the batch (abort).
  /// Does not reset the counter; the next `run` resets state itself.
  pub async fn set(&self) {
    self.barrier.signal().await;
  }

  // Per-unit dispatch routine, executed on a pool worker. Faults and panics
  // are routed through the continuation so a failed unit still counts.
  async fn dispatch_unit(unit: WorkUnitHandle, continuation: Continuation) {
    if unit.is_async() {
      match AssertUnwindSafe(unit.process_with(continuation.clone())).catch_unwind().await {
        Ok(Ok(())) => {
          // completion arrives later, through the continuation
        }
        Ok(Err(failure)) => continuation.fail(failure).await,
        Err(payload) => continuation.fail(UnitFailure::panicked(payload)).await,
      }
    } else {
      match AssertUnwindSafe(unit.process()).catch_unwind().await {
        Ok(Ok(())) => continuation.complete().await,
        Ok(Err(failure)) => continuation.fail(failure).await,
        Err(payload) => continuation.fail(UnitFailure::panicked(payload)).await,
      }
    }
  }
}

static_assertions::assert_impl_all!(Coordinator: Send, Sync);
static_assertions::assert_impl_all!(Continuation: Send, Sync);
