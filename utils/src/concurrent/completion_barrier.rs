use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_condvar::Condvar;


/// A reusable binary gate with manual-reset semantics.
///
/// The gate is either open or closed. [`CompletionBarrier::wait`] suspends the
/// caller while the gate is closed and, upon observing it open, closes it
/// again before returning, so a reused gate always starts its next cycle
/// closed. [`CompletionBarrier::signal`] opens the gate and wakes the waiter;
/// signaling an already open gate is a no-op.
///
/// Single-consumer: at most one task may block in `wait` at a time.
#[derive(Clone)]
pub struct CompletionBarrier {
  open: Arc<Mutex<bool>>,
  condvar: Arc<Condvar>,
}

impl Debug for CompletionBarrier {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CompletionBarrier").finish()
  }
}

impl PartialEq for CompletionBarrier {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.open, &other.open)
  }
}

impl Eq for CompletionBarrier {}

impl Default for CompletionBarrier {
  fn default() -> Self {
    Self::new(true)
  }
}

impl CompletionBarrier {
  pub fn new(open: bool) -> Self {
    Self {
      open: Arc::new(Mutex::new(open)),
      condvar: Arc::new(Condvar::new()),
    }
  }

  /// Blocks until the gate is open, then closes it again before returning.
  pub async fn wait(&self) {
    let mut open = self.open.lock().await;
    while !*open {
      open = self.condvar.wait(open).await;
    }
    *open = false;
  }

  /// Opens the gate, releasing a blocked `wait`. Idempotent when already open.
  pub async fn signal(&self) {
    let mut open = self.open.lock().await;
    *open = true;
    self.condvar.notify_all();
  }

  /// Closes the gate without waiting.
  pub async fn reset(&self) {
    let mut open = self.open.lock().await;
    *open = false;
  }

  pub async fn is_open(&self) -> bool {
    *self.open.lock().await
  }
}
