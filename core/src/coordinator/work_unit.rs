use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::coordinator::coordinator::Continuation;
use crate::coordinator::errors::UnitFailure;

/// The smallest schedulable item submitted to the coordinator.
///
/// A unit is either synchronous or asynchronous, selected by
/// [`WorkUnit::is_async`]:
///
/// - synchronous units implement [`WorkUnit::process`]; returning means the
///   work is done and the coordinator counts the unit complete inline with
///   the dispatching worker;
/// - asynchronous units implement [`WorkUnit::process_with`] and MUST invoke
///   the given continuation exactly once when their (possibly
///   externally-triggered) work finishes — on any thread, at any later time.
///   Invoking it more than once is absorbed by the coordinator; invoking it
///   zero times hangs the batch.
///
/// Returning `Err` from either method marks the unit failed without aborting
/// its siblings.
#[async_trait]
pub trait WorkUnit: Debug + Send + Sync + 'static {
  fn is_async(&self) -> bool {
    false
  }

  async fn process(&self) -> Result<(), UnitFailure> {
    Err(UnitFailure::failed("process is not implemented for this unit"))
  }

  async fn process_with(&self, continuation: Continuation) -> Result<(), UnitFailure> {
    let _ = continuation;
    Err(UnitFailure::failed("process_with is not implemented for this unit"))
  }
}

#[derive(Debug, Clone)]
pub struct WorkUnitHandle(Arc<dyn WorkUnit>);

impl WorkUnitHandle {
  pub fn new_arc(unit: Arc<dyn WorkUnit>) -> Self {
    Self(unit)
  }

  pub fn new(unit: impl WorkUnit + 'static) -> Self {
    Self(Arc::new(unit))
  }
}

#[async_trait]
impl WorkUnit for WorkUnitHandle {
  fn is_async(&self) -> bool {
    self.0.is_async()
  }

  async fn process(&self) -> Result<(), UnitFailure> {
    self.0.process().await
  }

  async fn process_with(&self, continuation: Continuation) -> Result<(), UnitFailure> {
    self.0.process_with(continuation).await
  }
}

static_assertions::assert_impl_all!(WorkUnitHandle: Send, Sync);
