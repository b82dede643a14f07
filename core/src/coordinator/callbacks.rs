use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::coordinator::errors::UnitFailure;
use crate::coordinator::work_unit::WorkUnitHandle;

/// The result of one dispatched unit, delivered to the item callback.
#[derive(Debug, Clone)]
pub struct UnitOutcome {
  /// The unit's position in the submitted batch.
  pub index: usize,
  pub unit: WorkUnitHandle,
  /// `Some` when the unit's processing faulted; the unit still counts toward
  /// batch completion.
  pub error: Option<UnitFailure>,
}

impl UnitOutcome {
  pub fn is_failure(&self) -> bool {
    self.error.is_some()
  }
}

/// Summary handed to the final callback and returned from `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCompletion {
  pub completed: usize,
  pub total: usize,
}

impl BatchCompletion {
  /// True when a deadline expired before every unit signaled.
  pub fn is_partial(&self) -> bool {
    self.completed < self.total
  }
}

// Callback invoked once per unit, in completion order.
#[derive(Clone)]
pub struct ItemCallback(Arc<dyn Fn(UnitOutcome) -> BoxFuture<'static, ()> + Send + Sync + 'static>);

impl Debug for ItemCallback {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ItemCallback").finish()
  }
}

impl ItemCallback {
  pub fn new<F, Fut>(f: F) -> Self
  where
    F: Fn(UnitOutcome) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static, {
    Self(Arc::new(move |outcome| Box::pin(f(outcome)) as BoxFuture<'static, ()>))
  }

  pub async fn run(&self, outcome: UnitOutcome) {
    (self.0)(outcome).await
  }
}

// Callback invoked exactly once per batch, strictly after every item callback.
#[derive(Clone)]
pub struct FinalCallback(Arc<dyn Fn(BatchCompletion) -> BoxFuture<'static, ()> + Send + Sync + 'static>);

impl Debug for FinalCallback {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FinalCallback").finish()
  }
}

impl FinalCallback {
  pub fn new<F, Fut>(f: F) -> Self
  where
    F: Fn(BatchCompletion) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static, {
    Self(Arc::new(move |completion| Box::pin(f(completion)) as BoxFuture<'static, ()>))
  }

  pub async fn run(&self, completion: BatchCompletion) {
    (self.0)(completion).await
  }
}

static_assertions::assert_impl_all!(ItemCallback: Send, Sync);
static_assertions::assert_impl_all!(FinalCallback: Send, Sync);
