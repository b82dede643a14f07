use thiserror::Error;

/// Rejected configuration, surfaced synchronously to the `run` caller before
/// any dispatch occurs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
  #[error("pool capacity must be at least 1, got {0}")]
  InvalidPoolCapacity(usize),
}

/// A per-unit processing fault. Unit failures never abort sibling units; they
/// are carried in the unit's outcome and counted like any other completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitFailure {
  #[error("work unit failed: {0}")]
  Failed(String),
  #[error("work unit panicked: {0}")]
  Panicked(String),
}

impl UnitFailure {
  pub fn failed(message: impl Into<String>) -> Self {
    UnitFailure::Failed(message.into())
  }

  pub fn panicked(payload: Box<dyn std::any::Any + Send>) -> Self {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
      (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
      s.clone()
    } else {
      "unknown panic payload".to_string()
    };
    UnitFailure::Panicked(message)
  }
}

static_assertions::assert_impl_all!(CoordinatorError: Send, Sync);
static_assertions::assert_impl_all!(UnitFailure: Send, Sync);
