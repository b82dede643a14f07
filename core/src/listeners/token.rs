use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Identity handle returned by `ListenerRegistry::register`; removal goes
/// through this handle rather than by comparing callbacks.
#[derive(Debug, Clone)]
pub struct ListenerToken {
  id: u64,
  key: String,
  active: Arc<AtomicBool>,
}

impl ListenerToken {
  pub(crate) fn new(id: u64, key: String) -> Self {
    Self {
      id,
      key,
      active: Arc::new(AtomicBool::new(true)),
    }
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn is_active(&self) -> bool {
    self.active.load(Ordering::SeqCst)
  }

  // First caller wins; later calls see false.
  pub(crate) fn deactivate(&self) -> bool {
    self
      .active
      .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
      .is_ok()
  }
}

impl PartialEq for ListenerToken {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for ListenerToken {}

static_assertions::assert_impl_all!(ListenerToken: Send, Sync);
