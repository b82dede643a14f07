use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::listeners::handler::ListenerHandler;
use crate::listeners::token::ListenerToken;

#[derive(Debug, Clone)]
struct ListenerEntry<E> {
  token: ListenerToken,
  handler: ListenerHandler<E>,
}

/// Explicit ordered registry mapping an event key to its listeners.
///
/// Registration yields a [`ListenerToken`]; removal is by token identity, and
/// a key is evicted from the map as soon as its listener list empties.
/// `publish` runs the key's listeners in registration order.
#[derive(Debug, Clone)]
pub struct ListenerRegistry<E> {
  listeners: Arc<DashMap<String, Vec<ListenerEntry<E>>>>,
  counter: Arc<AtomicU64>,
}

impl<E: Clone + Send + Sync + 'static> Default for ListenerRegistry<E> {
  fn default() -> Self {
    Self::new()
  }
}

impl<E: Clone + Send + Sync + 'static> ListenerRegistry<E> {
  pub fn new() -> Self {
    Self {
      listeners: Arc::new(DashMap::new()),
      counter: Arc::new(AtomicU64::new(0)),
    }
  }

  pub fn register(&self, key: &str, handler: ListenerHandler<E>) -> ListenerToken {
    let token = ListenerToken::new(self.counter.fetch_add(1, Ordering::SeqCst), key.to_string());
    self
      .listeners
      .entry(key.to_string())
      .or_default()
      .push(ListenerEntry {
        token: token.clone(),
        handler,
      });
    token
  }

  /// Removes the listener the token was issued for. Returns false when the
  /// token was already removed.
  pub fn remove(&self, token: &ListenerToken) -> bool {
    if !token.deactivate() {
      return false;
    }
    let mut evict = false;
    if let Some(mut entries) = self.listeners.get_mut(token.key()) {
      if let Some(position) = entries.iter().position(|entry| entry.token == *token) {
        // Vec::remove keeps the remaining listeners in registration order
        entries.remove(position);
      }
      evict = entries.is_empty();
    }
    if evict {
      self.listeners.remove_if(token.key(), |_, entries| entries.is_empty());
    }
    true
  }

  pub async fn publish(&self, key: &str, event: E) {
    let handlers: Vec<ListenerHandler<E>> = match self.listeners.get(key) {
      Some(entries) => entries.iter().map(|entry| entry.handler.clone()).collect(),
      None => {
        tracing::debug!(key, "publish on key with no listeners");
        return;
      }
    };
    for handler in handlers {
      handler.run(event.clone()).await;
    }
  }

  pub fn listener_count(&self, key: &str) -> usize {
    self.listeners.get(key).map(|entries| entries.len()).unwrap_or(0)
  }

  pub fn key_count(&self) -> usize {
    self.listeners.len()
  }
}
