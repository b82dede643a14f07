use std::sync::Arc;

use tokio::sync::Mutex;

use crate::listeners::{ListenerHandler, ListenerRegistry};

fn recording_handler(seen: &Arc<Mutex<Vec<String>>>, tag: &str) -> ListenerHandler<String> {
  let seen = Arc::clone(seen);
  let tag = tag.to_string();
  ListenerHandler::new(move |event: String| {
    let seen = Arc::clone(&seen);
    let tag = tag.clone();
    async move {
      seen.lock().await.push(format!("{}:{}", tag, event));
    }
  })
}

#[tokio::test]
async fn test_publish_runs_listeners_in_registration_order() {
  let registry = ListenerRegistry::new();
  let seen = Arc::new(Mutex::new(Vec::new()));

  registry.register("batch.done", recording_handler(&seen, "first"));
  registry.register("batch.done", recording_handler(&seen, "second"));

  registry.publish("batch.done", "a".to_string()).await;

  assert_eq!(*seen.lock().await, vec!["first:a".to_string(), "second:a".to_string()]);
}

#[tokio::test]
async fn test_publish_on_unknown_key_is_a_noop() {
  let registry: ListenerRegistry<String> = ListenerRegistry::new();
  registry.publish("nobody.home", "a".to_string()).await;
  assert_eq!(registry.key_count(), 0);
}

#[tokio::test]
async fn test_remove_by_token_identity() {
  let registry = ListenerRegistry::new();
  let seen = Arc::new(Mutex::new(Vec::new()));

  let first = registry.register("batch.done", recording_handler(&seen, "first"));
  registry.register("batch.done", recording_handler(&seen, "second"));

  assert!(registry.remove(&first));
  assert!(!first.is_active());

  registry.publish("batch.done", "a".to_string()).await;
  assert_eq!(*seen.lock().await, vec!["second:a".to_string()]);
  assert_eq!(registry.listener_count("batch.done"), 1);
}

#[tokio::test]
async fn test_key_is_evicted_when_last_listener_is_removed() {
  let registry = ListenerRegistry::new();
  let seen = Arc::new(Mutex::new(Vec::new()));

  let first = registry.register("batch.done", recording_handler(&seen, "first"));
  let second = registry.register("batch.done", recording_handler(&seen, "second"));
  assert_eq!(registry.key_count(), 1);

  assert!(registry.remove(&first));
  assert_eq!(registry.key_count(), 1);
  assert!(registry.remove(&second));
  assert_eq!(registry.key_count(), 0);
}

#[tokio::test]
async fn test_double_remove_is_rejected() {
  let registry = ListenerRegistry::new();
  let seen = Arc::new(Mutex::new(Vec::new()));

  let token = registry.register("batch.done", recording_handler(&seen, "only"));
  assert!(registry.remove(&token));
  assert!(!registry.remove(&token));
  assert_eq!(registry.key_count(), 0);
}

#[tokio::test]
async fn test_registries_are_independent_per_key() {
  let registry = ListenerRegistry::new();
  let seen = Arc::new(Mutex::new(Vec::new()));

  registry.register("batch.done", recording_handler(&seen, "done"));
  registry.register("batch.aborted", recording_handler(&seen, "aborted"));

  registry.publish("batch.aborted", "x".to_string()).await;

  assert_eq!(*seen.lock().await, vec!["aborted:x".to_string()]);
  assert_eq!(registry.key_count(), 2);
}
