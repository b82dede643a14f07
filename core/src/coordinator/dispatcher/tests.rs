use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::coordinator::{
  CurrentThreadDispatcher, DedicatedRuntimeDispatcher, DispatchJob, Dispatcher, DispatcherHandle,
  TokioContextDispatcher,
};

#[tokio::test]
async fn test_tokio_context_dispatcher_runs_job() {
  let dispatcher = TokioContextDispatcher::new();
  let counter = Arc::new(AtomicUsize::new(0));
  let counter_clone = Arc::clone(&counter);

  dispatcher
    .schedule(DispatchJob::new(move || async move {
      counter_clone.fetch_add(1, Ordering::SeqCst);
    }))
    .await;

  tokio::time::sleep(Duration::from_millis(50)).await;
  assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_current_thread_dispatcher_runs_inline() {
  let dispatcher = CurrentThreadDispatcher::new();
  let counter = Arc::new(AtomicUsize::new(0));
  let counter_clone = Arc::clone(&counter);

  dispatcher
    .schedule(DispatchJob::new(move || async move {
      counter_clone.fetch_add(1, Ordering::SeqCst);
    }))
    .await;

  // inline execution: the job has already run when schedule returns
  assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_dedicated_runtime_dispatcher_runs_jobs_on_own_pool() {
  let dispatcher = DedicatedRuntimeDispatcher::new(2).unwrap();
  let handle = DispatcherHandle::new(dispatcher);
  let counter = Arc::new(AtomicUsize::new(0));

  for _ in 0..4 {
    let counter_clone = Arc::clone(&counter);
    handle
      .schedule(DispatchJob::new(move || async move {
        counter_clone.fetch_add(1, Ordering::SeqCst);
      }))
      .await;
  }

  tokio::time::sleep(Duration::from_millis(100)).await;
  assert_eq!(counter.load(Ordering::SeqCst), 4);
}
