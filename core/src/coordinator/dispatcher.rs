use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::runtime::{Builder, Runtime};

#[cfg(test)]
mod tests;

/// A single scheduled piece of work: an erased async closure run once on
/// whichever worker the dispatcher picks.
pub struct DispatchJob(Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send + 'static>);

impl DispatchJob {
  pub fn new<F, Fut>(f: F) -> Self
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static, {
    Self(Box::new(move || Box::pin(f()) as BoxFuture<'static, ()>))
  }

  pub async fn run(self) {
    (self.0)().await;
  }
}

/// The worker-pool seam: the coordinator hands jobs to a dispatcher and does
/// not care where they execute.
#[async_trait]
pub trait Dispatcher: Debug + Send + Sync + 'static {
  async fn schedule(&self, job: DispatchJob);
}

#[derive(Debug, Clone)]
pub struct DispatcherHandle(Arc<dyn Dispatcher>);

impl DispatcherHandle {
  pub fn new_arc(dispatcher: Arc<dyn Dispatcher>) -> Self {
    Self(dispatcher)
  }

  pub fn new(dispatcher: impl Dispatcher + 'static) -> Self {
    Self(Arc::new(dispatcher))
  }
}

#[async_trait]
impl Dispatcher for DispatcherHandle {
  async fn schedule(&self, job: DispatchJob) {
    self.0.schedule(job).await;
  }
}

// --- TokioContextDispatcher implementation

/// Spawns jobs onto the ambient Tokio runtime. The default dispatcher.
#[derive(Debug, Clone, Default)]
pub struct TokioContextDispatcher;

impl TokioContextDispatcher {
  pub fn new() -> Self {
    Self
  }
}

#[async_trait]
impl Dispatcher for TokioContextDispatcher {
  async fn schedule(&self, job: DispatchJob) {
    tokio::spawn(job.run());
  }
}

// --- DedicatedRuntimeDispatcher implementation

/// Dispatcher that executes jobs on a dedicated multi-thread runtime with a
/// fixed number of worker threads.
///
/// The internal runtime is owned via `Option<Arc<Runtime>>`. When the last
/// clone of this dispatcher is dropped, the runtime is shut down with
/// `shutdown_background()` so worker threads do not outlive their owner.
#[derive(Debug, Clone)]
pub struct DedicatedRuntimeDispatcher {
  runtime: Option<Arc<Runtime>>,
}

impl DedicatedRuntimeDispatcher {
  pub fn new(worker_threads: usize) -> Result<Self, std::io::Error> {
    let runtime = Builder::new_multi_thread()
      .worker_threads(worker_threads.max(1))
      .enable_all()
      .build()?;
    Ok(Self {
      runtime: Some(Arc::new(runtime)),
    })
  }
}

#[async_trait]
impl Dispatcher for DedicatedRuntimeDispatcher {
  async fn schedule(&self, job: DispatchJob) {
    if let Some(runtime) = &self.runtime {
      runtime.spawn(job.run());
    } else {
      tracing::warn!("DedicatedRuntimeDispatcher runtime already shut down");
    }
  }
}

impl Drop for DedicatedRuntimeDispatcher {
  fn drop(&mut self) {
    if let Some(runtime_arc) = self.runtime.take() {
      if Arc::strong_count(&runtime_arc) == 1 {
        if let Ok(runtime) = Arc::try_unwrap(runtime_arc) {
          runtime.shutdown_background();
        }
      }
    }
  }
}

// --- CurrentThreadDispatcher implementation

/// Runs each job inline on the scheduling task. Deterministic, useful in
/// tests; asynchronous units that park waiting for an external continuation
/// must not be dispatched through this.
#[derive(Debug, Clone, Default)]
pub struct CurrentThreadDispatcher;

impl CurrentThreadDispatcher {
  pub fn new() -> Self {
    Self
  }
}

#[async_trait]
impl Dispatcher for CurrentThreadDispatcher {
  async fn schedule(&self, job: DispatchJob) {
    job.run().await
  }
}
