use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

// Callback run for every published event of a key. Typed over the event,
// so listeners never downcast.
#[derive(Clone)]
pub struct ListenerHandler<E>(Arc<dyn Fn(E) -> BoxFuture<'static, ()> + Send + Sync + 'static>);

impl<E> Debug for ListenerHandler<E> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ListenerHandler").finish()
  }
}

impl<E: Send + 'static> ListenerHandler<E> {
  pub fn new<F, Fut>(f: F) -> Self
  where
    F: Fn(E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static, {
    Self(Arc::new(move |event| Box::pin(f(event)) as BoxFuture<'static, ()>))
  }

  pub async fn run(&self, event: E) {
    (self.0)(event).await
  }
}
