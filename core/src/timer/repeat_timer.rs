use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{interval, Duration};

use crate::coordinator::{DispatchJob, Dispatcher, DispatcherHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerState {
  Running,
  Paused,
  Stopped,
}

/// Periodic timer whose fire handler checks explicit state on every tick.
///
/// Pause and resume are mutations of [`TimerState`] under a mutex, read by
/// the fire loop at each tick; a paused timer keeps ticking but skips its
/// handler, and a stopped timer exits the loop for good.
#[derive(Debug, Clone)]
pub struct RepeatTimer {
  state: Arc<Mutex<TimerState>>,
}

impl RepeatTimer {
  pub async fn start<F, Fut>(dispatcher: DispatcherHandle, period: Duration, mut on_fire: F) -> Self
  where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static, {
    let timer = Self {
      state: Arc::new(Mutex::new(TimerState::Running)),
    };

    let state = Arc::clone(&timer.state);
    dispatcher
      .schedule(DispatchJob::new(move || async move {
        let mut interval = interval(period);
        loop {
          interval.tick().await;
          let current = state.lock().await.clone();
          match current {
            TimerState::Stopped => break,
            TimerState::Paused => continue,
            TimerState::Running => on_fire().await,
          }
        }
        tracing::debug!("repeat timer stopped");
      }))
      .await;

    timer
  }

  pub async fn pause(&self) {
    let mut state = self.state.lock().await;
    if *state == TimerState::Running {
      *state = TimerState::Paused;
    }
  }

  pub async fn resume(&self) {
    let mut state = self.state.lock().await;
    if *state == TimerState::Paused {
      *state = TimerState::Running;
    }
  }

  /// Terminal: a stopped timer cannot be resumed.
  pub async fn stop(&self) {
    let mut state = self.state.lock().await;
    *state = TimerState::Stopped;
  }

  pub async fn state(&self) -> TimerState {
    self.state.lock().await.clone()
  }
}

static_assertions::assert_impl_all!(RepeatTimer: Send, Sync);
