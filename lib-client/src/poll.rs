//! Scoped interval polling
//!
//! The polling task is owned by its [`PollHandle`]; dropping the handle aborts
//! the task on every exit path.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::Result;

pub struct PollHandle<T> {
    rx: watch::Receiver<Option<T>>,
    task: JoinHandle<()>,
}

impl<T: Clone> PollHandle<T> {
    /// Most recent successful value
    pub fn latest(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.rx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Wait until polling stops (terminal value or cancellation)
    pub async fn wait_terminal(&mut self) -> Option<T> {
        while self.rx.changed().await.is_ok() {}
        self.rx.borrow().clone()
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Poll `fetch` every `interval` until `is_terminal` holds
///
/// The first fetch happens immediately. Fetch errors are logged and the loop
/// continues.
pub fn spawn_poll<T, F, Fut, P>(interval: Duration, mut fetch: F, is_terminal: P) -> PollHandle<T>
where
    T: Clone + Send + Sync + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send,
    P: Fn(&T) -> bool + Send + 'static,
{
    let (tx, rx) = watch::channel(None);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match fetch().await {
                Ok(value) => {
                    let done = is_terminal(&value);
                    tx.send_replace(Some(value));
                    if done {
                        debug!("Poll reached terminal value");
                        break;
                    }
                }
                Err(e) => warn!("Poll fetch failed: {}", e),
            }
        }
    });

    PollHandle { rx, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_stops_on_terminal() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let mut handle = spawn_poll(
            Duration::from_millis(1),
            move || {
                let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok(n) }
            },
            |n| *n >= 3,
        );

        assert_eq!(handle.wait_terminal().await, Some(3));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_errors_do_not_stop_polling() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let mut handle = spawn_poll(
            Duration::from_millis(1),
            move || {
                let n = c.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(ClientError::Transport("flaky".into()))
                    } else {
                        Ok("done")
                    }
                }
            },
            |_| true,
        );

        assert_eq!(handle.wait_terminal().await, Some("done"));
    }

    #[tokio::test]
    async fn test_drop_aborts_task() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        let handle = spawn_poll(
            Duration::from_millis(1),
            move || {
                c.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            },
            |_| false,
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(handle);

        let after_drop = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(counter.load(Ordering::SeqCst) <= after_drop + 1);
    }
}
