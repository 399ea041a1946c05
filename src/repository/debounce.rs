//! Delayed, collapsible task scheduling.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs a task after a delay; scheduling again replaces the pending task.
///
/// Dropping the debouncer cancels whatever is still pending.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run after `delay`, cancelling any pending task.
    pub fn schedule<F>(&mut self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        }));
    }

    /// Cancel the pending task. Returns true if one was still waiting or running.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let live = !handle.is_finished();
                handle.abort();
                live
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter_task(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_schedules_collapse() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new();

        for _ in 0..5 {
            debouncer.schedule(Duration::from_millis(100), counter_task(&runs));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending() {
        let runs = Arc::new(AtomicUsize::new(0));
        {
            let mut debouncer = Debouncer::new();
            debouncer.schedule(Duration::from_millis(100), counter_task(&runs));
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_reports_pending() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new();
        assert!(!debouncer.cancel());

        debouncer.schedule(Duration::from_millis(100), counter_task(&runs));
        assert!(debouncer.cancel());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
