use std::{future::Future, time::Duration};

use tokio::task::JoinHandle;

/// Quiet period before a suggestion lookup fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Runs an action only after `delay` has passed without another call.
///
/// Each [`call`](Debouncer::call) aborts the pending action, if any, and
/// schedules the new one. There is no trailing queue: only the latest action
/// can ever run. Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn call<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether an action is scheduled or still running.
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
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::time::sleep;

    type Fired = Arc<Mutex<Vec<&'static str>>>;

    fn push(fired: &Fired, value: &'static str) -> impl Future<Output = ()> + Send + use<> {
        let fired = Arc::clone(fired);
        async move { fired.lock().push(value) }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_calls_fires_only_the_last() {
        let fired = Fired::default();
        let mut debouncer = Debouncer::default();

        debouncer.call(push(&fired, "T"));
        sleep(Duration::from_millis(100)).await;
        debouncer.call(push(&fired, "To"));
        sleep(Duration::from_millis(299)).await;
        debouncer.call(push(&fired, "Tor"));

        assert!(fired.lock().is_empty());

        sleep(Duration::from_millis(301)).await;

        assert_eq!(*fired.lock(), vec!["Tor"]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn separated_calls_each_fire() {
        let fired = Fired::default();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.call(push(&fired, "Paris"));
        sleep(Duration::from_millis(350)).await;
        debouncer.call(push(&fired, "Rome"));
        sleep(Duration::from_millis(350)).await;

        assert_eq!(*fired.lock(), vec!["Paris", "Rome"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_action() {
        let fired = Fired::default();
        let mut debouncer = Debouncer::default();

        debouncer.call(push(&fired, "Oslo"));
        assert!(debouncer.is_pending());
        debouncer.cancel();
        sleep(Duration::from_secs(1)).await;

        assert!(fired.lock().is_empty());
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_debouncer_cancels() {
        let fired = Fired::default();

        {
            let mut debouncer = Debouncer::default();
            debouncer.call(push(&fired, "Lima"));
        }
        sleep(Duration::from_secs(1)).await;

        assert!(fired.lock().is_empty());
    }
}
