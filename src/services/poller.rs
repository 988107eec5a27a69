use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;

/// A repeating background task with an explicit handle. Both engines run
/// their refresh loops through this, so polling is always started and stopped
/// via the same lifecycle instead of detached spawns.
pub struct Poller {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn spawn<F, Fut>(name: &'static str, every: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(every);

            loop {
                interval.tick().await;
                tick().await;
            }
        });

        tracing::debug!("{} poller started, every {}s", name, every.as_secs());

        Self { name, handle }
    }

    pub fn stop(self) {
        self.handle.abort();
        tracing::debug!("{} poller stopped", self.name);
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
