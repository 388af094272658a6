use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Work that runs on a fixed period until its task is cancelled.
#[async_trait]
pub trait PeriodicJob: Send + Sync + 'static {
    fn interval(&self) -> Duration;

    async fn run_job(&self);
}

/// Handle to a running periodic job. Cancelling is idempotent and
/// dropping the handle cancels the job.
#[derive(Debug)]
pub struct PeriodicTask {
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Run `job` right away and then once every `job.interval()`. A slow
/// run delays the following ticks rather than bunching them up.
pub fn spawn_periodic_job<J: PeriodicJob>(job: J) -> PeriodicTask {
    let period = job.interval();
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            // The first tick completes immediately
            ticker.tick().await;
            job.run_job().await;
        }
    });
    PeriodicTask { handle }
}
