use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use super::aggregate::Dashboard;
use crate::api::{ClientError, MetricRecord, SharedBackend};
use crate::core::AppConfig;
use crate::jobs::{PeriodicJob, PeriodicTask, spawn_periodic_job};

/// Bookkeeping used to throw away responses that arrive too late.
///
/// `epoch` changes every time the poller stops, `seq` increases with
/// every fetch. A response is applied only if it belongs to the current
/// epoch and is newer than whatever was applied last.
#[derive(Default)]
struct Control {
    epoch: u64,
    next_seq: u64,
    applied_seq: u64,
}

struct Shared {
    control: Mutex<Control>,
    dashboard: watch::Sender<Dashboard>,
}

impl Shared {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Reserve a sequence number for a fetch in `epoch`. Returns `None`
    /// when the poller has been stopped since `epoch` started.
    fn issue(&self, epoch: u64) -> Option<u64> {
        let mut control = self.control();
        if control.epoch != epoch {
            return None;
        }
        control.next_seq += 1;
        Some(control.next_seq)
    }

    fn settle(&self, epoch: u64, seq: u64, result: Result<Vec<MetricRecord>, ClientError>) {
        let mut control = self.control();
        if control.epoch != epoch {
            tracing::debug!("Dropping metrics fetch #{} from a stopped poller", seq);
            return;
        }
        let records = match result {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!("Metrics fetch #{} failed, keeping last snapshot: {}", seq, err);
                return;
            }
        };
        if seq <= control.applied_seq {
            tracing::debug!(
                "Dropping metrics fetch #{}, already showing #{}",
                seq,
                control.applied_seq
            );
            return;
        }

        control.applied_seq = seq;
        tracing::debug!("Applying {} metric records from fetch #{}", records.len(), seq);
        // Published while holding the lock so `stop` can't slip in
        // between the check and the update
        self.dashboard.send_replace(Dashboard::from_records(records));
    }
}

async fn fetch(backend: SharedBackend, shared: Arc<Shared>, limit: usize, epoch: u64, seq: u64) {
    let result = backend.recent_metrics(limit).await;
    shared.settle(epoch, seq, result);
}

struct PollJob {
    backend: SharedBackend,
    shared: Arc<Shared>,
    limit: usize,
    period: Duration,
    epoch: u64,
}

#[async_trait]
impl PeriodicJob for PollJob {
    fn interval(&self) -> Duration {
        self.period
    }

    async fn run_job(&self) {
        let Some(seq) = self.shared.issue(self.epoch) else {
            return;
        };
        // Each fetch runs on its own so a slow response never holds
        // up the next tick
        tokio::spawn(fetch(
            self.backend.clone(),
            self.shared.clone(),
            self.limit,
            self.epoch,
            seq,
        ));
    }
}

/// Keeps a window of recent query telemetry fresh by refetching it on a
/// fixed period.
///
/// Every successful fetch replaces the window wholesale and recomputes
/// the summary. Failures are transient: the last good snapshot stays put
/// and polling continues.
pub struct MetricsPoller {
    backend: SharedBackend,
    shared: Arc<Shared>,
    limit: usize,
    period: Duration,
    task: Option<PeriodicTask>,
}

impl MetricsPoller {
    pub fn new(backend: SharedBackend, config: &AppConfig) -> Self {
        let (dashboard, _) = watch::channel(Dashboard::default());
        Self {
            backend,
            shared: Arc::new(Shared {
                control: Mutex::new(Control::default()),
                dashboard,
            }),
            limit: config.metrics_limit,
            period: config.poll_interval,
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    pub fn dashboard(&self) -> Dashboard {
        self.shared.dashboard.borrow().clone()
    }

    /// Receive a new snapshot after every applied fetch.
    pub fn subscribe(&self) -> watch::Receiver<Dashboard> {
        self.shared.dashboard.subscribe()
    }

    /// Fetch right away and then every poll interval. Does nothing if
    /// already running.
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        let epoch = self.shared.control().epoch;
        tracing::debug!(
            "Polling metrics every {:?} (limit {})",
            self.period,
            self.limit
        );
        self.task = Some(spawn_periodic_job(PollJob {
            backend: self.backend.clone(),
            shared: self.shared.clone(),
            limit: self.limit,
            period: self.period,
            epoch,
        }));
    }

    /// Cancel the timer and ignore any fetch still in flight. Safe to
    /// call repeatedly.
    pub fn stop(&mut self) {
        self.shared.control().epoch += 1;
        if let Some(task) = self.task.take() {
            task.cancel();
            tracing::debug!("Stopped polling metrics");
        }
    }

    /// Fetch once outside the timer and return the resulting snapshot.
    pub async fn refresh(&self) -> Result<Dashboard, ClientError> {
        let epoch = self.shared.control().epoch;
        let seq = self.shared.issue(epoch).unwrap_or_default();
        let records = self.backend.recent_metrics(self.limit).await?;
        self.shared.settle(epoch, seq, Ok(records));
        Ok(self.dashboard())
    }
}

impl Drop for MetricsPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
