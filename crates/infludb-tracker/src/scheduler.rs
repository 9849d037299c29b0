//! Periodic `update_all` on a fixed interval.
//!
//! The engine has a shutdown callback but no start callback.
//! [`SchedulerState::Running`] is therefore published by
//! [`ScrapeScheduler::start`] once `JobScheduler::start` has returned `Ok`.
//! [`SchedulerState::Stopped`] is published from the engine's shutdown
//! handler.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler};

use infludb_core::OverlapPolicy;

use crate::error::SchedulerError;
use crate::tracker::Tracker;

type ShutdownFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// Runs [`Tracker::update_all`] every `interval` on a `JobScheduler`.
///
/// `Running` is set by [`start`](Self::start) after the engine's own start
/// returns. `Stopped` is set by the engine's shutdown handler, so it
/// follows [`shutdown`](Self::shutdown) and any engine-initiated stop.
pub struct ScrapeScheduler {
    tracker: Arc<Tracker>,
    interval: Duration,
    overlap: OverlapPolicy,
    state: Arc<watch::Sender<SchedulerState>>,
    engine: Mutex<Option<JobScheduler>>,
    batch_gate: Arc<Mutex<()>>,
}

impl ScrapeScheduler {
    #[must_use]
    pub fn new(tracker: Arc<Tracker>, interval: Duration, overlap: OverlapPolicy) -> Self {
        let (state, _) = watch::channel(SchedulerState::Stopped);
        Self {
            tracker,
            interval,
            overlap,
            state: Arc::new(state),
            engine: Mutex::new(None),
            batch_gate: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    /// Watch state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    /// Start the periodic job. No-op if already running.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Engine`] if the engine cannot be created,
    /// the job cannot be registered, or the engine fails to start.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut engine = self.engine.lock().await;
        if engine.is_some() {
            tracing::debug!("scheduler already running; start ignored");
            return Ok(());
        }

        let mut scheduler = JobScheduler::new().await?;

        let state = Arc::clone(&self.state);
        scheduler.set_shutdown_handler(Box::new(move || -> ShutdownFuture {
            let state = Arc::clone(&state);
            Box::pin(async move {
                state.send_replace(SchedulerState::Stopped);
                tracing::info!("scheduler: stopped");
            })
        }));

        let tracker = Arc::clone(&self.tracker);
        let gate = Arc::clone(&self.batch_gate);
        let overlap = self.overlap;
        let job = Job::new_repeated_async(self.interval, move |_uuid, _lock| {
            let tracker = Arc::clone(&tracker);
            let gate = Arc::clone(&gate);

            Box::pin(async move {
                run_scheduled_batch(&tracker, gate, overlap).await;
            })
        })?;
        scheduler.add(job).await?;

        scheduler.start().await?;
        // No engine start callback exists; publish after start returns.
        self.state.send_replace(SchedulerState::Running);
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            overlap = %self.overlap,
            "scheduler: started"
        );

        *engine = Some(scheduler);
        Ok(())
    }

    /// Stop the periodic job. No-op if not running. A batch already in
    /// progress runs to completion.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Engine`] if the engine fails to shut down.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        let mut engine = self.engine.lock().await;
        let Some(mut scheduler) = engine.take() else {
            tracing::debug!("scheduler not running; shutdown ignored");
            return Ok(());
        };
        scheduler.shutdown().await?;
        Ok(())
    }
}

async fn run_scheduled_batch(tracker: &Tracker, gate: Arc<Mutex<()>>, overlap: OverlapPolicy) {
    let _guard = match overlap {
        OverlapPolicy::Allow => None,
        OverlapPolicy::Skip => {
            if let Ok(guard) = gate.try_lock_owned() {
                Some(guard)
            } else {
                tracing::warn!("scheduler: previous batch still running; skipping this tick");
                return;
            }
        }
    };

    tracing::info!("scheduler: starting scheduled update");
    match tracker.update_all().await {
        Ok(report) => tracing::info!(
            total = report.total(),
            succeeded = report.succeeded,
            failed = report.failed,
            failed_platform = report.failed_platform,
            "scheduler: scheduled update complete"
        ),
        Err(e) => tracing::error!(error = %e, "scheduler: scheduled update failed"),
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod tests;
