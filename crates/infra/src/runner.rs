use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use restock_policy::PolicyOverrides;

use crate::ports::{Clock, InventorySource, NotificationSink};
use crate::replenishment::{NotificationOptions, ReplenishmentCheck};

/// Config for the scheduled replenishment check.
#[derive(Debug, Clone)]
pub struct ScheduledCheck {
    pub interval: Duration,
    /// Notification settings applied to every scheduled run (never a dry run).
    pub notification: NotificationOptions,
    pub run_on_start: bool,
}

impl Default for ScheduledCheck {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
            notification: NotificationOptions::notify(),
            run_on_start: true,
        }
    }
}

impl ScheduledCheck {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.notification.enabled = enabled;
        self
    }

    pub fn with_run_on_start(mut self, run_on_start: bool) -> Self {
        self.run_on_start = run_on_start;
        self
    }

    /// Spawn the runner on the current tokio runtime.
    ///
    /// - Schedule: runs every `interval`
    /// - On demand: `handle.trigger()`
    /// - Failures: logged at `warn`, not retried; the next tick runs normally
    pub fn spawn<I, N, C>(
        &self,
        name: &'static str,
        check: Arc<ReplenishmentCheck<I, N, C>>,
    ) -> ScheduledCheckHandle
    where
        I: InventorySource + 'static,
        N: NotificationSink + 'static,
        C: Clock + 'static,
    {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::channel::<()>(1);

        let mut cfg = self.clone();
        cfg.notification.dry_run = false;
        let join = tokio::spawn(runner_loop(name, cfg, check, shutdown_rx, trigger_rx));

        ScheduledCheckHandle {
            shutdown: Some(shutdown_tx),
            trigger: trigger_tx,
            join: Some(join),
        }
    }
}

/// Handle for a running scheduled check (shutdown + trigger hook).
#[derive(Debug)]
pub struct ScheduledCheckHandle {
    shutdown: Option<oneshot::Sender<()>>,
    trigger: mpsc::Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl ScheduledCheckHandle {
    /// Request a run outside the schedule.
    ///
    /// Triggers are coalesced: while one is pending, further calls are no-ops.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Stop the runner and wait for an in-flight run to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                warn!(error = %e, "replenishment runner task ended abnormally");
            }
        }
    }
}

async fn runner_loop<I, N, C>(
    name: &'static str,
    cfg: ScheduledCheck,
    check: Arc<ReplenishmentCheck<I, N, C>>,
    mut shutdown_rx: oneshot::Receiver<()>,
    mut trigger_rx: mpsc::Receiver<()>,
) where
    I: InventorySource,
    N: NotificationSink,
    C: Clock,
{
    info!(runner = name, interval_secs = cfg.interval.as_secs(), "replenishment runner started");

    let start = if cfg.run_on_start {
        Instant::now()
    } else {
        Instant::now() + cfg.interval
    };
    let mut ticker = tokio::time::interval_at(start, cfg.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let overrides = PolicyOverrides::default();

    loop {
        // Shutdown has priority; a dropped handle also stops the runner.
        tokio::select! {
            biased;
            _ = &mut shutdown_rx => break,
            _ = ticker.tick() => {}
            Some(()) = trigger_rx.recv() => {}
        }

        match check.execute(&overrides, &cfg.notification).await {
            Ok(summary) => info!(
                runner = name,
                checked = summary.checked_count,
                needs_replenishment = summary.notified_count,
                "scheduled replenishment check completed"
            ),
            Err(e) => warn!(runner = name, error = %e, "scheduled replenishment check failed"),
        }
    }

    info!(runner = name, "replenishment runner stopped");
}
