//! One-shot and daemon execution over all configured zones

use super::reconciler::Reconciler;
use super::report::{PassReport, ZoneFailure};
use crate::config::{DdnsConfig, ZoneConfig};
use crate::error::{Error, Result};
use crate::logging::LogContext;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

/// Runs the reconciler over every zone, once or on an interval
///
/// Zones are processed one at a time, in configuration order. A zone that
/// fails is logged and recorded in the [`PassReport`]; the remaining zones
/// still run.
pub struct Scheduler {
    reconciler: Reconciler,
    zones: Vec<ZoneConfig>,

    /// Sleep between successful passes
    interval: Duration,

    /// Sleep after a failed pass
    retry_delay: Duration,

    log: LogContext,
}

impl Scheduler {
    /// Create a scheduler for the zones and timing in `config`
    ///
    /// The scheduler logs through the reconciler's context.
    pub fn new(reconciler: Reconciler, config: &DdnsConfig) -> Self {
        let log = reconciler.log_context().clone();
        Self {
            reconciler,
            zones: config.zones.clone(),
            interval: config.daemon.interval(),
            retry_delay: config.daemon.retry_delay(),
            log,
        }
    }

    /// Override the daemon timing
    pub fn with_timing(mut self, interval: Duration, retry_delay: Duration) -> Self {
        self.interval = interval;
        self.retry_delay = retry_delay;
        self
    }

    /// Run a single pass over every zone
    ///
    /// # Returns
    ///
    /// - `Ok(PassReport)`: At least one zone was reconciled (or none are configured)
    /// - `Err(Error)`: Every configured zone failed
    pub async fn run_once(&self) -> Result<PassReport> {
        self.log.scope(self.pass()).await
    }

    /// Run passes until `shutdown` resolves
    ///
    /// After a successful pass the scheduler sleeps for the interval; after a
    /// failed pass it sleeps for the retry delay. `shutdown` interrupts both
    /// a running pass and a sleep.
    ///
    /// # Returns
    ///
    /// The number of passes that ran to completion.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        self.log.scope(self.daemon(shutdown)).await
    }

    async fn pass(&self) -> Result<PassReport> {
        info!("Starting DDNS update");

        let mut report = PassReport::default();
        for zone in &self.zones {
            match self.reconciler.reconcile_zone(zone).await {
                Ok(zone_report) => report.zones.push(zone_report),
                Err(error) => {
                    // already reported as a warning by the reconciler
                    if !matches!(error, Error::NoAddress(_)) {
                        error!("Error processing zone {}: {}", zone.domain, error);
                    }
                    report.failures.push(ZoneFailure {
                        zone_id: zone.zone_id,
                        domain: zone.domain.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            "DDNS update completed: {} zone(s) reconciled, {} failed, {} change(s)",
            report.zones.len(),
            report.failures.len(),
            report.mutations()
        );

        if report.all_failed() {
            return Err(Error::Other(format!(
                "all {} zone(s) failed this pass",
                report.failures.len()
            )));
        }
        Ok(report)
    }

    async fn daemon<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(
            "Starting DDNS daemon (interval: {}s)",
            self.interval.as_secs()
        );

        let mut passes = 0;
        loop {
            let delay = tokio::select! {
                result = self.pass() => {
                    passes += 1;
                    match result {
                        Ok(_) => self.interval,
                        Err(e) => {
                            error!(
                                "Daemon error: {} (retrying in {}s)",
                                e,
                                self.retry_delay.as_secs()
                            );
                            self.retry_delay
                        }
                    }
                }
                _ = &mut shutdown => break,
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown => break,
            }
        }

        info!("DDNS daemon stopped");
        passes
    }
}
