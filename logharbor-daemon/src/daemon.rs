//! Daemon lifecycle -- collector assembly, signal handling, and shutdown.
//!
//! The [`Daemon`] owns one [`SyslogCollector`] wired to a message handler.
//! `run()` starts the collector and blocks until SIGINT/SIGTERM or until
//! the collector exits on its own (for example a bind failure).

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::broadcast;

use logharbor_collector::{SyslogCollector, SyslogCollectorConfig};
use logharbor_core::config::LogharborConfig;
use logharbor_core::handler::MessageHandler;

use crate::metrics_server;

/// Interval between uptime gauge updates.
const UPTIME_UPDATE_INTERVAL: Duration = Duration::from_secs(10);

/// The collector daemon.
pub struct Daemon {
    /// Loaded and validated configuration.
    config: LogharborConfig,
    /// The syslog collector.
    collector: Arc<SyslogCollector>,
    /// Daemon start time (for uptime reporting).
    start_time: Instant,
}

impl Daemon {
    /// Build the daemon from an already-loaded configuration.
    ///
    /// Installs the Prometheus recorder when `[metrics].enabled` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The metrics recorder cannot be installed
    pub fn build_from_config(
        config: LogharborConfig,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        let collector_config = SyslogCollectorConfig::from_core(&config.collector)
            .map_err(|e| anyhow::anyhow!("invalid collector config: {}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
            record_daemon_metrics();
        }

        let collector = SyslogCollector::new(collector_config, handler)
            .map_err(|e| anyhow::anyhow!("failed to build collector: {}", e))?;

        tracing::info!(
            address = %collector.config().bind_addr,
            protocol = %collector.config().protocol,
            "daemon initialized"
        );

        Ok(Self {
            config,
            collector: Arc::new(collector),
            start_time: Instant::now(),
        })
    }

    /// Run until SIGINT or SIGTERM.
    pub async fn run(&self) -> Result<()> {
        self.run_until(wait_for_shutdown_signal()).await
    }

    /// Run until `shutdown` resolves or the collector exits.
    ///
    /// `shutdown` yields the name of the trigger for logging.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = Result<&'static str>>,
    {
        let (shutdown_tx, _) = broadcast::channel(1);

        let uptime_task = self
            .config
            .metrics
            .enabled
            .then(|| spawn_uptime_updater(self.start_time, shutdown_tx.subscribe()));

        let collector = Arc::clone(&self.collector);
        let mut collector_task = tokio::spawn(async move { collector.start().await });

        tracing::info!("logharbor-daemon running");

        let result = tokio::select! {
            joined = &mut collector_task => {
                // collector exited without a shutdown request (e.g. bind failure)
                let _ = shutdown_tx.send(());
                match joined {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(anyhow::anyhow!("collector failed: {}", e)),
                    Err(e) => Err(anyhow::anyhow!("collector task panicked: {}", e)),
                }
            }
            signal = shutdown => {
                match signal {
                    Ok(signal) => tracing::info!(signal = signal, "shutdown signal received"),
                    Err(e) => tracing::error!(error = %e, "shutdown trigger failed, stopping"),
                }
                let _ = shutdown_tx.send(());
                self.collector.stop();
                collector_task
                    .await
                    .map_err(|e| anyhow::anyhow!("collector task panicked: {}", e))?
                    .map_err(|e| anyhow::anyhow!("collector failed: {}", e))
            }
        };

        if let Some(task) = uptime_task {
            let _ = task.await;
        }

        tracing::info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            "logharbor-daemon shut down"
        );
        result
    }

    /// The running collector (exposes bound addresses).
    pub fn collector(&self) -> &SyslogCollector {
        &self.collector
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &LogharborConfig {
        &self.config
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

fn record_daemon_metrics() {
    use logharbor_core::metrics as m;

    metrics::gauge!(m::DAEMON_BUILD_INFO, "version" => env!("CARGO_PKG_VERSION")).set(1.0);
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "daemon metrics recorded");
}

/// Spawn a background task that periodically updates the uptime metric.
fn spawn_uptime_updater(
    start_time: Instant,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    use logharbor_core::metrics as m;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(UPTIME_UPDATE_INTERVAL);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    metrics::gauge!(m::DAEMON_UPTIME_SECONDS).set(start_time.elapsed().as_secs_f64());
                }
                _ = shutdown_rx.recv() => {
                    tracing::debug!("uptime updater stopped");
                    break;
                }
            }
        }
    })
}
