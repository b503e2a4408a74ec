use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{error, info};

/// A periodic check loop.
///
/// Each monitor owns its state and runs on its own task, so a slow cycle delays the next tick
/// instead of overlapping it.
#[async_trait]
pub trait Monitor: Send + Sized + 'static {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Gets the polling interval for the monitor
    fn get_interval(&self) -> Duration;

    /// Runs a single cycle
    async fn check(&mut self) -> Result<()>;

    /// Runs the monitor in a loop
    async fn run(mut self) -> Result<()> {
        let mut interval = tokio::time::interval(self.get_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(monitor = self.name(), interval_secs = self.get_interval().as_secs(), "monitor started");
        loop {
            interval.tick().await;
            if let Err(e) = self.check().await {
                error!(monitor = self.name(), error = %e, "monitoring cycle failed");
            }
        }
    }

    /// Spawns the monitor on the Tokio runtime
    fn spawn(self) -> JoinHandle<()> {
        let monitor_name = self.name();
        tokio::spawn(async move {
            if let Err(e) = self.run().await {
                error!(%e, monitor = monitor_name, "monitor exited unexpectedly");
            }
        })
    }
}
