//! Monitor spawning

use std::{sync::Arc, time::Duration};

use monitor::{GovernanceMonitor, HealthMonitor, Monitor, UpgradeMonitor};
use store::Repository;
use tokio::task::JoinHandle;
use tracing::info;

/// Monitoring methods for the Driver
impl crate::driver::Driver {
    /// Spawn the health, governance and upgrade monitors.
    ///
    /// Each monitor runs in its own task and owns its cache.
    pub fn start_monitors(&self) -> Vec<JoinHandle<()>> {
        let repository: Arc<dyn Repository> = Arc::new(self.repository.clone());
        let opts = &self.monitor;

        info!(
            threshold = opts.missed_blocks_threshold,
            validator_secs = opts.validator_poll_interval_secs,
            governance_secs = opts.governance_poll_interval_secs,
            upgrade_secs = opts.upgrade_poll_interval_secs,
            "starting monitors"
        );

        vec![
            HealthMonitor::new(
                self.registry.clone(),
                self.client.clone(),
                repository.clone(),
                self.notifier.clone(),
                opts.missed_blocks_threshold,
                Duration::from_secs(opts.validator_poll_interval_secs),
            )
            .spawn(),
            GovernanceMonitor::new(
                self.registry.clone(),
                self.client.clone(),
                repository.clone(),
                self.notifier.clone(),
                Duration::from_secs(opts.governance_poll_interval_secs),
            )
            .spawn(),
            UpgradeMonitor::new(
                self.registry.clone(),
                self.client.clone(),
                repository,
                self.notifier.clone(),
                Duration::from_secs(opts.upgrade_poll_interval_secs),
            )
            .spawn(),
        ]
    }
}
