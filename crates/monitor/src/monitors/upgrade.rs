use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chainio::ChainClient;
use config::{ChainConfig, ChainRegistry};
use derive_more::Debug;
use eyre::Result;
use notifier::Notifier;
use store::Repository;
use tracing::{debug, info, warn};

use crate::{
    base_monitor::Monitor,
    classifier::{UpgradeEvent, UpgradeTracker, blocks_remaining},
    dispatch::fan_out,
    format,
};

/// Watches the scheduled upgrade plan of each chain.
#[derive(Debug)]
pub struct UpgradeMonitor {
    registry: Arc<ChainRegistry>,
    client: ChainClient,
    #[debug(skip)]
    repository: Arc<dyn Repository>,
    #[debug(skip)]
    notifier: Arc<dyn Notifier>,
    trackers: HashMap<String, UpgradeTracker>,
    interval: Duration,
}

impl UpgradeMonitor {
    /// Create a new upgrade monitor.
    pub fn new(
        registry: Arc<ChainRegistry>,
        client: ChainClient,
        repository: Arc<dyn Repository>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
    ) -> Self {
        Self { registry, client, repository, notifier, trackers: HashMap::new(), interval }
    }

    /// Tracker state for `chain`, if it has been polled.
    pub fn tracker(&self, chain: &str) -> Option<&UpgradeTracker> {
        self.trackers.get(chain)
    }

    async fn check_chain(&mut self, chain: &ChainConfig) -> Result<()> {
        let plan = self.client.current_plan(chain).await?;
        // Read before observing so a failed read leaves the tracker untouched.
        let preferences = self.repository.chain_preferences(&chain.name).await?;
        let Some(event) = self.trackers.entry(chain.name.clone()).or_default().observe(plan) else {
            return Ok(());
        };

        let remaining = match &event {
            UpgradeEvent::Scheduled { plan, .. } => {
                let height = self
                    .client
                    .latest_height(chain)
                    .await
                    .inspect_err(|e| {
                        warn!(chain = %chain.name, error = %e, "latest height unavailable");
                    })
                    .ok();
                blocks_remaining(plan.height, height)
            }
            UpgradeEvent::Cleared { .. } => None,
        };

        let message = format::upgrade_message(&chain.name, &event, remaining);
        let delivered =
            fan_out(self.notifier.as_ref(), &preferences, |p| p.notify_upgrade_enabled, &message)
                .await;
        info!(
            chain = %chain.name,
            title = message.title(),
            channels = delivered,
            "upgrade notification"
        );
        Ok(())
    }
}

#[async_trait]
impl Monitor for UpgradeMonitor {
    fn name(&self) -> &'static str {
        "upgrade"
    }

    fn get_interval(&self) -> Duration {
        self.interval
    }

    async fn check(&mut self) -> Result<()> {
        let subscribed = self.repository.chains_with_preferences().await?;
        let chains: Vec<ChainConfig> = subscribed
            .iter()
            .filter_map(|name| self.registry.get(name))
            .filter(|c| c.upgrade_supported)
            .cloned()
            .collect();

        for chain in &chains {
            if let Err(e) = self.check_chain(chain).await {
                warn!(chain = %chain.name, error = %e, "upgrade check failed");
            }
        }
        debug!(chains = chains.len(), "upgrade cycle complete");
        Ok(())
    }
}
