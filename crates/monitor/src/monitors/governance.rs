use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chainio::ChainClient;
use config::{ChainConfig, ChainRegistry, GovApiVersion};
use derive_more::Debug;
use eyre::Result;
use notifier::Notifier;
use store::Repository;
use tracing::{debug, info, warn};

use crate::{
    base_monitor::Monitor,
    classifier::{GovernanceEvent, GovernanceTracker},
    dispatch::fan_out,
    format,
};

/// Tracks proposal lifecycles and notifies subscribed channels.
#[derive(Debug)]
pub struct GovernanceMonitor {
    registry: Arc<ChainRegistry>,
    client: ChainClient,
    #[debug(skip)]
    repository: Arc<dyn Repository>,
    #[debug(skip)]
    notifier: Arc<dyn Notifier>,
    trackers: HashMap<String, GovernanceTracker>,
    interval: Duration,
}

impl GovernanceMonitor {
    /// Create a new governance monitor.
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
    pub fn tracker(&self, chain: &str) -> Option<&GovernanceTracker> {
        self.trackers.get(chain)
    }

    /// Governance-enabled chains that at least one channel subscribes to.
    ///
    /// A chain that gains its first subscriber is seeded silently on its next poll.
    async fn chains_to_poll(&self) -> Result<Vec<(ChainConfig, GovApiVersion)>> {
        let subscribed = self.repository.chains_with_preferences().await?;
        let chains = subscribed
            .iter()
            .filter_map(|name| self.registry.get(name))
            .filter_map(|c| c.gov_api_version.map(|v| (c.clone(), v)))
            .collect();
        Ok(chains)
    }

    async fn check_chain(&mut self, chain: &ChainConfig, version: GovApiVersion) -> Result<()> {
        let proposals = self.client.proposals(chain, version).await?;
        // Read before observing so a failed read leaves the tracker untouched.
        let preferences = self.repository.chain_preferences(&chain.name).await?;
        let tracker = self.trackers.entry(chain.name.clone()).or_default();
        let seeded = tracker.is_seeded();
        let events = tracker.observe(&proposals);
        if !seeded {
            info!(chain = %chain.name, proposals = proposals.len(), "governance tracker seeded");
            return Ok(());
        }
        if events.is_empty() {
            return Ok(());
        }

        for event in &events {
            let tally = match event {
                GovernanceEvent::Finalized(p) => self
                    .client
                    .tally(chain, version, p.id)
                    .await
                    .inspect_err(|e| {
                        warn!(
                            chain = %chain.name,
                            proposal = p.id,
                            error = %e,
                            "tally unavailable"
                        );
                    })
                    .ok(),
                _ => None,
            };
            let message = format::governance_message(&chain.name, event, tally.as_ref());
            let delivered = fan_out(
                self.notifier.as_ref(),
                &preferences,
                |p| p.notify_gov_enabled,
                &message,
            )
            .await;
            info!(
                chain = %chain.name,
                proposal = event.proposal().id,
                status = event.proposal().status.label(),
                channels = delivered,
                "governance notification"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl Monitor for GovernanceMonitor {
    fn name(&self) -> &'static str {
        "governance"
    }

    fn get_interval(&self) -> Duration {
        self.interval
    }

    async fn check(&mut self) -> Result<()> {
        let chains = self.chains_to_poll().await?;
        for (chain, version) in &chains {
            if let Err(e) = self.check_chain(chain, *version).await {
                warn!(chain = %chain.name, error = %e, "governance check failed");
            }
        }
        debug!(chains = chains.len(), "governance cycle complete");
        Ok(())
    }
}
