use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chainio::ChainClient;
use chrono::Utc;
use config::ChainRegistry;
use derive_more::Debug;
use eyre::Result;
use futures::future::join_all;
use notifier::Notifier;
use store::{Repository, StatusUpdate, ValidatorRecord};
use tracing::{debug, info, warn};

use crate::{
    base_monitor::Monitor,
    cache::SlashingCache,
    classifier::{HealthPolicy, PreviousHealth, classify_health},
    dispatch::{deliver, user_mention},
    format,
    resolver::{ValidatorStatusReport, resolve_validator},
};

type PollKey = (String, String);

/// Polls every monitored validator, classifies the change and alerts the registering user.
#[derive(Debug)]
pub struct HealthMonitor {
    registry: Arc<ChainRegistry>,
    client: ChainClient,
    #[debug(skip)]
    repository: Arc<dyn Repository>,
    #[debug(skip)]
    notifier: Arc<dyn Notifier>,
    cache: SlashingCache,
    missed_blocks_threshold: i64,
    interval: Duration,
}

impl HealthMonitor {
    /// Create a new health monitor.
    pub fn new(
        registry: Arc<ChainRegistry>,
        client: ChainClient,
        repository: Arc<dyn Repository>,
        notifier: Arc<dyn Notifier>,
        missed_blocks_threshold: i64,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            client,
            repository,
            notifier,
            cache: SlashingCache::new(),
            missed_blocks_threshold,
            interval,
        }
    }

    /// The slashing snapshots as of the last cycle.
    pub const fn cache(&self) -> &SlashingCache {
        &self.cache
    }

    /// Fetch each distinct `(chain, address)` once. `None` marks a failed lookup.
    async fn poll_validators(
        &self,
        records: &[ValidatorRecord],
    ) -> HashMap<PollKey, Option<ValidatorStatusReport>> {
        let mut keys: Vec<PollKey> = records
            .iter()
            .map(|r| (r.chain_name.clone(), r.validator_address.clone()))
            .collect();
        keys.sort();
        keys.dedup();

        let polls = keys.iter().filter_map(|(chain_name, address)| {
            let chain = self.registry.get(chain_name)?;
            let slashing = self.cache.get(chain_name);
            Some(async move {
                let result = resolve_validator(&self.client, chain, address, slashing).await;
                let report = result
                    .inspect_err(|e| {
                        warn!(
                            chain = %chain_name,
                            validator = %address,
                            error = %e,
                            "validator lookup failed"
                        );
                    })
                    .ok();
                ((chain_name.clone(), address.clone()), report)
            })
        });
        join_all(polls).await.into_iter().collect()
    }

    async fn process(&self, record: &ValidatorRecord, poll: Option<&ValidatorStatusReport>) {
        let Some(chain) = self.registry.get(&record.chain_name) else {
            return;
        };
        let policy = HealthPolicy {
            missed_blocks_threshold: self.missed_blocks_threshold,
            missed_blocks_supported: chain.missed_blocks_supported,
        };
        let previous =
            PreviousHealth { status: record.status, missed_blocks: record.missed_blocks };
        let decision = classify_health(&previous, poll, policy);

        if let Some(alert) = decision.alert {
            let moniker = decision.moniker.as_deref().unwrap_or_else(|| record.display_name());
            info!(
                chain = %record.chain_name,
                validator = %record.validator_address,
                ?alert,
                from = %record.status,
                to = %decision.status,
                "health alert"
            );
            let message = format::health_alert(
                alert,
                &record.chain_name,
                moniker,
                decision.status,
                decision.missed_blocks,
            );
            let mention = alert.is_urgent().then(|| user_mention(record.user_id));
            deliver(self.notifier.as_ref(), record.channel_id, mention.as_deref(), &message).await;
        }

        let update = StatusUpdate {
            status: decision.status,
            missed_blocks: decision.missed_blocks,
            moniker: decision.moniker,
            checked_at: Utc::now(),
        };
        if let Err(e) = self.repository.update_validator_status(record.id, update).await {
            warn!(id = record.id, error = %e, "failed to persist validator status");
        }
    }
}

#[async_trait]
impl Monitor for HealthMonitor {
    fn name(&self) -> &'static str {
        "health"
    }

    fn get_interval(&self) -> Duration {
        self.interval
    }

    async fn check(&mut self) -> Result<()> {
        self.cache.refresh_all(&self.client, &self.registry).await;

        let records = self.repository.all_monitored().await?;
        if records.is_empty() {
            debug!("no validators to monitor");
            return Ok(());
        }

        let polls = self.poll_validators(&records).await;
        for record in &records {
            let key = (record.chain_name.clone(), record.validator_address.clone());
            match polls.get(&key) {
                Some(poll) => self.process(record, poll.as_ref()).await,
                None => {
                    warn!(
                        chain = %record.chain_name,
                        id = record.id,
                        "registration for unknown chain"
                    );
                }
            }
        }
        debug!(validators = records.len(), distinct = polls.len(), "health cycle complete");
        Ok(())
    }
}
