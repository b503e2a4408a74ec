use std::sync::Arc;

use chainio::ChainClient;
use config::{ChainConfig, ChainRegistry};
use derive_more::Debug;
use futures::future::join_all;
use monitor::{SlashingCache, dispatch::user_mention, format, resolve_validator};
use notifier::{Message, Notifier};
use store::{ChainPreference, MentionType, NewValidator, Repository};
use tracing::{debug, info, instrument, warn};

use crate::CommandError;

/// Outcome of [`CommandService::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The validator is now monitored for this user
    Registered {
        /// Moniker reported by the chain
        moniker: String,
    },
    /// The user already monitors this validator
    AlreadyRegistered,
}

/// User-facing operations invoked by the chat layer.
#[derive(Debug, Clone)]
pub struct CommandService {
    registry: Arc<ChainRegistry>,
    client: ChainClient,
    #[debug(skip)]
    repository: Arc<dyn Repository>,
    #[debug(skip)]
    notifier: Arc<dyn Notifier>,
}

impl CommandService {
    /// Create a new command service.
    pub fn new(
        registry: Arc<ChainRegistry>,
        client: ChainClient,
        repository: Arc<dyn Repository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { registry, client, repository, notifier }
    }

    fn chain(&self, name: &str) -> Result<&ChainConfig, CommandError> {
        self.registry.get(name).ok_or_else(|| CommandError::UnsupportedChain(name.to_lowercase()))
    }

    /// Slashing snapshots for `chains`, refreshed now. Failures only hide missed blocks.
    async fn fresh_slashing<'a>(
        &self,
        chains: impl IntoIterator<Item = &'a ChainConfig>,
    ) -> SlashingCache {
        let mut cache = SlashingCache::new();
        for chain in chains.into_iter().filter(|c| c.missed_blocks_supported) {
            if let Err(e) = cache.refresh(&self.client, chain).await {
                warn!(chain = %chain.name, error = %e, "slashing data unavailable");
            }
        }
        cache
    }

    /// Start monitoring `address` on `chain` for `user_id`, alerting in `channel_id`.
    #[instrument(skip(self))]
    pub async fn register(
        &self,
        user_id: u64,
        channel_id: u64,
        chain: &str,
        address: &str,
    ) -> Result<Registration, CommandError> {
        let chain = self.chain(chain)?;
        let address = address.trim();
        if !address.starts_with(&chain.valoper_prefix) {
            return Err(CommandError::InvalidAddress {
                address: address.to_owned(),
                expected_prefix: chain.valoper_prefix.clone(),
            });
        }

        let report = resolve_validator(&self.client, chain, address, None).await.map_err(|e| {
            CommandError::ValidatorNotFound {
                chain: chain.name.clone(),
                address: address.to_owned(),
                reason: format!("{e:#}"),
            }
        })?;

        let added = self
            .repository
            .add_validator(NewValidator {
                user_id,
                channel_id,
                chain_name: chain.name.clone(),
                validator_address: address.to_owned(),
                moniker: Some(report.moniker.clone()),
            })
            .await?;

        if added {
            info!(chain = %chain.name, moniker = %report.moniker, "validator registered");
            Ok(Registration::Registered { moniker: report.moniker })
        } else {
            Ok(Registration::AlreadyRegistered)
        }
    }

    /// Stop monitoring. Returns whether a registration was removed.
    #[instrument(skip(self))]
    pub async fn unregister(
        &self,
        user_id: u64,
        chain: &str,
        address: &str,
    ) -> Result<bool, CommandError> {
        let chain = self.chain(chain)?;
        Ok(self.repository.remove_validator(user_id, &chain.name, address.trim()).await?)
    }

    /// Live status cards for every validator `user_id` monitors, optionally on one chain.
    #[instrument(skip(self))]
    pub async fn my_validators(
        &self,
        user_id: u64,
        chain: Option<&str>,
    ) -> Result<Vec<Message>, CommandError> {
        let chain_filter = chain.map(|c| self.chain(c)).transpose()?;
        let records = self
            .repository
            .validators_for_user(user_id, chain_filter.map(|c| c.name.as_str()))
            .await?;

        let mut chains: Vec<&ChainConfig> =
            records.iter().filter_map(|r| self.registry.get(&r.chain_name)).collect();
        chains.sort_by(|a, b| a.name.cmp(&b.name));
        chains.dedup_by(|a, b| a.name == b.name);
        let cache = self.fresh_slashing(chains).await;

        let cards = records.iter().map(|record| {
            let cache = &cache;
            async move {
                let Some(chain) = self.registry.get(&record.chain_name) else {
                    return format::error_card(
                        &record.chain_name,
                        &record.validator_address,
                        "chain is no longer configured",
                    );
                };
                let slashing = cache.get(&chain.name);
                match resolve_validator(&self.client, chain, &record.validator_address, slashing)
                    .await
                {
                    Ok(report) => format::status_card(chain, &record.validator_address, &report),
                    Err(e) => format::error_card(
                        &chain.name,
                        &record.validator_address,
                        &format!("{e:#}"),
                    ),
                }
            }
        });
        let cards = join_all(cards).await;
        debug!(count = cards.len(), "built validator cards");
        Ok(cards)
    }

    /// On-demand status card for any validator. Lookup failures produce an error card.
    #[instrument(skip(self))]
    pub async fn validator_status(
        &self,
        chain: &str,
        address: &str,
    ) -> Result<Message, CommandError> {
        let chain = self.chain(chain)?;
        let address = address.trim();
        let cache = self.fresh_slashing([chain]).await;

        Ok(match resolve_validator(&self.client, chain, address, cache.get(&chain.name)).await {
            Ok(report) => format::status_card(chain, address, &report),
            Err(e) => format::error_card(&chain.name, address, &format!("{e:#}")),
        })
    }

    /// Pause or resume health alerts for one registration. Returns whether it exists.
    #[instrument(skip(self))]
    pub async fn set_validator_notifications(
        &self,
        user_id: u64,
        chain: &str,
        address: &str,
        enabled: bool,
    ) -> Result<bool, CommandError> {
        let chain = self.chain(chain)?;
        Ok(self
            .repository
            .set_notifications_enabled(user_id, &chain.name, address.trim(), enabled)
            .await?)
    }

    /// Configure governance and upgrade notifications of `chain` for `channel_id`.
    #[instrument(skip(self))]
    pub async fn set_chain_notifications(
        &self,
        channel_id: u64,
        chain: &str,
        notify_gov: bool,
        notify_upgrade: bool,
        mention_type: MentionType,
    ) -> Result<(), CommandError> {
        let chain = self.chain(chain)?;
        self.repository
            .upsert_chain_preference(ChainPreference {
                channel_id,
                chain_name: chain.name.clone(),
                notify_gov_enabled: notify_gov,
                notify_upgrade_enabled: notify_upgrade,
                mention_type,
            })
            .await?;
        Ok(())
    }

    /// Supported networks.
    pub fn list_chains(&self) -> Message {
        format::chain_list(&self.registry)
    }

    /// Command overview.
    pub fn help(&self) -> Message {
        format::help()
    }

    /// Post a sample jailed alert to `channel_id`, mentioning `user_id`.
    #[instrument(skip(self))]
    pub async fn test_notification(
        &self,
        channel_id: u64,
        user_id: u64,
    ) -> Result<(), CommandError> {
        let content = format!("This is a test message for {}.", user_mention(user_id));
        self.notifier.send(channel_id, Some(&content), &format::test_alert()).await?;
        Ok(())
    }
}
