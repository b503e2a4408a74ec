//! Per-chain snapshot of slashing parameters and signing infos.

use std::collections::HashMap;

use chainio::ChainClient;
use config::{ChainConfig, ChainRegistry};
use eyre::Result;
use futures::future::join_all;
use tracing::{debug, warn};

/// Slashing data of one chain, as of the last successful refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainSlashing {
    /// Length of the liveness window in blocks
    pub signed_blocks_window: u64,
    /// Missed-block counters keyed by consensus address
    pub missed_blocks: HashMap<String, i64>,
}

impl ChainSlashing {
    /// Missed-block counter for `consensus_address`, if the chain reported one.
    pub fn missed_blocks_for(&self, consensus_address: &str) -> Option<i64> {
        self.missed_blocks.get(consensus_address).copied()
    }
}

/// Slashing snapshots for every chain that tracks missed blocks.
///
/// Owned by a single task; refreshed at the start of each health cycle.
#[derive(Debug, Default)]
pub struct SlashingCache {
    chains: HashMap<String, ChainSlashing>,
}

impl SlashingCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot for `chain`. `None` unless both params and signing infos are populated.
    pub fn get(&self, chain: &str) -> Option<&ChainSlashing> {
        self.chains.get(chain).filter(|s| !s.missed_blocks.is_empty())
    }

    /// Store a snapshot for `chain`.
    pub fn insert(&mut self, chain: impl Into<String>, slashing: ChainSlashing) {
        self.chains.insert(chain.into(), slashing);
    }

    /// Drop the snapshot for `chain`.
    pub fn clear(&mut self, chain: &str) {
        self.chains.remove(chain);
    }

    /// Refresh one chain. On failure the stale snapshot is dropped so nothing reads it.
    pub async fn refresh(&mut self, client: &ChainClient, chain: &ChainConfig) -> Result<()> {
        match fetch_slashing(client, chain).await {
            Ok(slashing) => {
                debug!(
                    chain = %chain.name,
                    window = slashing.signed_blocks_window,
                    signing_infos = slashing.missed_blocks.len(),
                    "slashing cache refreshed"
                );
                self.insert(chain.name.clone(), slashing);
                Ok(())
            }
            Err(e) => {
                self.clear(&chain.name);
                Err(e)
            }
        }
    }

    /// Refresh every chain with missed-block tracking enabled. Failures are logged per chain.
    pub async fn refresh_all(&mut self, client: &ChainClient, registry: &ChainRegistry) {
        let chains: Vec<&ChainConfig> =
            registry.iter().filter(|c| c.missed_blocks_supported).collect();
        let results = join_all(chains.iter().map(|chain| fetch_slashing(client, chain))).await;

        for (chain, result) in chains.into_iter().zip(results) {
            match result {
                Ok(slashing) => self.insert(chain.name.clone(), slashing),
                Err(e) => {
                    warn!(chain = %chain.name, error = %e, "failed to refresh slashing cache");
                    self.clear(&chain.name);
                }
            }
        }
    }
}

async fn fetch_slashing(client: &ChainClient, chain: &ChainConfig) -> Result<ChainSlashing> {
    let params = client.slashing_params(chain).await?;
    let infos = client.signing_infos(chain).await?;
    Ok(ChainSlashing {
        signed_blocks_window: params.signed_blocks_window,
        missed_blocks: infos.into_iter().map(|i| (i.address, i.missed_blocks_counter)).collect(),
    })
}
