//! Resolves a validator's live status from the staking API and the slashing cache.

use chainio::{ChainClient, StakingValidator};
use config::ChainConfig;
use eyre::Result;
use primitives::{
    BondStatus, ValidatorStatus,
    format::{format_token_amount, uptime_percentage},
    pubkey_to_consensus_address,
};
use tracing::{debug, warn};

use crate::cache::ChainSlashing;

/// Missed-block counter value meaning "not available".
pub const MISSED_BLOCKS_UNAVAILABLE: i64 = -1;

/// Normalised status of a validator as of one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorStatusReport {
    /// Display name
    pub moniker: String,
    /// Raw bonding status
    pub bond_status: BondStatus,
    /// Jailed flag
    pub jailed: bool,
    /// Missed blocks in the current window, [`MISSED_BLOCKS_UNAVAILABLE`] if unknown
    pub missed_blocks: i64,
    /// Human-readable stake, e.g. `1,234.00 ATOM`
    pub total_stake: Option<String>,
    /// Estimated uptime over the signed-blocks window, in percent
    pub uptime: Option<f64>,
}

impl ValidatorStatusReport {
    /// Status shown to users: `Jailed` overrides the bonding status.
    pub fn display_status(&self) -> ValidatorStatus {
        if self.jailed { ValidatorStatus::Jailed } else { self.bond_status.into() }
    }

    /// Whether a usable missed-block counter is present.
    pub const fn has_missed_blocks(&self) -> bool {
        self.missed_blocks >= 0
    }
}

/// Fetch `address` from the chain and combine it with the slashing snapshot.
///
/// Network, status and decoding failures are returned as errors; a missing or undecodable
/// consensus key only makes the missed-block counter unavailable.
pub async fn resolve_validator(
    client: &ChainClient,
    chain: &ChainConfig,
    address: &str,
    slashing: Option<&ChainSlashing>,
) -> Result<ValidatorStatusReport> {
    let validator = client.validator(chain, address).await?;
    Ok(build_report(chain, &validator, slashing))
}

/// Build a report from an already fetched validator.
pub fn build_report(
    chain: &ChainConfig,
    validator: &StakingValidator,
    slashing: Option<&ChainSlashing>,
) -> ValidatorStatusReport {
    let total_stake =
        format_token_amount(&validator.delegator_shares, chain.decimals, &chain.token_symbol);

    let (missed_blocks, uptime) = match slashing.filter(|_| chain.missed_blocks_supported) {
        Some(slashing) => match missed_blocks(chain, validator, slashing) {
            Some(missed) => (missed, uptime_percentage(slashing.signed_blocks_window, missed)),
            None => (MISSED_BLOCKS_UNAVAILABLE, None),
        },
        None => (MISSED_BLOCKS_UNAVAILABLE, None),
    };

    ValidatorStatusReport {
        moniker: validator.description.moniker.clone(),
        bond_status: validator.status,
        jailed: validator.jailed,
        missed_blocks,
        total_stake,
        uptime,
    }
}

fn missed_blocks(
    chain: &ChainConfig,
    validator: &StakingValidator,
    slashing: &ChainSlashing,
) -> Option<i64> {
    let Some(pubkey) = &validator.consensus_pubkey else {
        debug!(validator = %validator.operator_address, "no consensus pubkey in response");
        return None;
    };

    let consensus_address = pubkey_to_consensus_address(&pubkey.key, &chain.valcons_prefix)
        .inspect_err(|e| {
            warn!(
                chain = %chain.name,
                validator = %validator.operator_address,
                error = %e,
                "failed to derive consensus address"
            );
        })
        .ok()?;

    let missed = slashing.missed_blocks_for(&consensus_address);
    if missed.is_none() {
        debug!(
            chain = %chain.name,
            consensus_address = %consensus_address,
            "consensus address not in signing infos"
        );
    }
    missed
}
