//! Response types for the staking, slashing, upgrade and tendermint REST routes.

use primitives::BondStatus;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

/// Envelope of `GET /cosmos/staking/v1beta1/validators/{addr}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ValidatorResponse {
    pub(crate) validator: StakingValidator,
}

/// A validator as returned by the staking module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StakingValidator {
    /// Operator (`valoper`) address
    pub operator_address: String,
    /// Consensus public key; absent on some pruned or malformed responses
    #[serde(default)]
    pub consensus_pubkey: Option<ConsensusPubkey>,
    /// Jailed flag
    #[serde(default)]
    pub jailed: bool,
    /// Bonding status
    pub status: BondStatus,
    /// Total delegator shares in base denomination, as a decimal string
    #[serde(default)]
    pub delegator_shares: String,
    /// Descriptive metadata
    pub description: ValidatorDescription,
}

/// Consensus public key in its JSON `Any` form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConsensusPubkey {
    /// Protobuf type URL, e.g. `/cosmos.crypto.ed25519.PubKey`
    #[serde(rename = "@type", default)]
    pub type_url: Option<String>,
    /// Base64 key bytes
    pub key: String,
}

/// Validator description.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidatorDescription {
    /// Display name
    pub moniker: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SlashingParamsResponse {
    pub(crate) params: SlashingParams,
}

/// Slashing module parameters.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SlashingParams {
    /// Number of blocks in the liveness window
    #[serde_as(as = "DisplayFromStr")]
    pub signed_blocks_window: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SigningInfosResponse {
    #[serde(default)]
    pub(crate) info: Vec<SigningInfo>,
    #[serde(default)]
    pub(crate) pagination: Option<PageResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageResponse {
    #[serde(default)]
    pub(crate) next_key: Option<String>,
}

/// Liveness record for one consensus address.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SigningInfo {
    /// Bech32 consensus (`valcons`) address
    pub address: String,
    /// Blocks missed within the current window
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub missed_blocks_counter: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentPlanResponse {
    #[serde(default)]
    pub(crate) plan: Option<UpgradePlan>,
}

/// A scheduled software upgrade.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpgradePlan {
    /// Plan name, used as the upgrade handler key
    pub name: String,
    /// Target block height
    #[serde_as(as = "DisplayFromStr")]
    pub height: u64,
    /// Free-form upgrade info (often a JSON blob with binaries)
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatestBlockResponse {
    pub(crate) block: Block,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Block {
    pub(crate) header: BlockHeader,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(crate) struct BlockHeader {
    #[serde_as(as = "DisplayFromStr")]
    pub(crate) height: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_validator() {
        let raw = r#"{
            "validator": {
                "operator_address": "cosmosvaloper1abc",
                "consensus_pubkey": {"@type": "/cosmos.crypto.ed25519.PubKey", "key": "AAAA"},
                "jailed": false,
                "status": "BOND_STATUS_BONDED",
                "tokens": "1000",
                "delegator_shares": "1000000000.000000000000000000",
                "description": {"moniker": "Node A", "identity": "", "website": ""}
            }
        }"#;
        let resp: ValidatorResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.validator.description.moniker, "Node A");
        assert_eq!(resp.validator.status, BondStatus::Bonded);
        assert_eq!(resp.validator.consensus_pubkey.unwrap().key, "AAAA");
    }

    #[test]
    fn parses_signing_infos_with_string_counters() {
        let raw = r#"{
            "info": [
                {"address": "cosmosvalcons1x", "start_height": "0", "missed_blocks_counter": "12"},
                {"address": "cosmosvalcons1y", "missed_blocks_counter": "0"}
            ],
            "pagination": {"next_key": null, "total": "2"}
        }"#;
        let resp: SigningInfosResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.info.len(), 2);
        assert_eq!(resp.info[0].missed_blocks_counter, 12);
        assert!(resp.pagination.unwrap().next_key.is_none());
    }

    #[test]
    fn parses_empty_plan() {
        let resp: CurrentPlanResponse = serde_json::from_str(r#"{"plan": null}"#).unwrap();
        assert!(resp.plan.is_none());

        let resp: CurrentPlanResponse = serde_json::from_str(
            r#"{"plan": {"name": "v2", "time": "0001-01-01T00:00:00Z", "height": "1000", "info": ""}}"#,
        )
        .unwrap();
        assert_eq!(resp.plan.unwrap().height, 1000);
    }
}
