//! `ChainIO` is a library for reading validator, slashing, governance and upgrade state from a
//! Cosmos-SDK chain's REST API.

/// REST client
pub mod client;
/// Governance proposal and tally types for both gov API versions
pub mod gov;
/// Staking, slashing and upgrade response types
pub mod types;

pub use client::ChainClient;
pub use gov::{Proposal, ProposalStatus, TallyPercentages, TallyResult};
pub use types::{ConsensusPubkey, SigningInfo, SlashingParams, StakingValidator, UpgradePlan};
