//! Validator health, governance and upgrade monitoring.
#![allow(clippy::uninlined_format_args)]

/// Monitor trait and run loop
pub mod base_monitor;
/// Slashing data cache
pub mod cache;
/// Change classifiers
pub mod classifier;
/// Alert delivery helpers
pub mod dispatch;
/// Message builders
pub mod format;
/// Periodic monitors
pub mod monitors;
/// Live validator status resolution
pub mod resolver;

pub use base_monitor::Monitor;
pub use cache::{ChainSlashing, SlashingCache};
pub use monitors::{GovernanceMonitor, HealthMonitor, UpgradeMonitor};
pub use resolver::{MISSED_BLOCKS_UNAVAILABLE, ValidatorStatusReport, resolve_validator};

#[cfg(test)]
pub(crate) mod test_utils {
    use config::{ChainConfig, GovApiVersion};

    pub(crate) fn chain_config(name: &str, url: &str) -> ChainConfig {
        ChainConfig {
            name: name.to_owned(),
            rest_api_url: url.parse().unwrap(),
            valoper_prefix: format!("{name}valoper"),
            valcons_prefix: format!("{name}valcons"),
            token_symbol: name.to_uppercase(),
            decimals: 6,
            missed_blocks_supported: true,
            gov_api_version: Some(GovApiVersion::V1),
            upgrade_supported: true,
        }
    }
}
