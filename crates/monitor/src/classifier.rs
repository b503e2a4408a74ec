//! Pure change detection for the three monitored streams.
//!
//! Each classifier compares a fresh observation with the previous one and decides whether an
//! alert fires. None of them perform I/O; callers persist or cache the new state.

/// Governance proposal lifecycle
pub mod governance;
/// Validator health state machine
pub mod health;
/// Upgrade plan changes
pub mod upgrade;

pub use governance::{GovernanceEvent, GovernanceTracker};
pub use health::{HealthAlert, HealthDecision, HealthPolicy, PreviousHealth, classify_health};
pub use upgrade::{UpgradeEvent, UpgradeTracker, blocks_remaining};
