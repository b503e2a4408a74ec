//! The three periodic monitors.

mod governance;
mod health;
mod upgrade;


pub use governance::GovernanceMonitor;
pub use health::HealthMonitor;
pub use upgrade::UpgradeMonitor;
