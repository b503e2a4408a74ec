//! Core primitives for the validator monitor.
/// Consensus address derivation
pub mod address;
/// Display formatting helpers
pub mod format;
/// Retry helpers with exponential backoff
pub mod retries;
/// Validator status types
pub mod status;

pub use address::{DerivationError, pubkey_to_consensus_address};
pub use status::{BondStatus, ValidatorStatus};
