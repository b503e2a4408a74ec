//! Validator status types shared by the resolver, the classifier and the store.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Bonding status as reported by the staking module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BondStatus {
    /// `BOND_STATUS_BONDED`
    #[serde(rename = "BOND_STATUS_BONDED")]
    Bonded,
    /// `BOND_STATUS_UNBONDING`
    #[serde(rename = "BOND_STATUS_UNBONDING")]
    Unbonding,
    /// `BOND_STATUS_UNBONDED`
    #[serde(rename = "BOND_STATUS_UNBONDED")]
    Unbonded,
    /// `BOND_STATUS_UNSPECIFIED` or any value this crate does not know about
    #[serde(other, rename = "BOND_STATUS_UNSPECIFIED")]
    Unspecified,
}

impl BondStatus {
    /// Human-readable label used in status cards.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bonded => "Bonded",
            Self::Unbonding => "Unbonding",
            Self::Unbonded => "Unbonded",
            Self::Unspecified => "Unspecified",
        }
    }
}

/// Persisted per-validator status.
///
/// `Jailed` and `WarningMissedBlocks` override the raw bonding status; `ApiError` and
/// `Unknown` are sentinels for "last poll failed" and "never polled".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValidatorStatus {
    /// Validator is in the active set
    Bonded,
    /// Validator is leaving the active set
    Unbonding,
    /// Validator is outside the active set
    Unbonded,
    /// Validator has been jailed by the chain
    Jailed,
    /// Missed-block counter is at or above the alert threshold
    WarningMissedBlocks,
    /// The last poll could not reach or parse the staking API
    ApiError,
    /// No successful poll yet
    #[default]
    Unknown,
}

impl ValidatorStatus {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bonded => "BONDED",
            Self::Unbonding => "UNBONDING",
            Self::Unbonded => "UNBONDED",
            Self::Jailed => "JAILED",
            Self::WarningMissedBlocks => "WARNING_MISSED_BLOCKS",
            Self::ApiError => "API_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl From<BondStatus> for ValidatorStatus {
    fn from(status: BondStatus) -> Self {
        match status {
            BondStatus::Bonded => Self::Bonded,
            BondStatus::Unbonding => Self::Unbonding,
            BondStatus::Unbonded => Self::Unbonded,
            BondStatus::Unspecified => Self::Unknown,
        }
    }
}

impl fmt::Display for ValidatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidatorStatus {
    type Err = std::convert::Infallible;

    /// Parses the storage representation. Legacy display strings (`Bonded`, `Jailed`, ...)
    /// are accepted case-insensitively; anything else maps to `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s.to_ascii_uppercase().as_str() {
            "BONDED" => Self::Bonded,
            "UNBONDING" => Self::Unbonding,
            "UNBONDED" => Self::Unbonded,
            "JAILED" => Self::Jailed,
            "WARNING_MISSED_BLOCKS" => Self::WarningMissedBlocks,
            "API_ERROR" => Self::ApiError,
            _ => Self::Unknown,
        };
        Ok(status)
    }
}
