use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use primitives::ValidatorStatus;
use serde::{Deserialize, Serialize};

use crate::PersistenceError;

/// A validator registration together with the last classified snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorRecord {
    /// Row id
    pub id: i64,
    /// Registering user
    pub user_id: u64,
    /// Channel that receives alerts for this registration
    pub channel_id: u64,
    /// Chain registry key
    pub chain_name: String,
    /// Operator (`valoper`) address
    pub validator_address: String,
    /// Last known moniker
    pub moniker: Option<String>,
    /// Last persisted status
    pub status: ValidatorStatus,
    /// Last persisted missed-block counter, `-1` when unavailable
    pub missed_blocks: i64,
    /// Time of the last poll
    pub last_check_time: Option<DateTime<Utc>>,
    /// Whether health alerts are sent for this registration
    pub notifications_enabled: bool,
}

impl ValidatorRecord {
    /// Moniker if known, otherwise the operator address.
    pub fn display_name(&self) -> &str {
        self.moniker.as_deref().filter(|m| !m.is_empty()).unwrap_or(&self.validator_address)
    }
}

/// A new registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewValidator {
    /// Registering user
    pub user_id: u64,
    /// Alert channel
    pub channel_id: u64,
    /// Chain registry key
    pub chain_name: String,
    /// Operator address
    pub validator_address: String,
    /// Moniker resolved during registration
    pub moniker: Option<String>,
}

/// Outcome of one monitoring cycle for a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Status to persist
    pub status: ValidatorStatus,
    /// Missed-block counter to persist
    pub missed_blocks: i64,
    /// New moniker; `None` keeps the stored one
    pub moniker: Option<String>,
    /// Time of the poll
    pub checked_at: DateTime<Utc>,
}

/// How a channel wants to be pinged for chain-wide notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionType {
    /// No mention
    #[default]
    #[display("none")]
    None,
    /// `@here`
    #[display("here")]
    Here,
    /// `@everyone`
    #[display("everyone")]
    Everyone,
}

impl MentionType {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Here => "here",
            Self::Everyone => "everyone",
        }
    }

    /// Text prepended to a message, if any.
    pub const fn mention(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Here => Some("@here"),
            Self::Everyone => Some("@everyone"),
        }
    }
}

impl FromStr for MentionType {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('@').to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "here" => Ok(Self::Here),
            "everyone" => Ok(Self::Everyone),
            other => Err(PersistenceError::InvalidInput(format!("unknown mention type `{other}`"))),
        }
    }
}

/// Per-channel notification preference for one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPreference {
    /// Channel receiving chain-wide notifications
    pub channel_id: u64,
    /// Chain registry key
    pub chain_name: String,
    /// Governance proposal notifications
    pub notify_gov_enabled: bool,
    /// Upgrade plan notifications
    pub notify_upgrade_enabled: bool,
    /// Mention policy
    pub mention_type: MentionType,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ValidatorRow {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) channel_id: i64,
    pub(crate) chain_name: String,
    pub(crate) validator_address: String,
    pub(crate) moniker: Option<String>,
    pub(crate) status: String,
    pub(crate) missed_blocks: i64,
    pub(crate) last_check_time: Option<DateTime<Utc>>,
    pub(crate) notifications_enabled: bool,
}

impl TryFrom<ValidatorRow> for ValidatorRecord {
    type Error = PersistenceError;

    fn try_from(row: ValidatorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: from_db_id(row.user_id)?,
            channel_id: from_db_id(row.channel_id)?,
            chain_name: row.chain_name,
            validator_address: row.validator_address,
            moniker: row.moniker,
            status: row.status.parse().unwrap_or_default(),
            missed_blocks: row.missed_blocks,
            last_check_time: row.last_check_time,
            notifications_enabled: row.notifications_enabled,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PreferenceRow {
    pub(crate) channel_id: i64,
    pub(crate) chain_name: String,
    pub(crate) notify_gov_enabled: bool,
    pub(crate) notify_upgrade_enabled: bool,
    pub(crate) mention_type: String,
}

impl TryFrom<PreferenceRow> for ChainPreference {
    type Error = PersistenceError;

    fn try_from(row: PreferenceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            channel_id: from_db_id(row.channel_id)?,
            chain_name: row.chain_name,
            notify_gov_enabled: row.notify_gov_enabled,
            notify_upgrade_enabled: row.notify_upgrade_enabled,
            mention_type: row.mention_type.parse()?,
        })
    }
}

/// Chat snowflakes fit in 63 bits; anything larger cannot be stored.
pub(crate) fn to_db_id(id: u64) -> Result<i64, PersistenceError> {
    i64::try_from(id).map_err(|_| PersistenceError::InvalidInput(format!("id {id} out of range")))
}

pub(crate) fn from_db_id(id: i64) -> Result<u64, PersistenceError> {
    u64::try_from(id)
        .map_err(|_| PersistenceError::InvalidInput(format!("negative id {id} in database")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_type_parsing() {
        assert_eq!("here".parse::<MentionType>().unwrap(), MentionType::Here);
        assert_eq!("@everyone".parse::<MentionType>().unwrap(), MentionType::Everyone);
        assert_eq!("None".parse::<MentionType>().unwrap(), MentionType::None);
        assert!("channel".parse::<MentionType>().is_err());

        assert_eq!(MentionType::Here.mention(), Some("@here"));
        assert_eq!(MentionType::None.mention(), None);
        assert_eq!(MentionType::Everyone.to_string(), "everyone");
    }

    #[test]
    fn id_conversion_is_checked() {
        assert_eq!(to_db_id(123).unwrap(), 123);
        assert!(to_db_id(u64::MAX).is_err());
        assert!(from_db_id(-1).is_err());
    }

    #[test]
    fn display_name_falls_back_to_address() {
        let mut record = ValidatorRecord {
            id: 1,
            user_id: 1,
            channel_id: 2,
            chain_name: "hub".to_owned(),
            validator_address: "cosmosvaloper1abc".to_owned(),
            moniker: None,
            status: ValidatorStatus::Unknown,
            missed_blocks: -1,
            last_check_time: None,
            notifications_enabled: true,
        };
        assert_eq!(record.display_name(), "cosmosvaloper1abc");
        record.moniker = Some("Node".to_owned());
        assert_eq!(record.display_name(), "Node");
    }
}
