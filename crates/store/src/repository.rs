use async_trait::async_trait;

use crate::{ChainPreference, NewValidator, PersistenceError, StatusUpdate, ValidatorRecord};

/// Storage of validator registrations and per-channel chain preferences.
///
/// Every write is a single statement so a failed cycle never leaves partial state behind.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Register a validator with status `UNKNOWN` and missed blocks `-1`.
    ///
    /// Returns `false` if the user already registered this validator on this chain.
    async fn add_validator(&self, validator: NewValidator) -> Result<bool, PersistenceError>;

    /// Delete a registration. Returns `true` iff a row was removed.
    async fn remove_validator(
        &self,
        user_id: u64,
        chain_name: &str,
        address: &str,
    ) -> Result<bool, PersistenceError>;

    /// Registrations of `user_id`, optionally restricted to one chain.
    async fn validators_for_user(
        &self,
        user_id: u64,
        chain_name: Option<&str>,
    ) -> Result<Vec<ValidatorRecord>, PersistenceError>;

    /// A single registration of `user_id`.
    async fn validator_for_user(
        &self,
        user_id: u64,
        chain_name: &str,
        address: &str,
    ) -> Result<Option<ValidatorRecord>, PersistenceError>;

    /// All registrations with notifications enabled.
    async fn all_monitored(&self) -> Result<Vec<ValidatorRecord>, PersistenceError>;

    /// Persist the outcome of a monitoring cycle for registration `id`.
    async fn update_validator_status(
        &self,
        id: i64,
        update: StatusUpdate,
    ) -> Result<(), PersistenceError>;

    /// Toggle health alerts for a registration. Returns `true` iff the registration exists.
    async fn set_notifications_enabled(
        &self,
        user_id: u64,
        chain_name: &str,
        address: &str,
        enabled: bool,
    ) -> Result<bool, PersistenceError>;

    /// Insert or replace the preference for `(channel_id, chain_name)`.
    async fn upsert_chain_preference(
        &self,
        preference: ChainPreference,
    ) -> Result<(), PersistenceError>;

    /// Preferences for `chain_name` with at least one notification kind enabled.
    async fn chain_preferences(
        &self,
        chain_name: &str,
    ) -> Result<Vec<ChainPreference>, PersistenceError>;

    /// Distinct chains with at least one enabled preference.
    async fn chains_with_preferences(&self) -> Result<Vec<String>, PersistenceError>;
}
