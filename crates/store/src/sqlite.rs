use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    Sqlite, SqlitePool,
    query::QueryAs,
    sqlite::{SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tracing::{debug, info, instrument};

use crate::{
    ChainPreference, NewValidator, PersistenceError, Repository, StatusUpdate, ValidatorRecord,
    models::{PreferenceRow, ValidatorRow, to_db_id},
};

const VALIDATOR_COLUMNS: &str = "id, user_id, channel_id, chain_name, validator_address, moniker, \
     status, missed_blocks, last_check_time, notifications_enabled";

/// [`Repository`] backed by a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open (creating if missing) the database at `database_url` and apply migrations.
    #[instrument(level = "info")]
    pub async fn connect(database_url: &str) -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| PersistenceError::InvalidInput(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePool::connect_with(options).await?;
        info!(database_url, "connected to SQLite database");

        let repo = Self { pool };
        repo.run_migrations().await?;
        Ok(repo)
    }

    /// A migrated in-memory database on a single long-lived connection.
    pub async fn in_memory() -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| PersistenceError::InvalidInput(e.to_string()))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.run_migrations().await?;
        Ok(repo)
    }

    async fn run_migrations(&self) -> Result<(), PersistenceError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        debug!("database migrations applied");
        Ok(())
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("SQLite connection pool closed");
    }

    async fn fetch_validators<'q>(
        &self,
        query: QueryAs<'q, Sqlite, ValidatorRow, SqliteArguments<'q>>,
    ) -> Result<Vec<ValidatorRecord>, PersistenceError> {
        query.fetch_all(&self.pool).await?.into_iter().map(ValidatorRecord::try_from).collect()
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    #[instrument(skip(self), level = "debug")]
    async fn add_validator(&self, validator: NewValidator) -> Result<bool, PersistenceError> {
        let result = sqlx::query(
            "INSERT INTO validators \
             (user_id, channel_id, chain_name, validator_address, moniker, status, missed_blocks) \
             VALUES (?, ?, ?, ?, ?, 'UNKNOWN', -1)",
        )
        .bind(to_db_id(validator.user_id)?)
        .bind(to_db_id(validator.channel_id)?)
        .bind(&validator.chain_name)
        .bind(&validator.validator_address)
        .bind(&validator.moniker)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                debug!(
                    chain = %validator.chain_name,
                    validator = %validator.validator_address,
                    "validator already registered"
                );
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn remove_validator(
        &self,
        user_id: u64,
        chain_name: &str,
        address: &str,
    ) -> Result<bool, PersistenceError> {
        let result = sqlx::query(
            "DELETE FROM validators \
             WHERE user_id = ? AND chain_name = ? AND validator_address = ?",
        )
        .bind(to_db_id(user_id)?)
        .bind(chain_name)
        .bind(address)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn validators_for_user(
        &self,
        user_id: u64,
        chain_name: Option<&str>,
    ) -> Result<Vec<ValidatorRecord>, PersistenceError> {
        let user_id = to_db_id(user_id)?;
        match chain_name {
            Some(chain) => {
                let sql = format!(
                    "SELECT {VALIDATOR_COLUMNS} FROM validators \
                     WHERE user_id = ? AND chain_name = ? ORDER BY chain_name, validator_address"
                );
                self.fetch_validators(sqlx::query_as(&sql).bind(user_id).bind(chain)).await
            }
            None => {
                let sql = format!(
                    "SELECT {VALIDATOR_COLUMNS} FROM validators \
                     WHERE user_id = ? ORDER BY chain_name, validator_address"
                );
                self.fetch_validators(sqlx::query_as(&sql).bind(user_id)).await
            }
        }
    }

    async fn validator_for_user(
        &self,
        user_id: u64,
        chain_name: &str,
        address: &str,
    ) -> Result<Option<ValidatorRecord>, PersistenceError> {
        let sql = format!(
            "SELECT {VALIDATOR_COLUMNS} FROM validators \
             WHERE user_id = ? AND chain_name = ? AND validator_address = ?"
        );
        let row: Option<ValidatorRow> = sqlx::query_as(&sql)
            .bind(to_db_id(user_id)?)
            .bind(chain_name)
            .bind(address)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ValidatorRecord::try_from).transpose()
    }

    async fn all_monitored(&self) -> Result<Vec<ValidatorRecord>, PersistenceError> {
        let sql = format!(
            "SELECT {VALIDATOR_COLUMNS} FROM validators \
             WHERE notifications_enabled = 1 ORDER BY chain_name, validator_address, id"
        );
        self.fetch_validators(sqlx::query_as(&sql)).await
    }

    #[instrument(skip(self, update), fields(status = %update.status), level = "debug")]
    async fn update_validator_status(
        &self,
        id: i64,
        update: StatusUpdate,
    ) -> Result<(), PersistenceError> {
        sqlx::query(
            "UPDATE validators \
             SET status = ?, missed_blocks = ?, moniker = COALESCE(?, moniker), \
                 last_check_time = ? \
             WHERE id = ?",
        )
        .bind(update.status.as_str())
        .bind(update.missed_blocks)
        .bind(update.moniker)
        .bind(update.checked_at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn set_notifications_enabled(
        &self,
        user_id: u64,
        chain_name: &str,
        address: &str,
        enabled: bool,
    ) -> Result<bool, PersistenceError> {
        let result = sqlx::query(
            "UPDATE validators SET notifications_enabled = ? \
             WHERE user_id = ? AND chain_name = ? AND validator_address = ?",
        )
        .bind(enabled)
        .bind(to_db_id(user_id)?)
        .bind(chain_name)
        .bind(address)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), level = "debug")]
    async fn upsert_chain_preference(
        &self,
        preference: ChainPreference,
    ) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO chain_notification_settings \
             (channel_id, chain_name, notify_gov_enabled, notify_upgrade_enabled, mention_type) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (channel_id, chain_name) DO UPDATE SET \
                 notify_gov_enabled = excluded.notify_gov_enabled, \
                 notify_upgrade_enabled = excluded.notify_upgrade_enabled, \
                 mention_type = excluded.mention_type",
        )
        .bind(to_db_id(preference.channel_id)?)
        .bind(&preference.chain_name)
        .bind(preference.notify_gov_enabled)
        .bind(preference.notify_upgrade_enabled)
        .bind(preference.mention_type.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn chain_preferences(
        &self,
        chain_name: &str,
    ) -> Result<Vec<ChainPreference>, PersistenceError> {
        let rows: Vec<PreferenceRow> = sqlx::query_as(
            "SELECT channel_id, chain_name, notify_gov_enabled, notify_upgrade_enabled, mention_type \
             FROM chain_notification_settings \
             WHERE chain_name = ? AND (notify_gov_enabled = 1 OR notify_upgrade_enabled = 1) \
             ORDER BY channel_id",
        )
        .bind(chain_name)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ChainPreference::try_from).collect()
    }

    async fn chains_with_preferences(&self) -> Result<Vec<String>, PersistenceError> {
        let chains: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT chain_name FROM chain_notification_settings \
             WHERE notify_gov_enabled = 1 OR notify_upgrade_enabled = 1 \
             ORDER BY chain_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(chains.into_iter().map(|(chain,)| chain).collect())
    }
}
