use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// A query or connection failed.
    #[error("database operation failed: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying the schema migrations failed.
    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A value could not be represented in, or read back from, the database.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
