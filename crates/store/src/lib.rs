//! Persistence for validator registrations and chain notification preferences.

mod error;
/// Domain records and their row mappings
pub mod models;
mod repository;
mod sqlite;

pub use error::PersistenceError;
pub use models::{ChainPreference, MentionType, NewValidator, StatusUpdate, ValidatorRecord};
pub use repository::Repository;
pub use sqlite::SqliteRepository;
