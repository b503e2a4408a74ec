use notifier::DeliveryError;
use store::PersistenceError;
use thiserror::Error;

/// Errors returned to the chat layer by [`crate::CommandService`].
#[derive(Error, Debug)]
pub enum CommandError {
    /// The chain is not in the registry.
    #[error("chain `{0}` is not supported")]
    UnsupportedChain(String),

    /// The address does not carry the chain's operator prefix.
    #[error("address `{address}` must start with `{expected_prefix}`")]
    InvalidAddress {
        /// Address as given
        address: String,
        /// Operator prefix of the chain
        expected_prefix: String,
    },

    /// The validator could not be fetched from the chain.
    #[error("validator `{address}` not found on {chain}: {reason}")]
    ValidatorNotFound {
        /// Chain registry key
        chain: String,
        /// Operator address
        address: String,
        /// Underlying lookup error
        reason: String,
    },

    /// Reading or writing the repository failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The message could not be posted.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
