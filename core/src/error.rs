use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoyaltyError {
    #[error("Invalid amount: {amount} (must be > 0)")]
    InvalidAmount { amount: i64 },

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    #[error("Persistence failure: {0}")]
    Persistence(#[source] Box<LoyaltyError>),

    #[error("Corrupt state for account '{account_id}': {reason}")]
    CorruptState { account_id: String, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("Account '{account_id}' lock poisoned")]
    LockPoisoned { account_id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type LoyaltyResult<T> = Result<T, LoyaltyError>;
