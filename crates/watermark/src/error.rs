use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The stored record exists but cannot be trusted. Distinct from "no
    /// history", which is an absent key.
    #[error("corrupt router state under '{key}': {reason}")]
    CorruptState { key: String, reason: String },
}

impl Error {
    #[must_use]
    pub fn corrupt_state(key: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::CorruptState {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_corrupt_state(&self) -> bool {
        matches!(self, Self::CorruptState { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
