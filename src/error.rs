use thiserror::Error;

/// Errors surfaced to the presentation layer.
///
/// Neither variant leaves the in-memory model partially mutated: an operation
/// that fails has no effect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BudgetError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Durable store read or write failures.
///
/// These never escape the core components; they are logged and the affected
/// operation continues with in-memory state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Stored value under '{key}' is corrupted: {source}")]
    Corrupted {
        key: String,
        /// Where the unreadable value was copied to, if the copy succeeded.
        backup_key: Option<String>,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Whether the stored value that failed to load is safe to overwrite,
    /// i.e. a copy of it exists elsewhere.
    pub fn is_backed_up(&self) -> bool {
        matches!(
            self,
            Self::Corrupted {
                backup_key: Some(_),
                ..
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, BudgetError>;
