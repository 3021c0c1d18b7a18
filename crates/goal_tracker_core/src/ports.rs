//! crates/goal_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The storage trait is the boundary of the hexagonal architecture, keeping the
//! stats rules independent of whichever backend holds the user records.

use async_trait::async_trait;
use crate::domain::UserRecord;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port and core operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable keyed storage holding one `UserRecord` per email.
///
/// Callers serialize access per email; implementations only need each
/// individual call to be atomic.
#[async_trait]
pub trait UserRecordStore: Send + Sync {
    /// Returns the stored record, creating a default one first if none exists.
    async fn get_or_create(&self, email: &str) -> PortResult<UserRecord>;

    /// Persists the full record, replacing whatever was stored.
    async fn save(&self, email: &str, record: &UserRecord) -> PortResult<()>;

    /// Every stored record in creation order. Only used to rebuild the leaderboard.
    async fn all_records(&self) -> PortResult<Vec<(String, UserRecord)>>;
}
