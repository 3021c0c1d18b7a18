//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `UserRecordStore` port from the `core` crate. Each user record is kept
//! as a single JSONB document in PostgreSQL, accessed through `sqlx`.

use async_trait::async_trait;
use goal_tracker_core::domain::UserRecord;
use goal_tracker_core::ports::{PortError, PortResult, UserRecordStore};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `UserRecordStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecordRow {
    email: String,
    record: Json<UserRecord>,
}
impl UserRecordRow {
    fn to_domain(self) -> (String, UserRecord) {
        (self.email, self.record.0)
    }
}

/// Connection-level failures mean the backend is unreachable; anything else is unexpected.
fn map_sqlx_error(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => PortError::StorageUnavailable(e.to_string()),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `UserRecordStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserRecordStore for DbAdapter {
    async fn get_or_create(&self, email: &str) -> PortResult<UserRecord> {
        sqlx::query(
            "INSERT INTO user_records (email, record) VALUES ($1, $2) ON CONFLICT (email) DO NOTHING",
        )
        .bind(email)
        .bind(Json(UserRecord::default()))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, UserRecordRow>(
            "SELECT email, record FROM user_records WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => map_sqlx_error(e),
        })?;

        Ok(row.to_domain().1)
    }

    async fn save(&self, email: &str, record: &UserRecord) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO user_records (email, record) VALUES ($1, $2) \
             ON CONFLICT (email) DO UPDATE SET record = EXCLUDED.record, updated_at = now()",
        )
        .bind(email)
        .bind(Json(record))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn all_records(&self) -> PortResult<Vec<(String, UserRecord)>> {
        let rows = sqlx::query_as::<_, UserRecordRow>(
            "SELECT email, record FROM user_records ORDER BY created_at ASC, email ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|r| r.to_domain()).collect())
    }
}
