//! services/api/src/adapters/memory.rs
//!
//! A process-local implementation of the `UserRecordStore` port. Records live
//! for the lifetime of the process.

use async_trait::async_trait;
use goal_tracker_core::domain::UserRecord;
use goal_tracker_core::ports::{PortResult, UserRecordStore};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Records {
    by_email: HashMap<String, UserRecord>,
    /// Emails in creation order.
    order: Vec<String>,
}

/// An in-memory adapter that implements the `UserRecordStore` port.
#[derive(Default)]
pub struct InMemoryAdapter {
    records: RwLock<Records>,
}

impl InMemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRecordStore for InMemoryAdapter {
    async fn get_or_create(&self, email: &str) -> PortResult<UserRecord> {
        if let Some(record) = self.records.read().await.by_email.get(email) {
            return Ok(record.clone());
        }

        let mut records = self.records.write().await;
        if let Some(record) = records.by_email.get(email) {
            return Ok(record.clone());
        }
        records.by_email.insert(email.to_string(), UserRecord::default());
        records.order.push(email.to_string());
        Ok(UserRecord::default())
    }

    async fn save(&self, email: &str, record: &UserRecord) -> PortResult<()> {
        let mut records = self.records.write().await;
        if records.by_email.insert(email.to_string(), record.clone()).is_none() {
            records.order.push(email.to_string());
        }
        Ok(())
    }

    async fn all_records(&self) -> PortResult<Vec<(String, UserRecord)>> {
        let records = self.records.read().await;
        Ok(records
            .order
            .iter()
            .filter_map(|email| {
                records
                    .by_email
                    .get(email)
                    .map(|record| (email.clone(), record.clone()))
            })
            .collect())
    }
}
