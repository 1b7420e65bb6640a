//! Submission of newly logged faults.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::store::{RemoteStore, StoreError};
use crate::domain::faults::NewFault;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Progress messages written to the intake message region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeStage {
    Submitting,
    Refreshing,
    Submitted,
    Failed(String),
}

impl IntakeStage {
    pub fn message(&self) -> String {
        match self {
            Self::Submitting => "Submitting…".to_string(),
            Self::Refreshing => "Fault submitted. Refreshing list…".to_string(),
            Self::Submitted => "Fault submitted successfully.".to_string(),
            Self::Failed(reason) => format!("Insert failed: {reason}"),
        }
    }
}

#[derive(Clone)]
pub struct FaultIntakeService {
    store: Arc<dyn RemoteStore>,
    table: String,
}

impl FaultIntakeService {
    pub fn new(store: Arc<dyn RemoteStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Insert the fault exactly as submitted. No retry on failure.
    pub async fn submit(&self, fault: &NewFault) -> Result<(), IntakeError> {
        self.store.insert(&self.table, fault).await?;
        info!(
            target = "faultboard::intake",
            severity = %fault.severity,
            status = %fault.status,
            "fault submitted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::ScriptedStore;

    fn leak() -> NewFault {
        NewFault {
            title: "Leak".into(),
            description: "pipe".into(),
            severity: "high".into(),
            status: "open".into(),
            photo_url: String::new(),
        }
    }

    #[tokio::test]
    async fn submits_one_insert_with_all_fields() {
        let store = Arc::new(ScriptedStore::default());
        let intake = FaultIntakeService::new(store.clone(), "faults");

        intake.submit(&leak()).await.unwrap();

        let inserts = store.seen_inserts.lock().unwrap().clone();
        assert_eq!(inserts, vec![("faults".to_string(), leak())]);
    }

    #[tokio::test]
    async fn failure_message_carries_remote_reason() {
        let store = Arc::new(ScriptedStore::default().with_insert(Err(StoreError::remote(
            403,
            "new row violates row-level security policy",
        ))));
        let intake = FaultIntakeService::new(store, "faults");

        let err = intake.submit(&leak()).await.unwrap_err();
        assert_eq!(
            IntakeStage::Failed(err.to_string()).message(),
            "Insert failed: new row violates row-level security policy"
        );
    }
}
