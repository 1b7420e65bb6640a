//! Filtered, capped report of the most recent faults.

use std::{num::NonZeroU32, sync::Arc};

use thiserror::Error;

use crate::application::store::{RemoteStore, SelectQuery, StoreError, into_records};
use crate::domain::{
    faults::{FaultRecord, REPORT_COLUMNS},
    filters::FilterSelection,
};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the report regions currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportState {
    Unloaded,
    Cleared,
    Loading,
    Loaded(usize),
    Empty,
    Failed(String),
}

impl ReportState {
    pub fn from_outcome(outcome: &Result<Vec<FaultRecord>, ReportError>) -> Self {
        match outcome {
            Ok(records) if records.is_empty() => Self::Empty,
            Ok(records) => Self::Loaded(records.len()),
            Err(err) => Self::Failed(err.to_string()),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Unloaded => String::new(),
            Self::Cleared => "Filters cleared.".to_string(),
            Self::Loading => "Loading report…".to_string(),
            Self::Loaded(count) => format!("Loaded {count} record(s)."),
            Self::Empty => "No matching records found.".to_string(),
            Self::Failed(reason) => format!("Report error: {reason}"),
        }
    }

    /// Single-row placeholder for the table body; `None` when rows are shown.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Unloaded | Self::Cleared => Some("No data loaded yet."),
            Self::Loading => Some("Loading…"),
            Self::Loaded(_) => None,
            Self::Empty => Some("No matching records."),
            Self::Failed(_) => Some("Could not load data."),
        }
    }
}

#[derive(Clone)]
pub struct FaultReportService {
    store: Arc<dyn RemoteStore>,
    table: String,
    limit: NonZeroU32,
}

impl FaultReportService {
    pub fn new(store: Arc<dyn RemoteStore>, table: impl Into<String>, limit: NonZeroU32) -> Self {
        Self {
            store,
            table: table.into(),
            limit,
        }
    }

    pub fn report_query(&self, filters: &FilterSelection) -> SelectQuery {
        filters.constraints().into_iter().fold(
            SelectQuery::new(self.table.as_str())
                .select(REPORT_COLUMNS)
                .order("created_at", false)
                .limit(u64::from(self.limit.get())),
            |query, (column, value)| query.eq(column, value),
        )
    }

    pub async fn load(&self, filters: &FilterSelection) -> Result<Vec<FaultRecord>, ReportError> {
        let result = self.store.select(&self.report_query(filters)).await?;
        Ok(into_records(result.rows))
    }
}
