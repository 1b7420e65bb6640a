//! Remote store trait and the query builder used to talk to it.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::domain::faults::{FaultRecord, FaultRow, NewFault};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered with an error; `message` is its human-readable reason.
    #[error("{message}")]
    Remote { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("unexpected response from store: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountMode {
    #[default]
    None,
    Exact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqFilter {
    pub column: String,
    pub value: String,
}

/// A read against one table. Filters are AND-combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    table: String,
    columns: Vec<String>,
    count: CountMode,
    order: Vec<OrderBy>,
    filters: Vec<EqFilter>,
    offset: Option<u64>,
    limit: Option<u64>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            count: CountMode::None,
            order: Vec::new(),
            filters: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn count_exact(mut self) -> Self {
        self.count = CountMode::Exact;
        self
    }

    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order.push(OrderBy {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Inclusive, zero-based slice. Replaces any earlier `limit`.
    pub fn range(mut self, from: u64, to: u64) -> Self {
        self.offset = Some(from);
        self.limit = Some(to.saturating_sub(from) + 1);
        self
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(EqFilter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn count_mode(&self) -> CountMode {
        self.count
    }

    pub fn orders(&self) -> &[OrderBy] {
        &self.order
    }

    pub fn filters(&self) -> &[EqFilter] {
        &self.filters
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn row_limit(&self) -> Option<u64> {
        self.limit
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectResult {
    pub rows: Vec<FaultRow>,
    /// Present only when the query asked for an exact count.
    pub total_count: Option<u64>,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select(&self, query: &SelectQuery) -> Result<SelectResult, StoreError>;

    /// Create one row; the store assigns `id` and `created_at`.
    async fn insert(&self, table: &str, fault: &NewFault) -> Result<(), StoreError>;
}

/// Validate raw rows, dropping any the domain rejects.
pub fn into_records(rows: Vec<FaultRow>) -> Vec<FaultRecord> {
    rows.into_iter()
        .filter_map(|row| match FaultRecord::try_from(row) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(
                    target = "faultboard::store",
                    error = %err,
                    "skipping malformed fault row"
                );
                None
            }
        })
        .collect()
}
