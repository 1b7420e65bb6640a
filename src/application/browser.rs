//! Paginated, newest-first listing of every stored fault.

use std::{num::NonZeroU32, sync::Arc};

use thiserror::Error;
use tracing::debug;

use crate::application::{
    pagination::{PageCursor, PageWindow},
    store::{RemoteStore, SelectQuery, StoreError, into_records},
};
use crate::domain::faults::{FaultRecord, FaultRow, LIST_COLUMNS};

pub const LIST_LOADING: &str = "Loading faults…";
pub const LIST_EMPTY: &str = "No faults found yet.";

const MAX_CLAMP_REFETCHES: usize = 2;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("fault count kept changing while loading page {page}; try again")]
    Unsettled { page: u32 },
}

impl BrowserError {
    /// Text shown in place of the list when a load fails.
    pub fn list_message(&self) -> String {
        format!("Error loading faults: {self}")
    }
}

#[derive(Debug, Clone)]
pub struct FaultPage {
    pub window: PageWindow,
    pub faults: Vec<FaultRecord>,
}

#[derive(Clone)]
pub struct FaultBrowserService {
    store: Arc<dyn RemoteStore>,
    table: String,
    page_size: NonZeroU32,
}

impl FaultBrowserService {
    pub fn new(store: Arc<dyn RemoteStore>, table: impl Into<String>, page_size: NonZeroU32) -> Self {
        Self {
            store,
            table: table.into(),
            page_size,
        }
    }

    pub fn cursor(&self, page: u32) -> PageCursor {
        PageCursor::new(page, self.page_size)
    }

    pub fn first_page(&self) -> PageCursor {
        PageCursor::first(self.page_size)
    }

    pub fn list_query(&self, cursor: PageCursor) -> SelectQuery {
        let slice = cursor.slice();
        SelectQuery::new(self.table.as_str())
            .select(LIST_COLUMNS)
            .count_exact()
            .order("created_at", false)
            .range(slice.from, slice.to)
    }

    /// Load the page at `cursor`, returning the clamped cursor alongside the rows.
    ///
    /// When the requested page lies past the end, the clamped page is fetched
    /// again so the rows match the returned window. The total can shrink
    /// between reads, so this repeats a bounded number of times.
    pub async fn load(&self, cursor: PageCursor) -> Result<FaultPage, BrowserError> {
        let mut fetched = cursor;
        let mut refetches = 0;
        loop {
            let (rows, total) = self.fetch(fetched).await?;
            let window = PageWindow::resolve(fetched, total);
            if window.cursor() == fetched || total == 0 {
                return Ok(FaultPage {
                    window,
                    faults: into_records(rows),
                });
            }
            if refetches == MAX_CLAMP_REFETCHES {
                return Err(BrowserError::Unsettled {
                    page: fetched.page(),
                });
            }

            debug!(
                target = "faultboard::browser",
                requested = fetched.page(),
                clamped = window.page(),
                "requested page beyond the last page; reloading"
            );
            refetches += 1;
            fetched = window.cursor();
        }
    }

    async fn fetch(&self, cursor: PageCursor) -> Result<(Vec<FaultRow>, u64), BrowserError> {
        let result = self.store.select(&self.list_query(cursor)).await?;
        let total = result
            .total_count
            .ok_or_else(|| StoreError::decode("missing exact count"))?;
        Ok((result.rows, total))
    }
}
