//! The fault board: one store client shared by intake, browser and report.

use std::{num::NonZeroU32, sync::Arc};

use crate::application::{
    browser::FaultBrowserService, intake::FaultIntakeService, report::FaultReportService,
    store::RemoteStore,
};

pub const STORE_NOT_CONFIGURED: &str =
    "Store client not configured. Set store.url and store.anon_key.";

pub fn store_init_notice(reason: impl std::fmt::Display) -> String {
    format!("Store client init error: {reason}")
}

#[derive(Debug, Clone)]
pub struct BoardOptions {
    pub table: String,
    pub page_size: NonZeroU32,
    pub report_limit: NonZeroU32,
}

pub struct FaultBoard {
    pub intake: FaultIntakeService,
    pub browser: FaultBrowserService,
    pub report: FaultReportService,
}

impl FaultBoard {
    pub fn new(store: Arc<dyn RemoteStore>, options: &BoardOptions) -> Self {
        Self {
            intake: FaultIntakeService::new(store.clone(), options.table.as_str()),
            browser: FaultBrowserService::new(
                store.clone(),
                options.table.as_str(),
                options.page_size,
            ),
            report: FaultReportService::new(store, options.table.as_str(), options.report_limit),
        }
    }
}

/// The board as created at startup. Without a store client every action is a no-op.
#[derive(Clone)]
pub enum BoardHandle {
    Ready(Arc<FaultBoard>),
    Unavailable { notice: Arc<str> },
}

impl BoardHandle {
    pub fn unavailable(notice: impl Into<String>) -> Self {
        Self::Unavailable {
            notice: Arc::from(notice.into()),
        }
    }

    pub fn board(&self) -> Option<&Arc<FaultBoard>> {
        match self {
            Self::Ready(board) => Some(board),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn notice(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Unavailable { notice } => Some(notice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::ScriptedStore;

    #[test]
    fn unavailable_board_carries_only_a_notice() {
        let handle = BoardHandle::unavailable(STORE_NOT_CONFIGURED);
        assert!(handle.board().is_none());
        assert_eq!(handle.notice(), Some(STORE_NOT_CONFIGURED));
    }

    #[test]
    fn init_failures_are_prefixed() {
        assert_eq!(
            store_init_notice("relative URL without a base"),
            "Store client init error: relative URL without a base"
        );
    }

    #[test]
    fn ready_board_has_no_notice() {
        let options = BoardOptions {
            table: "faults".into(),
            page_size: NonZeroU32::new(5).unwrap(),
            report_limit: NonZeroU32::new(25).unwrap(),
        };
        let handle = BoardHandle::Ready(Arc::new(FaultBoard::new(
            Arc::new(ScriptedStore::default()),
            &options,
        )));
        assert!(handle.board().is_some());
        assert_eq!(handle.notice(), None);
    }
}
