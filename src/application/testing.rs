//! Scripted store used by the service unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::store::{RemoteStore, SelectQuery, SelectResult, StoreError};
use crate::domain::faults::{FaultRow, NewFault};

#[derive(Default)]
pub(crate) struct ScriptedStore {
    selects: Mutex<VecDeque<Result<SelectResult, StoreError>>>,
    inserts: Mutex<VecDeque<Result<(), StoreError>>>,
    pub(crate) seen_queries: Mutex<Vec<SelectQuery>>,
    pub(crate) seen_inserts: Mutex<Vec<(String, NewFault)>>,
}

impl ScriptedStore {
    pub(crate) fn with_select(self, result: Result<SelectResult, StoreError>) -> Self {
        self.selects.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn with_insert(self, result: Result<(), StoreError>) -> Self {
        self.inserts.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn queries(&self) -> Vec<SelectQuery> {
        self.seen_queries.lock().unwrap().clone()
    }
}

pub(crate) fn rows(ids: impl IntoIterator<Item = i64>) -> Vec<FaultRow> {
    ids.into_iter()
        .map(|id| FaultRow {
            id: Some(id),
            title: Some(format!("Fault {id}")),
            ..Default::default()
        })
        .collect()
}

#[async_trait]
impl RemoteStore for ScriptedStore {
    async fn select(&self, query: &SelectQuery) -> Result<SelectResult, StoreError> {
        self.seen_queries.lock().unwrap().push(query.clone());
        self.selects
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(SelectResult::default()))
    }

    async fn insert(&self, table: &str, fault: &NewFault) -> Result<(), StoreError> {
        self.seen_inserts
            .lock()
            .unwrap()
            .push((table.to_string(), fault.clone()));
        self.inserts.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}
