#![allow(dead_code)]

use std::{
    num::{NonZeroU32, NonZeroUsize},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use chrono_tz::Tz;
use faultboard::{
    application::{
        board::{BoardHandle, BoardOptions, FaultBoard},
        generations::RequestGenerations,
        store::{CountMode, RemoteStore, SelectQuery, SelectResult, StoreError},
    },
    domain::faults::{FaultRow, NewFault},
    infra::http::{HttpState, build_router},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// In-memory table that answers queries the way PostgREST would.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<FaultRow>>,
    next_id: Mutex<i64>,
    fail_next_select: Mutex<Option<StoreError>>,
    fail_next_insert: Mutex<Option<StoreError>>,
    pub queries: Mutex<Vec<SelectQuery>>,
    pub inserts: Mutex<Vec<NewFault>>,
}

impl MemoryStore {
    /// `count` rows with ids 1..=count; higher ids are newer.
    pub fn seeded(count: i64) -> Self {
        let store = Self::default();
        for _ in 0..count {
            store.push(NewFault {
                title: String::new(),
                description: "seeded".into(),
                severity: "low".into(),
                status: "open".into(),
                photo_url: String::new(),
            });
        }
        store
    }

    pub fn push(&self, fault: NewFault) -> i64 {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = *next_id;
        let title = if fault.title.is_empty() {
            format!("Fault {id}")
        } else {
            fault.title
        };
        self.rows.lock().unwrap().push(FaultRow {
            id: Some(id),
            created_at: Some(timestamp(id)),
            title: Some(title),
            description: Some(fault.description),
            severity: Some(fault.severity),
            status: Some(fault.status),
            photo_url: Some(fault.photo_url),
        });
        id
    }

    pub fn fail_next_select(&self, message: &str) {
        *self.fail_next_select.lock().unwrap() = Some(StoreError::remote(400, message));
    }

    pub fn fail_next_insert(&self, message: &str) {
        *self.fail_next_insert.lock().unwrap() = Some(StoreError::remote(403, message));
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn last_query(&self) -> SelectQuery {
        self.queries
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("at least one query")
    }
}

fn timestamp(id: i64) -> String {
    format!("2025-03-04T{:02}:{:02}:00+00:00", id / 60, id % 60)
}

fn column<'a>(row: &'a FaultRow, name: &str) -> Option<&'a str> {
    match name {
        "title" => row.title.as_deref(),
        "severity" => row.severity.as_deref(),
        "status" => row.status.as_deref(),
        "description" => row.description.as_deref(),
        _ => None,
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select(&self, query: &SelectQuery) -> Result<SelectResult, StoreError> {
        self.queries.lock().unwrap().push(query.clone());
        if let Some(err) = self.fail_next_select.lock().unwrap().take() {
            return Err(err);
        }

        let mut rows: Vec<FaultRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| {
                query
                    .filters()
                    .iter()
                    .all(|f| column(row, &f.column) == Some(f.value.as_str()))
            })
            .cloned()
            .collect();

        if let Some(order) = query.orders().first() {
            rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            if !order.ascending {
                rows.reverse();
            }
        }

        let total = rows.len() as u64;
        let offset = query.offset().unwrap_or(0) as usize;
        let limit = query.row_limit().map_or(usize::MAX, |l| l as usize);
        let rows = rows.into_iter().skip(offset).take(limit).collect();

        Ok(SelectResult {
            rows,
            total_count: match query.count_mode() {
                CountMode::Exact => Some(total),
                CountMode::None => None,
            },
        })
    }

    async fn insert(&self, _table: &str, fault: &NewFault) -> Result<(), StoreError> {
        if let Some(err) = self.fail_next_insert.lock().unwrap().take() {
            return Err(err);
        }
        self.inserts.lock().unwrap().push(fault.clone());
        self.push(fault.clone());
        Ok(())
    }
}

pub fn options() -> BoardOptions {
    BoardOptions {
        table: "faults".into(),
        page_size: NonZeroU32::new(5).unwrap(),
        report_limit: NonZeroU32::new(25).unwrap(),
    }
}

pub fn router(store: Arc<MemoryStore>) -> Router {
    router_for(BoardHandle::Ready(Arc::new(FaultBoard::new(
        store,
        &options(),
    ))))
}

pub fn router_for(board: BoardHandle) -> Router {
    build_router(HttpState {
        board,
        generations: Arc::new(RequestGenerations::new(NonZeroUsize::new(64).unwrap())),
        timezone: Tz::UTC,
    })
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(router, request).await
}

pub async fn post_form(router: &Router, uri: &str, body: &str) -> (StatusCode, String) {
    let response = post_form_response(router, uri, body).await;
    let status = response.status();
    (status, body_text(response).await)
}

pub async fn post_form_response(
    router: &Router,
    uri: &str,
    body: &str,
) -> axum::response::Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("datastar-request", "true")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

pub async fn body_text(response: axum::response::Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    (status, body_text(response).await)
}

/// Position of `needle` in `haystack`, failing the test when absent.
pub fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("`{needle}` not found in:\n{haystack}"))
}
