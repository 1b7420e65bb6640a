//! [`RemoteStore`] over a PostgREST endpoint (Supabase and compatible hosts).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{
    Client, RequestBuilder, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, CONTENT_RANGE, HeaderMap, HeaderName, HeaderValue},
};
use tracing::{debug, warn};

use crate::{
    application::store::{CountMode, RemoteStore, SelectQuery, SelectResult, StoreError},
    domain::faults::{FaultRow, NewFault},
    infra::{
        error::InfraError,
        telemetry::{METRIC_STORE_REQUEST_MS, METRIC_STORE_REQUESTS_TOTAL},
    },
};

const REST_PREFIX: [&str; 2] = ["rest", "v1"];
const APIKEY: HeaderName = HeaderName::from_static("apikey");
const PREFER: HeaderName = HeaderName::from_static("prefer");

pub struct PostgrestStore {
    client: Client,
    base: Url,
}

impl PostgrestStore {
    /// Build the client once; every board request reuses it.
    pub fn new(url: &str, anon_key: &str, timeout: Duration) -> Result<Self, InfraError> {
        let base = Url::parse(url.trim())
            .map_err(|err| InfraError::configuration(format!("invalid store url `{url}`: {err}")))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(InfraError::configuration(format!(
                "store url `{url}` must be an http(s) base URL"
            )));
        }

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(anon_key)
            .map_err(|_| InfraError::configuration("store anon key is not a valid header value"))?;
        key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {anon_key}"))
            .map_err(|_| InfraError::configuration("store anon key is not a valid header value"))?;
        bearer.set_sensitive(true);
        headers.insert(APIKEY, key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(concat!("faultboard/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;

        Ok(Self { client, base })
    }

    pub(crate) fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::transport("store url cannot carry a path"))?
            .pop_if_empty()
            .extend(REST_PREFIX)
            .push(table);
        Ok(url)
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<(StatusCode, Option<String>, Vec<u8>), StoreError> {
        let started = Instant::now();
        let outcome = async {
            let response = request.send().await.map_err(StoreError::transport)?;
            let status = response.status();
            let content_range = response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let body = response.bytes().await.map_err(StoreError::transport)?;
            if !status.is_success() {
                return Err(remote_error(status, &body));
            }
            Ok((status, content_range, body.to_vec()))
        }
        .await;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        histogram!(METRIC_STORE_REQUEST_MS, "operation" => operation).record(elapsed_ms);
        let result = if outcome.is_ok() { "ok" } else { "error" };
        counter!(
            METRIC_STORE_REQUESTS_TOTAL,
            "operation" => operation,
            "outcome" => result
        )
        .increment(1);

        match &outcome {
            Ok((status, _, _)) => debug!(
                target = "faultboard::store",
                operation,
                status = status.as_u16(),
                elapsed_ms,
                "store request completed"
            ),
            Err(err) => warn!(
                target = "faultboard::store",
                operation,
                elapsed_ms,
                error = %err,
                "store request failed"
            ),
        }

        outcome
    }
}

#[async_trait]
impl RemoteStore for PostgrestStore {
    async fn select(&self, query: &SelectQuery) -> Result<SelectResult, StoreError> {
        let mut url = self.table_url(query.table_name())?;
        url.query_pairs_mut().extend_pairs(select_params(query));

        let mut request = self.client.get(url);
        if query.count_mode() == CountMode::Exact {
            request = request.header(PREFER, "count=exact");
        }

        let (_, content_range, body) = self.send("select", request).await?;
        let rows: Vec<FaultRow> = serde_json::from_slice(&body).map_err(StoreError::decode)?;
        let total_count = match query.count_mode() {
            CountMode::Exact => content_range.as_deref().and_then(parse_content_range),
            CountMode::None => None,
        };

        Ok(SelectResult { rows, total_count })
    }

    async fn insert(&self, table: &str, fault: &NewFault) -> Result<(), StoreError> {
        let url = self.table_url(table)?;
        let request = self
            .client
            .post(url)
            .header(PREFER, "return=minimal")
            .json(fault);

        self.send("insert", request).await?;
        Ok(())
    }
}

/// Query-string pairs for a read, in PostgREST's horizontal filtering syntax.
pub(crate) fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();

    if !query.columns().is_empty() {
        params.push(("select".to_string(), query.columns().join(",")));
    }

    if !query.orders().is_empty() {
        let order = query
            .orders()
            .iter()
            .map(|order| {
                let direction = if order.ascending { "asc" } else { "desc" };
                format!("{}.{direction}", order.column)
            })
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }

    for filter in query.filters() {
        params.push((filter.column.clone(), format!("eq.{}", filter.value)));
    }

    if let Some(offset) = query.offset() {
        params.push(("offset".to_string(), offset.to_string()));
    }
    if let Some(limit) = query.row_limit() {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

/// Total from a `Content-Range: <from>-<to>/<total>` header; `*` means unknown.
pub(crate) fn parse_content_range(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.trim().parse().ok()
}

fn remote_error(status: StatusCode, body: &[u8]) -> StoreError {
    let message = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            format!(
                "status {}: {}",
                status.as_u16(),
                String::from_utf8_lossy(body).trim()
            )
        });
    StoreError::remote(status.as_u16(), message)
}
