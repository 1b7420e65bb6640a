use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

use super::DATASTAR_REQUEST_HEADER;

pub(super) const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Which part of the board a request drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAction {
    Page,
    Intake,
    List,
    Report,
    Health,
    Other,
}

impl BoardAction {
    pub fn from_path(path: &str) -> Self {
        match path {
            "/" => Self::Page,
            "/faults" => Self::Intake,
            "/report" | "/report/clear" => Self::Report,
            "/_health/store" => Self::Health,
            p if p.starts_with("/faults/") => Self::List,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Intake => "intake",
            Self::List => "list",
            Self::Report => "report",
            Self::Health => "health",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub action: BoardAction,
    /// Sent by the datastar client; plain page loads lack it.
    pub datastar: bool,
}

impl RequestContext {
    fn for_request(request: &Request<Body>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            action: BoardAction::from_path(request.uri().path()),
            datastar: request.headers().contains_key(DATASTAR_REQUEST_HEADER),
        }
    }
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::for_request(&request);
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&ctx.request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response.extensions_mut().insert(ctx);
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let start = Instant::now();
    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_else(|| RequestContext::for_request(&request));

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();

    if !(status.is_client_error() || status.is_server_error()) {
        debug!(
            target = "faultboard::http::response",
            status = status.as_u16(),
            action = ctx.action.as_str(),
            elapsed_ms = elapsed_ms,
            request_id = %ctx.request_id,
            "request served",
        );
        return response;
    }

    let (source, messages) = match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => (report.source, report.messages),
        None => ("unknown", Vec::new()),
    };
    let detail = messages
        .first()
        .cloned()
        .unwrap_or_else(|| "no diagnostic available".to_string());

    if status.is_server_error() {
        error!(
            target = "faultboard::http::response",
            status = status.as_u16(),
            method = %method,
            path = %path,
            action = ctx.action.as_str(),
            elapsed_ms = elapsed_ms,
            source = source,
            detail = %detail,
            chain = ?messages,
            request_id = %ctx.request_id,
            datastar = ctx.datastar,
            "request failed",
        );
    } else {
        warn!(
            target = "faultboard::http::response",
            status = status.as_u16(),
            method = %method,
            path = %path,
            action = ctx.action.as_str(),
            source = source,
            detail = %detail,
            request_id = %ctx.request_id,
            datastar = ctx.datastar,
            "client request error",
        );
    }

    response
}
