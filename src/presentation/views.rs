use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono_tz::Tz;
use thiserror::Error;
use time::OffsetDateTime;

use crate::{
    application::{
        browser::{FaultPage, LIST_EMPTY, LIST_LOADING},
        error::HttpError,
        pagination::PageWindow,
        report::ReportState,
    },
    domain::{
        faults::{FaultRecord, PhotoLink},
        filters::FilterSelection,
        types::{CategoryOption, SEVERITY_OPTIONS, STATUS_OPTIONS},
    },
    presentation::escape::escape_html,
    util::timezone::format_local,
};

pub const REGION_FORM_MESSAGE: &str = "fault-form-message";
pub const REGION_REPORT_MESSAGE: &str = "report-message";

const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

/// Render a region fragment for an SSE patch.
pub fn render_fragment<T: Template>(
    template: &T,
    source: &'static str,
) -> Result<String, TemplateRenderError> {
    template
        .render()
        .map_err(|err| TemplateRenderError::new(source, "Template rendering failed", err))
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => HttpError::from(TemplateRenderError::new(
            "presentation::views::render_template_response",
            "Template rendering failed",
            err,
        ))
        .into_response(),
    }
}

/// A status line region. The text is escaped here, never by the caller.
pub fn render_message(region: &str, text: &str) -> String {
    format!(
        r#"<p class="message" data-region="{region}" role="status" aria-live="polite">{}</p>"#,
        escape_html(text)
    )
}

/// Local display form of a store timestamp; empty when the store gave none.
pub fn format_timestamp(created_at: Option<OffsetDateTime>, tz: Tz) -> String {
    created_at
        .map(|at| format_local(at, tz))
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct FaultItemView {
    pub title: String,
    pub description: String,
    pub severity: String,
    pub status: String,
    pub created: String,
    pub photo_href: Option<String>,
    pub photo_blocked: bool,
}

impl FaultItemView {
    pub fn from_record(record: &FaultRecord, tz: Tz) -> Self {
        Self {
            title: record.display_title().to_string(),
            description: record.description.clone().unwrap_or_default(),
            severity: record
                .severity
                .clone()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            status: record
                .status
                .clone()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            created: format_timestamp(record.created_at, tz),
            photo_href: match record.photo_link() {
                PhotoLink::Link(href) => Some(href.to_owned()),
                PhotoLink::Absent | PhotoLink::Blocked => None,
            },
            photo_blocked: record.photo_link() == PhotoLink::Blocked,
        }
    }
}

/// Either rows or a single placeholder line.
#[derive(Debug, Clone)]
pub struct FaultListView {
    pub items: Vec<FaultItemView>,
    pub placeholder: Option<String>,
}

impl FaultListView {
    pub fn loading() -> Self {
        Self::placeholder(LIST_LOADING)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::placeholder(message)
    }

    pub fn from_page(page: &FaultPage, tz: Tz) -> Self {
        if page.faults.is_empty() {
            return Self::placeholder(LIST_EMPTY);
        }
        Self {
            items: page
                .faults
                .iter()
                .map(|record| FaultItemView::from_record(record, tz))
                .collect(),
            placeholder: None,
        }
    }

    fn placeholder(text: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            placeholder: Some(text.into()),
        }
    }
}

/// Pager controls plus the cursor fields the next navigation posts back.
#[derive(Debug, Clone)]
pub struct PagerView {
    pub board_id: String,
    pub page: u32,
    pub total_pages: u32,
    pub label: String,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PagerView {
    pub fn from_window(board_id: &str, window: &PageWindow) -> Self {
        Self {
            board_id: board_id.to_string(),
            page: window.page(),
            total_pages: window.total_pages(),
            label: window.label(),
            has_previous: window.has_previous(),
            has_next: window.has_next(),
        }
    }

    /// After a failed load: page number only, controls from the last known count.
    pub fn failed(board_id: &str, page: u32, last_total_pages: u32) -> Self {
        let total_pages = last_total_pages.max(1);
        Self {
            board_id: board_id.to_string(),
            page,
            total_pages,
            label: format!("Page {page}"),
            has_previous: page > 1,
            has_next: page < total_pages,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportFiltersView {
    pub board_id: String,
    pub status: Option<String>,
    pub severity: Option<String>,
    pub statuses: &'static [CategoryOption],
    pub severities: &'static [CategoryOption],
}

impl ReportFiltersView {
    pub fn new(board_id: &str, selection: &FilterSelection) -> Self {
        Self {
            board_id: board_id.to_string(),
            status: selection.status().map(str::to_owned),
            severity: selection.severity().map(str::to_owned),
            statuses: &STATUS_OPTIONS,
            severities: &SEVERITY_OPTIONS,
        }
    }

    pub fn status_selected(&self, value: &str) -> bool {
        self.status.as_deref() == Some(value)
    }

    pub fn severity_selected(&self, value: &str) -> bool {
        self.severity.as_deref() == Some(value)
    }
}

#[derive(Debug, Clone)]
pub struct ReportRowView {
    pub id: String,
    pub title: String,
    pub severity: String,
    pub status: String,
    pub created: String,
}

impl ReportRowView {
    fn from_record(record: &FaultRecord, tz: Tz) -> Self {
        Self {
            id: record.id.to_string(),
            title: record.title.clone().unwrap_or_default(),
            severity: record.severity.clone().unwrap_or_default(),
            status: record.status.clone().unwrap_or_default(),
            created: format_timestamp(record.created_at, tz),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportBodyView {
    pub rows: Vec<ReportRowView>,
    pub placeholder: Option<&'static str>,
}

impl ReportBodyView {
    pub const COLUMNS: usize = 5;

    pub fn placeholder(state: &ReportState) -> Self {
        Self {
            rows: Vec::new(),
            placeholder: state.placeholder(),
        }
    }

    pub fn from_records(state: &ReportState, records: &[FaultRecord], tz: Tz) -> Self {
        match state.placeholder() {
            Some(placeholder) => Self {
                rows: Vec::new(),
                placeholder: Some(placeholder),
            },
            None => Self {
                rows: records
                    .iter()
                    .map(|record| ReportRowView::from_record(record, tz))
                    .collect(),
                placeholder: None,
            },
        }
    }

    pub fn columns(&self) -> usize {
        Self::COLUMNS
    }
}

#[derive(Template)]
#[template(path = "board.html")]
pub struct BoardTemplate {
    pub board_id: String,
    pub form_message_html: String,
    pub severities: &'static [CategoryOption],
    pub statuses: &'static [CategoryOption],
    pub list: FaultListView,
    pub pager: PagerView,
    pub filters: ReportFiltersView,
    pub report_message_html: String,
    pub report: ReportBodyView,
}

#[derive(Template)]
#[template(path = "partials/fault_list.html")]
pub struct FaultListTemplate {
    pub list: FaultListView,
}

#[derive(Template)]
#[template(path = "partials/pager.html")]
pub struct PagerTemplate {
    pub pager: PagerView,
}

#[derive(Template)]
#[template(path = "partials/report_filters.html")]
pub struct ReportFiltersTemplate {
    pub filters: ReportFiltersView,
}

#[derive(Template)]
#[template(path = "partials/report_body.html")]
pub struct ReportBodyTemplate {
    pub report: ReportBodyView,
}
