//! Board page and the actions posted from it.
//!
//! Actions answer with datastar SSE patches: a loading state first, then the
//! outcome of the store call. Without a store client every action answers
//! with an empty stream.

use std::{num::NonZeroU32, sync::Arc};

use async_stream::stream;
use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::counter;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    application::{
        board::{BoardHandle, FaultBoard},
        browser::{BrowserError, FaultPage},
        error::{ErrorReport, HttpError},
        generations::{Region, RequestTicket},
        intake::IntakeStage,
        pagination::{PageCursor, PageWindow},
        report::ReportState,
        stream::{StreamBuilder, batched_response},
    },
    domain::{
        faults::FaultRecord,
        filters::FilterSelection,
        types::{SEVERITY_OPTIONS, STATUS_OPTIONS},
    },
    infra::telemetry::METRIC_STALE_RESPONSES_TOTAL,
    presentation::views::{
        BoardTemplate, FaultListTemplate, FaultListView, PagerTemplate, PagerView,
        REGION_FORM_MESSAGE, REGION_REPORT_MESSAGE, ReportBodyTemplate, ReportBodyView,
        ReportFiltersTemplate, ReportFiltersView, TemplateRenderError, render_fragment,
        render_message, render_template_response,
    },
};

use super::{
    forms::{BoardForm, BoardQuery, CursorForm, IntakeForm, ReportForm},
    selectors::{FAULT_LIST, FORM_MESSAGE, PAGER, REPORT_BODY, REPORT_FILTERS, REPORT_MESSAGE},
    state::HttpState,
};

const SOURCE: &str = "infra::http::board";

#[derive(Debug, Clone, Copy)]
enum Navigation {
    Refresh,
    Previous,
    Next,
}

pub(super) async fn board_page(
    State(state): State<HttpState>,
    Query(query): Query<BoardQuery>,
) -> Response {
    let board_id = Uuid::new_v4().to_string();

    let (form_message, list, pager) = match &state.board {
        BoardHandle::Ready(board) => {
            let cursor = board.browser.cursor(query.page());
            match board.browser.load(cursor).await {
                Ok(page) => (
                    String::new(),
                    FaultListView::from_page(&page, state.timezone),
                    PagerView::from_window(&board_id, &page.window),
                ),
                Err(err) => {
                    warn!(target = "faultboard::http::board", error = %err, "initial fault list load failed");
                    (
                        String::new(),
                        FaultListView::failed(err.list_message()),
                        PagerView::failed(&board_id, cursor.page(), 1),
                    )
                }
            }
        }
        BoardHandle::Unavailable { notice } => (
            notice.to_string(),
            FaultListView::failed(notice.to_string()),
            PagerView::from_window(
                &board_id,
                &PageWindow::resolve(PageCursor::first(NonZeroU32::MIN), 0),
            ),
        ),
    };

    let report_state = ReportState::Unloaded;
    let template = BoardTemplate {
        form_message_html: render_message(REGION_FORM_MESSAGE, &form_message),
        severities: &SEVERITY_OPTIONS,
        statuses: &STATUS_OPTIONS,
        list,
        pager,
        filters: ReportFiltersView::new(&board_id, &FilterSelection::cleared()),
        report_message_html: render_message(REGION_REPORT_MESSAGE, &report_state.message()),
        report: ReportBodyView::placeholder(&report_state),
        board_id,
    };

    render_template_response(template, StatusCode::OK)
}

pub(super) async fn submit_fault(
    State(state): State<HttpState>,
    Form(form): Form<IntakeForm>,
) -> Response {
    let Some(board) = state.board.board().cloned() else {
        return StreamBuilder::new().into_response();
    };
    let board_id = form.board_id();
    let fault = form.into_new_fault();

    batched_response(stream! {
        yield form_message(&IntakeStage::Submitting);

        match board.intake.submit(&fault).await {
            Err(err) => {
                warn!(target = "faultboard::http::board", error = %err, "fault insert failed");
                yield form_message(&IntakeStage::Failed(err.to_string()));
            }
            Ok(()) => {
                yield form_message(&IntakeStage::Refreshing);

                let ticket = state.generations.begin(board_id, Region::FaultList);
                yield rendered(list_loading(false));
                if let Some(batch) =
                    load_list(&state, &board, &ticket, board_id, board.browser.first_page(), None).await
                {
                    yield batch;
                }

                yield form_message(&IntakeStage::Submitted);
            }
        }
    })
}

pub(super) async fn refresh_faults(
    State(state): State<HttpState>,
    Form(form): Form<CursorForm>,
) -> Response {
    navigate(state, form, Navigation::Refresh)
}

pub(super) async fn previous_page(
    State(state): State<HttpState>,
    Form(form): Form<CursorForm>,
) -> Response {
    navigate(state, form, Navigation::Previous)
}

pub(super) async fn next_page(
    State(state): State<HttpState>,
    Form(form): Form<CursorForm>,
) -> Response {
    navigate(state, form, Navigation::Next)
}

fn navigate(state: HttpState, form: CursorForm, navigation: Navigation) -> Response {
    let Some(board) = state.board.board().cloned() else {
        return StreamBuilder::new().into_response();
    };

    let current = board.browser.cursor(form.page());
    let known_total = form.total_pages();
    let target = match navigation {
        Navigation::Refresh => current,
        Navigation::Previous => current.previous(),
        Navigation::Next => current.next(known_total),
    };
    if !matches!(navigation, Navigation::Refresh) && target == current {
        debug!(
            target = "faultboard::http::board",
            ?navigation,
            page = current.page(),
            "page boundary reached; nothing to load"
        );
        return StreamBuilder::new().into_response();
    }

    let board_id = form.board_id();
    let ticket = state.generations.begin(board_id, Region::FaultList);

    batched_response(stream! {
        yield rendered(list_loading(true));
        if let Some(batch) = load_list(&state, &board, &ticket, board_id, target, known_total).await {
            yield batch;
        }
    })
}

pub(super) async fn load_report(
    State(state): State<HttpState>,
    Form(form): Form<ReportForm>,
) -> Response {
    let Some(board) = state.board.board().cloned() else {
        return StreamBuilder::new().into_response();
    };
    let board_id = form.board_id();
    let selection = form.selection();
    let ticket = state.generations.begin(board_id, Region::Report);

    batched_response(stream! {
        yield rendered(report_patches(&state, &ReportState::Loading, &[]));

        let outcome = board.report.load(&selection).await;
        if let Err(err) = &outcome {
            warn!(target = "faultboard::http::board", error = %err, "report load failed");
        }
        if still_current(&state, &ticket) {
            let report_state = ReportState::from_outcome(&outcome);
            let records = outcome.as_deref().unwrap_or(&[]);
            yield rendered(report_patches(&state, &report_state, records));
        }
    })
}

pub(super) async fn clear_report(
    State(state): State<HttpState>,
    Form(form): Form<BoardForm>,
) -> Response {
    if state.board.board().is_none() {
        return StreamBuilder::new().into_response();
    }

    let board_id = form.board_id();
    // Any report load still in flight must not repaint the cleared table.
    state.generations.begin(board_id, Region::Report);

    let mut batch = match report_patches(&state, &ReportState::Cleared, &[]) {
        Ok(batch) => batch,
        Err(err) => return HttpError::from(err).into_response(),
    };
    let filters = ReportFiltersTemplate {
        filters: ReportFiltersView::new(&board_id.to_string(), &FilterSelection::cleared()),
    };
    match render_fragment(&filters, SOURCE) {
        Ok(html) => {
            batch.replace(REPORT_FILTERS, html);
            batch.into_response()
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

pub(super) async fn store_health(State(state): State<HttpState>) -> Response {
    match state.board.notice() {
        None => StatusCode::NO_CONTENT.into_response(),
        Some(notice) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_message(
                "infra::http::store_health",
                StatusCode::SERVICE_UNAVAILABLE,
                notice,
            )
            .attach(&mut response);
            response
        }
    }
}

async fn load_list(
    state: &HttpState,
    board: &Arc<FaultBoard>,
    ticket: &RequestTicket,
    board_id: Uuid,
    cursor: PageCursor,
    known_total: Option<u32>,
) -> Option<StreamBuilder> {
    let outcome = board.browser.load(cursor).await;
    if let Err(err) = &outcome {
        warn!(target = "faultboard::http::board", error = %err, page = cursor.page(), "fault list load failed");
    }
    still_current(state, ticket).then(|| {
        rendered(list_patches(
            state,
            &board_id.to_string(),
            cursor,
            known_total,
            &outcome,
        ))
    })
}

fn still_current(state: &HttpState, ticket: &RequestTicket) -> bool {
    let current = state.generations.is_current(ticket);
    if !current {
        counter!(METRIC_STALE_RESPONSES_TOTAL, "region" => ticket.region().as_str()).increment(1);
        debug!(
            target = "faultboard::http::board",
            region = ticket.region().as_str(),
            generation = ticket.generation(),
            "discarding superseded response"
        );
    }
    current
}

fn form_message(stage: &IntakeStage) -> StreamBuilder {
    let mut batch = StreamBuilder::new();
    batch.replace(
        FORM_MESSAGE,
        render_message(REGION_FORM_MESSAGE, &stage.message()),
    );
    batch
}

fn list_loading(clear_message: bool) -> Result<StreamBuilder, TemplateRenderError> {
    let mut batch = StreamBuilder::new();
    if clear_message {
        batch.replace(FORM_MESSAGE, render_message(REGION_FORM_MESSAGE, ""));
    }
    let list = FaultListTemplate {
        list: FaultListView::loading(),
    };
    batch.replace(FAULT_LIST, render_fragment(&list, SOURCE)?);
    Ok(batch)
}

fn list_patches(
    state: &HttpState,
    board_id: &str,
    requested: PageCursor,
    known_total: Option<u32>,
    outcome: &Result<FaultPage, BrowserError>,
) -> Result<StreamBuilder, TemplateRenderError> {
    let (list, pager) = match outcome {
        Ok(page) => (
            FaultListView::from_page(page, state.timezone),
            PagerView::from_window(board_id, &page.window),
        ),
        Err(err) => (
            FaultListView::failed(err.list_message()),
            PagerView::failed(board_id, requested.page(), known_total.unwrap_or(1)),
        ),
    };

    let mut batch = StreamBuilder::new();
    batch.replace(FAULT_LIST, render_fragment(&FaultListTemplate { list }, SOURCE)?);
    batch.replace(PAGER, render_fragment(&PagerTemplate { pager }, SOURCE)?);
    Ok(batch)
}

fn report_patches(
    state: &HttpState,
    report_state: &ReportState,
    records: &[FaultRecord],
) -> Result<StreamBuilder, TemplateRenderError> {
    let body = ReportBodyTemplate {
        report: ReportBodyView::from_records(report_state, records, state.timezone),
    };

    let mut batch = StreamBuilder::new();
    batch.replace(
        REPORT_MESSAGE,
        render_message(REGION_REPORT_MESSAGE, &report_state.message()),
    );
    batch.replace(REPORT_BODY, render_fragment(&body, SOURCE)?);
    Ok(batch)
}

fn rendered(result: Result<StreamBuilder, TemplateRenderError>) -> StreamBuilder {
    result.unwrap_or_else(|err| {
        error!(
            target = "faultboard::http::board",
            source = err.source,
            detail = %err.error,
            "region render failed"
        );
        StreamBuilder::new()
    })
}
