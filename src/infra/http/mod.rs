mod board;
mod forms;
mod middleware;
mod selectors;
mod state;

pub use state::HttpState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use middleware::{log_responses, set_request_context};

const DATASTAR_REQUEST_HEADER: &str = "datastar-request";

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(board::board_page))
        .route("/faults", post(board::submit_fault))
        .route("/faults/refresh", post(board::refresh_faults))
        .route("/faults/previous", post(board::previous_page))
        .route("/faults/next", post(board::next_page))
        .route("/report", post(board::load_report))
        .route("/report/clear", post(board::clear_report))
        .route("/_health/store", get(board::store_health))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
