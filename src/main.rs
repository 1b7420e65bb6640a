use std::{process, sync::Arc};

use faultboard::{
    application::{
        board::{BoardHandle, BoardOptions, FaultBoard, STORE_NOT_CONFIGURED, store_init_notice},
        error::AppError,
        generations::RequestGenerations,
    },
    config,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        postgrest::PostgrestStore,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let state = HttpState {
        board: open_board(&settings),
        generations: Arc::new(RequestGenerations::new(settings.board.tracked_boards)),
        timezone: settings.board.timezone,
    };

    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "faultboard::serve",
        addr = %settings.server.addr,
        "listening"
    );

    let grace = settings.server.graceful_shutdown;
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::signal::ctrl_c()
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "faultboard::serve",
        grace_seconds = grace.as_secs(),
        "shutdown requested; draining connections"
    );
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(grace, server).await {
        Ok(Ok(Ok(()))) => Ok(()),
        Ok(Ok(Err(err))) => Err(AppError::unexpected(format!("server error: {err}"))),
        Ok(Err(err)) => Err(AppError::unexpected(format!("server task failed: {err}"))),
        Err(_) => {
            warn!(
                target = "faultboard::serve",
                "graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}

/// Create the single store client for the process, or the notice explaining why there is none.
fn open_board(settings: &config::Settings) -> BoardHandle {
    let store = &settings.store;
    let (Some(url), Some(anon_key)) = (store.url.as_deref(), store.anon_key.as_deref()) else {
        warn!(target = "faultboard::store", "{STORE_NOT_CONFIGURED}");
        return BoardHandle::unavailable(STORE_NOT_CONFIGURED);
    };

    match PostgrestStore::new(url, anon_key, store.timeout) {
        Ok(client) => {
            info!(
                target = "faultboard::store",
                url,
                table = %store.table,
                "store client ready"
            );
            let options = BoardOptions {
                table: store.table.clone(),
                page_size: settings.board.page_size,
                report_limit: settings.board.report_limit,
            };
            BoardHandle::Ready(Arc::new(FaultBoard::new(Arc::new(client), &options)))
        }
        Err(err) => {
            let notice = store_init_notice(&err);
            error!(target = "faultboard::store", error = %err, "{notice}");
            BoardHandle::unavailable(notice)
        }
    }
}
