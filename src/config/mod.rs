//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU32, NonZeroUsize},
    str::FromStr,
    time::Duration,
};

use chrono_tz::Tz;
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

mod cli;

pub use cli::{CliArgs, Command, ServeArgs, ServeOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "faultboard";
const ENV_PREFIX: &str = "FAULTBOARD";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_STORE_TABLE: &str = "faults";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PAGE_SIZE: u64 = 5;
const DEFAULT_REPORT_LIMIT: u64 = 25;
const DEFAULT_TIMEZONE: &str = "UTC";
const DEFAULT_TRACKED_BOARDS: usize = 1024;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub store: StoreSettings,
    pub board: BoardSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Connection details for the hosted store.
///
/// `url` and `anon_key` stay optional: a board without them starts in the
/// "not configured" state instead of refusing to boot.
#[derive(Clone)]
pub struct StoreSettings {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub table: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSettings")
            .field("url", &self.url)
            .field("anon_key", &self.anon_key.as_ref().map(|_| "<redacted>"))
            .field("table", &self.table)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct BoardSettings {
    pub page_size: NonZeroU32,
    pub report_limit: NonZeroU32,
    pub timezone: Tz,
    pub tracked_boards: NonZeroUsize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    store: RawStoreSettings,
    board: RawBoardSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.store_url.as_ref() {
            self.store.url = Some(url.clone());
        }
        if let Some(table) = overrides.store_table.as_ref() {
            self.store.table = Some(table.clone());
        }
        if let Some(seconds) = overrides.store_timeout_seconds {
            self.store.timeout_seconds = Some(seconds);
        }
        if let Some(size) = overrides.board_page_size {
            self.board.page_size = Some(size.into());
        }
        if let Some(limit) = overrides.board_report_limit {
            self.board.report_limit = Some(limit.into());
        }
        if let Some(timezone) = overrides.board_timezone.as_ref() {
            self.board.timezone = Some(timezone.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            store,
            board,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            store: build_store_settings(store)?,
            board: build_board_settings(board)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr =
        parse_socket_addr(&host, port).map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_store_settings(store: RawStoreSettings) -> Result<StoreSettings, LoadError> {
    let table = store
        .table
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| DEFAULT_STORE_TABLE.to_string());
    if table.is_empty() {
        return Err(LoadError::invalid("store.table", "must not be empty"));
    }
    if !table
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(LoadError::invalid(
            "store.table",
            "may contain only ASCII letters, digits and underscores",
        ));
    }

    let timeout_secs = store.timeout_seconds.unwrap_or(DEFAULT_STORE_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "store.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(StoreSettings {
        url: non_blank(store.url),
        anon_key: non_blank(store.anon_key),
        table,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_board_settings(board: RawBoardSettings) -> Result<BoardSettings, LoadError> {
    let page_size = non_zero_u32(
        board.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        "board.page_size",
    )?;
    let report_limit = non_zero_u32(
        board.report_limit.unwrap_or(DEFAULT_REPORT_LIMIT),
        "board.report_limit",
    )?;

    let timezone_name = board
        .timezone
        .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
    let timezone = Tz::from_str(timezone_name.trim()).map_err(|err| {
        LoadError::invalid(
            "board.timezone",
            format!("unknown timezone `{timezone_name}`: {err}"),
        )
    })?;

    let tracked_boards = NonZeroUsize::new(board.tracked_boards.unwrap_or(DEFAULT_TRACKED_BOARDS))
        .ok_or_else(|| LoadError::invalid("board.tracked_boards", "must be greater than zero"))?;

    Ok(BoardSettings {
        page_size,
        report_limit,
        timezone,
        tracked_boards,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStoreSettings {
    url: Option<String>,
    anon_key: Option<String>,
    table: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBoardSettings {
    page_size: Option<u64>,
    report_limit: Option<u64>,
    timezone: Option<String>,
    tracked_boards: Option<usize>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}
