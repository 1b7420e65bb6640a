use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the FaultBoard binary.
#[derive(Debug, Parser)]
#[command(name = "faultboard", version, about = "FaultBoard fault logging server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "FAULTBOARD_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the FaultBoard HTTP service.
    Serve(Box<ServeArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the hosted store base URL.
    #[arg(long = "store-url", value_name = "URL")]
    pub store_url: Option<String>,

    /// Override the table holding fault records.
    #[arg(long = "store-table", value_name = "TABLE")]
    pub store_table: Option<String>,

    /// Override the per-request store timeout.
    #[arg(long = "store-timeout-seconds", value_name = "SECONDS")]
    pub store_timeout_seconds: Option<u64>,

    /// Override the number of faults shown per list page.
    #[arg(long = "board-page-size", value_name = "COUNT")]
    pub board_page_size: Option<u32>,

    /// Override the maximum number of report rows.
    #[arg(long = "board-report-limit", value_name = "COUNT")]
    pub board_report_limit: Option<u32>,

    /// Override the IANA timezone used to display timestamps.
    #[arg(long = "board-timezone", value_name = "TZ")]
    pub board_timezone: Option<String>,
}
