// MIT License - Copyright (c) 2026 Peter Wright
// Event log reader

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;

use satel_event_log::constants::{DEFAULT_CODES_FILE, DEFAULT_PORT};
use satel_event_log::display::format_event;
use satel_event_log::{read_event_log, EventCodeTable, LogClass, ReaderConfig};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "satel-logs")]
#[command(about = "Read the event log of a Satel alarm panel")]
struct Cli {
    /// Optional TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Panel IP address
    #[arg(long)]
    host: Option<String>,

    /// Panel TCP port
    #[arg(long)]
    port: Option<u16>,

    /// Maximum number of events to read (0 = no limit)
    #[arg(long)]
    limit: Option<usize>,

    /// Read the standard and the Grade 2 logs
    #[arg(long)]
    both: bool,

    /// Event code description file (JSON)
    #[arg(long)]
    codes: Option<PathBuf>,

    /// Time to wait for each response, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print events as a JSON array instead of a listing
    #[arg(long)]
    json: bool,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct Config {
    #[serde(default)]
    panel: PanelToml,
    codes_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct PanelToml {
    #[serde(default)]
    host: Option<String>,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_connect_timeout")]
    connect_timeout_ms: u64,
    #[serde(default = "default_request_timeout")]
    request_timeout_ms: u64,
    #[serde(default = "default_request_delay")]
    request_delay_ms: u64,
    #[serde(default)]
    limit: usize,
    #[serde(default)]
    both: bool,
}

impl Default for PanelToml {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: default_request_timeout(),
            request_delay_ms: default_request_delay(),
            limit: 0,
            both: false,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_connect_timeout() -> u64 {
    5000
}
fn default_request_timeout() -> u64 {
    5000
}
fn default_request_delay() -> u64 {
    50
}

fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&text).context("Failed to parse config file")
}

fn build_reader_config(file: &PanelToml, cli: &Cli) -> Result<ReaderConfig> {
    let Some(host) = cli.host.as_ref().or(file.host.as_ref()) else {
        anyhow::bail!("No panel address given (use --host or [panel] host in the config file)");
    };
    let classes = if cli.both || file.both {
        vec![LogClass::Standard, LogClass::Grade2]
    } else {
        vec![LogClass::Standard]
    };
    Ok(ReaderConfig::builder()
        .host(host)
        .port(cli.port.unwrap_or(file.port))
        .connect_timeout_ms(file.connect_timeout_ms)
        .request_timeout_ms(cli.timeout_ms.unwrap_or(file.request_timeout_ms))
        .request_delay_ms(file.request_delay_ms)
        .limit(cli.limit.unwrap_or(file.limit))
        .classes(classes)
        .build())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=satel_event_log=trace).
    // Default: info. Logs go to stderr so stdout carries only the events.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps, so omit them when running under systemd
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt()
            .without_time()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    }

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    let reader_config = build_reader_config(&config.panel, &cli)?;

    // Check the code file before talking to the panel
    let table = if cli.json {
        None
    } else {
        let path = cli
            .codes
            .clone()
            .or(config.codes_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CODES_FILE));
        let table = EventCodeTable::load(&path)
            .with_context(|| format!("Failed to load event codes from {}", path.display()))?;
        Some(table)
    };

    for class in &reader_config.classes {
        info!("Will read {} event log", class);
    }
    let report = read_event_log(&reader_config)
        .await
        .context("Connection to panel failed")?;

    match table {
        None => {
            println!("{}", serde_json::to_string_pretty(&report.events)?);
        }
        Some(table) => {
            if report.events.is_empty() {
                println!("No events found.");
                return Ok(());
            }
            println!("--- Events ---");
            for (i, event) in report.events.iter().enumerate() {
                println!("{}", format_event(i + 1, event, &table));
            }
        }
    }

    Ok(())
}
