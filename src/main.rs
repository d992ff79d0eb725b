//! Client Bridge - Entry Point
//!
//! Commands:
//! - probe: discover the companion and print its endpoint
//! - download <source-path> [save-as]: relay a download command
//! - upload <local-path>: relay an upload command

use anyhow::bail;
use client_bridge::{Bridge, BridgeConfig};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn print_help() {
    println!("Client Bridge v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: client-bridge [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  probe                          Find the companion and print its endpoint");
    println!("  download <source-path> [name]  Have the companion fetch and save a file");
    println!("  upload <local-path>            Have the companion upload a local file");
    println!();
    println!("Options:");
    println!("  --json       Log as JSON lines");
    println!("  --help, -h   Show this help");
    println!();
    println!("Environment variables:");
    println!("  CLIENT_TOKEN                 Token sent as X-Client-Token (required)");
    println!("  BRIDGE_PAGE_ORIGIN           Origin of the hosting page (required)");
    println!("  BRIDGE_HOSTS                 Candidate hosts (default: 127.0.0.1,localhost)");
    println!("  BRIDGE_PORTS                 Candidate ports (default: 4589)");
    println!("  BRIDGE_PROBE_TIMEOUT_MS      Per-candidate timeout (default: 2000)");
    println!("  BRIDGE_REQUEST_TIMEOUT_SECS  Per-command timeout (default: 30)");
    println!("  BRIDGE_UPLOAD_PATH           Upload API path (default: /api/upload)");
    println!("  BRIDGE_STRICT_STATUS         Treat non-2xx replies as errors (true/1)");
}

/// Parsed command line action
enum Action<'a> {
    Probe,
    Download(&'a str, Option<&'a str>),
    Upload(&'a str),
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Parse args
    let args: Vec<String> = std::env::args().skip(1).collect();
    let json_logs = args.iter().any(|a| a == "--json");
    let help_mode = args.iter().any(|a| a == "--help" || a == "-h");
    let positional: Vec<&str> = args
        .iter()
        .filter(|a| !a.starts_with("--") && a.as_str() != "-h")
        .map(String::as_str)
        .collect();

    if help_mode || positional.is_empty() {
        print_help();
        return Ok(());
    }

    let action = match positional.as_slice() {
        ["probe"] => Action::Probe,
        ["download", source] => Action::Download(*source, None),
        ["download", source, save_as] => Action::Download(*source, Some(*save_as)),
        ["upload", local_path] => Action::Upload(*local_path),
        other => bail!("unknown command: {}", other.join(" ")),
    };

    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    // Logs go to stderr so stdout stays parseable
    if json_logs {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    info!("Client Bridge v{}", env!("CARGO_PKG_VERSION"));

    let config = BridgeConfig::from_env()?;
    let bridge = Bridge::initialize(config).await?;

    let Some(endpoint) = bridge.endpoint() else {
        bail!("client not connected: no companion answered on any candidate");
    };

    match action {
        Action::Probe => println!("{}", endpoint),
        Action::Download(source, save_as) => {
            print_json(&bridge.relay_download(source, save_as).await?.reply)?
        }
        Action::Upload(local_path) => print_json(&bridge.relay_upload(local_path).await?.reply)?,
    }

    Ok(())
}
