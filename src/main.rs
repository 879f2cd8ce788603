use anyhow::{Context, Result};
use clap::{Arg, Command};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use paxss::core::config::{Config, DEFAULT_UPLOAD_ENDPOINT, MAX_WAIT_SECS};
use paxss::core::{ImgurClient, Orchestrator, Uploader};
use paxss::platform::SystemClipboard;
use paxss::ui::{self, TerminalUi};

fn build_cli() -> Command {
    Command::new("paxss")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watches a screenshot folder, previews new captures and files them by date")
        .arg(
            Arg::new("watch-dir")
                .long("watch-dir")
                .value_name("DIR")
                .env("MONITOR_DIRECTORY")
                .required(true)
                .help("Folder to watch for new screenshots"),
        )
        .arg(
            Arg::new("upload-dir")
                .long("upload-dir")
                .value_name("DIR")
                .env("UPLOAD_DIRECTORY")
                .required(true)
                .help("Archive root for uploaded files"),
        )
        .arg(
            Arg::new("save-dir")
                .long("save-dir")
                .value_name("DIR")
                .env("SAVE_DIRECTORY")
                .required(true)
                .help("Archive root for files kept local"),
        )
        .arg(
            Arg::new("client-id")
                .long("client-id")
                .value_name("ID")
                .env("IMGUR_CLIENT_ID")
                .hide_env_values(true)
                .required(true)
                .help("Imgur client id used for uploads"),
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .value_name("URL")
                .env("IMGUR_UPLOAD_URL")
                .default_value(DEFAULT_UPLOAD_ENDPOINT)
                .help("Upload endpoint"),
        )
        .arg(
            Arg::new("interval-ms")
                .long("interval-ms")
                .value_name("MS")
                .env("PAXSS_INTERVAL_MS")
                .value_parser(clap::value_parser!(u64).range(1..=MAX_WAIT_SECS as u64 * 1000))
                .default_value("1000")
                .help("Delay between folder scans"),
        )
        .arg(
            Arg::new("prompt-timeout")
                .long("prompt-timeout")
                .value_name("SECS")
                .env("PAXSS_PROMPT_TIMEOUT")
                .value_parser(clap::value_parser!(u64).range(0..=MAX_WAIT_SECS as u64))
                .default_value("10")
                .help("Seconds before an unanswered prompt keeps the file local"),
        )
        .arg(
            Arg::new("notice-secs")
                .long("notice-secs")
                .value_name("SECS")
                .env("PAXSS_NOTICE_SECS")
                .value_parser(clap::value_parser!(u64).range(0..=MAX_WAIT_SECS as u64))
                .default_value("5")
                .help("Seconds the upload confirmation stays on screen"),
        )
        .arg(
            Arg::new("http-timeout")
                .long("http-timeout")
                .value_name("SECS")
                .env("PAXSS_HTTP_TIMEOUT")
                .value_parser(clap::value_parser!(u64).range(1..=MAX_WAIT_SECS as u64))
                .help("Abort uploads that take longer than this (no limit by default)"),
        )
}

fn main() -> Result<()> {
    paxss::init_logging();

    let matches = build_cli().get_matches();
    let config = Config::from_matches(&matches).context("Failed to read configuration")?;

    if let Err(e) = config.validate() {
        ui::error(&e.to_string());
        process::exit(1);
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::Relaxed);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    ui::print_watch_summary(&config);

    let host = ImgurClient::new(&config).context("Failed to set up the upload client")?;
    let uploader = Uploader::new(Box::new(host), Box::new(SystemClipboard::new()));
    let mut orchestrator = Orchestrator::new(&config, TerminalUi::new(&config), uploader);

    ui::info("Waiting for new screenshots...");
    orchestrator.run(&shutdown).context("Watch loop failed")?;
    ui::success("Stopped.");

    Ok(())
}
