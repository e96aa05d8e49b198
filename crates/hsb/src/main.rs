use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use hsb_core::{
    config::Config,
    errors::Error,
    domain::Cursor,
    notifier::Notifier,
    poller::{PollOutcome, Poller, PollerConfig},
};
use hsb_practicum::PracticumClient;
use hsb_telegram::TelegramMessenger;

/// Relays homework review status changes to a Telegram chat.
#[derive(Parser, Debug)]
#[command(name = "hsb", version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Log level for our crates (overridden by RUST_LOG).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Run a single poll and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    hsb_core::logging::init("hsb", &args.log_level)?;

    let cfg = match Config::load(Some(&args.env_file)) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{}", startup_failure(&e));
            return Ok(ExitCode::FAILURE);
        }
    };

    let api = Arc::new(
        PracticumClient::new(
            cfg.practicum_token.clone(),
            cfg.endpoint.clone(),
            cfg.request_timeout,
        )
        .context("failed to build homework API client")?,
    );
    let messenger = Arc::new(TelegramMessenger::from_token(cfg.telegram_token.clone()));

    match messenger.username().await {
        Ok(name) => info!("hsb started as {name}"),
        Err(e) => warn!("Could not fetch bot identity: {e}"),
    }
    info!("Endpoint: {}", cfg.endpoint);
    info!("Retry interval: {}s", cfg.retry_interval.as_secs());

    let notifier = Notifier::new(messenger, cfg.telegram_chat_id);
    let mut poller = Poller::new(api, notifier, PollerConfig::from(&cfg), Cursor::now());

    if args.once {
        let outcome = poller.poll_once().await;
        info!(?outcome, cursor = %poller.state().cursor, "Single poll finished");
        return Ok(match outcome {
            PollOutcome::Failed(_) => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        });
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down...");
            on_signal.cancel();
        }
    });

    poller.run(cancel).await;
    Ok(ExitCode::SUCCESS)
}

fn startup_failure(e: &Error) -> String {
    format!("CRITICAL: invalid configuration, cannot start: {e}")
}
