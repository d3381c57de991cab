//! Chat client - terminal front end for a conversational AI backend
//!
//! A controller task drives a small conversation state machine against an
//! HTTP chat endpoint; the terminal UI renders its snapshots.

mod client;
mod config;
mod controller;
mod session;
mod state_machine;
mod transcript;
mod tui;
mod view_sync;

use client::{ChatBackend, HttpChatClient, LoggingBackend};
use config::{ClientConfig, LogConfig};
use controller::ChatController;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The terminal belongs to the UI, so logs go to a file
    let log = LogConfig::from_env();
    init_logging(&log)?;

    let config = ClientConfig::from_env();
    let backend = LoggingBackend::new(HttpChatClient::new(&config.base_url));
    let endpoint = backend.endpoint().to_string();

    tracing::info!(
        endpoint = %endpoint,
        smoothing_ms = u64::try_from(config.smoothing_delay.as_millis()).unwrap_or(u64::MAX),
        log_file = %log.file.display(),
        "Chat client starting"
    );

    let (controller, handle) = ChatController::new(backend, config.smoothing_delay);
    let controller_task = tokio::spawn(controller.run());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = tui::run(&mut terminal, &handle, &endpoint).await;
    tui::restore()?;

    drop(handle);
    if let Err(e) = controller_task.await {
        tracing::error!(error = %e, "Chat controller task failed");
    }

    result?;
    tracing::info!("Chat client exited");
    Ok(())
}

fn init_logging(log: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = log.file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log.file)?;

    let filter = EnvFilter::try_new(&log.filter).unwrap_or_else(|_| {
        EnvFilter::new(config::DEFAULT_LOG_FILTER)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}
