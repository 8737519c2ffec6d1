//! filenest
//!
//! Personal file server with self-service account registration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use nix::sys::signal::Signal;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filenest_server::{
    dashboard, routes, transfer, AppState, Cli, ConsoleEmailSender, EmailSender,
    FileAccountStore, LocalTransferServer, PathRouter, SmtpConfig, SmtpEmailSender,
    TransferServer, UploadStats,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate()?;
    tracing::info!(?config, "Loaded configuration");
    if !config.confirmation_enabled() {
        tracing::warn!("No confirmation email configured; anyone can register an account");
    }

    std::fs::create_dir_all(&config.config_dir)
        .with_context(|| format!("Failed to create {}", config.config_dir.display()))?;
    let accounts = FileAccountStore::open(config.passwd_path())?;

    let transfer_server = Arc::new(LocalTransferServer::new());
    if config.effective_log_level() >= 2 {
        transfer_server.add_event_hook(transfer::logging_hook());
    }
    let stats = Arc::new(UploadStats::new());
    transfer_server.add_event_hook(dashboard::upload_hook(stats.clone(), config.web_root.clone()));

    let mut router = PathRouter::new();
    dashboard::register(&mut router, stats);

    let email_sender: Option<Box<dyn EmailSender>> = if config.console_mail {
        Some(Box::new(ConsoleEmailSender::new()))
    } else if let Some(smtp) = SmtpConfig::from_config(&config) {
        Some(Box::new(SmtpEmailSender::new(smtp).map_err(anyhow::Error::msg)?))
    } else {
        None
    };

    let state = Arc::new(AppState::new(
        config.clone(),
        accounts,
        email_sender,
        transfer_server.clone(),
        router,
    ));

    if config.filesystem_access {
        let provisioned = state.provision_all();
        tracing::info!(provisioned, "Provisioned stored accounts");
        transfer_server
            .start(config.transfer_workers)
            .map_err(anyhow::Error::msg)?;
        tracing::info!(web_root = %config.web_root.display(), "Web root directory");
    }

    if let Some(ttl) = config.pending_ttl() {
        let state = state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                let removed = state.pending.cleanup_expired(ttl);
                if removed > 0 {
                    tracing::info!(removed, "Dropped expired pending registrations");
                }
            }
        });
    }

    let mut sigint = signal(SignalKind::interrupt()).context("Failed to register SIGINT handler")?;
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to register SIGTERM handler")?;
    let mut sigquit = signal(SignalKind::quit()).context("Failed to register SIGQUIT handler")?;
    let (signal_tx, signal_rx) = tokio::sync::oneshot::channel();

    let app = routes::create_router(state);
    let listener = TcpListener::bind(&config.http_address).await?;
    tracing::info!("Listening on http://{}", config.http_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let received = tokio::select! {
                _ = sigint.recv() => Signal::SIGINT,
                _ = sigterm.recv() => Signal::SIGTERM,
                _ = sigquit.recv() => Signal::SIGQUIT,
            };
            tracing::info!(signal = %received, "Received signal, shutting down");
            let _ = signal_tx.send(received);
        })
        .await?;

    transfer_server.stop();

    match signal_rx.await {
        Ok(received) => std::process::exit(received as i32),
        Err(_) => Ok(()),
    }
}
