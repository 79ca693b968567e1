use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use herald_core::AttachmentLimits;
use herald_dispatch::DispatchController;
use tracing::{info, warn};

use herald_server::api::AppState;
use herald_server::config::HeraldConfig;
use herald_server::files::FileStore;
use herald_server::workspace::Workspace;

/// Herald broadcast server.
#[derive(Parser, Debug)]
#[command(name = "herald-server", about = "HTTP backend for Herald broadcasts")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "herald.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (mut config, found) = HeraldConfig::load(Path::new(&cli.config))?;

    let telemetry_guard = herald_server::telemetry::init(&config.telemetry);

    if !found {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if config.hosted_files_unreachable() {
        warn!(
            public_url = %config.server.public_url(),
            "provider.upload_files is off and server.public_url is local; \
             the provider cannot download uploaded attachments"
        );
    }

    let api_token = config.provider.resolve_token();
    let transport = herald_server::transport_factory::create_transport(
        &config.provider,
        &config.addressing,
        api_token.as_ref(),
    )?;
    info!(provider = transport.name(), "transport initialized");

    let directory = herald_server::directory_factory::create_directory(&config.directory)?;
    info!(directory = directory.name(), "directory initialized");

    let controller =
        DispatchController::with_event_capacity(Arc::clone(&transport), config.dispatch.event_capacity);

    let state = AppState {
        directory,
        transport,
        controller: controller.clone(),
        workspace: Arc::new(Workspace::new(AttachmentLimits::from(&config.attachments))),
        files: Arc::new(FileStore::new()),
        message_delay: config.dispatch.message_delay(),
        public_url: config.server.public_url(),
        ui_path: Some(config.ui.dist_path.clone()),
        ui_enabled: config.ui.enabled,
    };

    // The server still starts when the first load fails; the operator can
    // retry with a reload.
    if let Err(e) = herald_server::api::recipients::load_directory(&state).await {
        warn!(error = %e, "initial directory load failed");
    }

    let app = herald_server::api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, public_url = %config.server.public_url(), "herald-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    info!(
        timeout_secs = config.server.shutdown_timeout_seconds,
        "stopping active dispatch run"
    );
    if tokio::time::timeout(shutdown_timeout, controller.shutdown())
        .await
        .is_err()
    {
        warn!(
            timeout_secs = config.server.shutdown_timeout_seconds,
            "shutdown timeout exceeded, dispatch run abandoned"
        );
    }

    telemetry_guard.shutdown();

    info!("herald-server shut down");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
