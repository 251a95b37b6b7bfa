use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use weekgrid_core::config::WeekgridConfig;
use weekgrid_web::{AppState, WebOverrides};

#[derive(Parser)]
#[command(name = "weekgrid-web", about = "Weekgrid scheduling API server", version)]
struct Cli {
    /// Address to bind (overrides config and $HOST)
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on (overrides config and $PORT)
    #[arg(short, long)]
    port: Option<u16>,
    /// Serve the browser client from this directory
    #[arg(long)]
    static_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("weekgrid_web=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = WeekgridConfig::load(Some(&std::env::current_dir()?)).unwrap_or_else(|e| {
        tracing::warn!("{e}; using defaults");
        WeekgridConfig::default_config()
    });
    weekgrid_web::apply_overrides(
        &mut config,
        std::env::var("HOST").ok(),
        std::env::var("PORT").ok(),
        WebOverrides {
            host: cli.host,
            port: cli.port,
            static_dir: cli.static_dir,
        },
    )?;

    let addr = format!("{}:{}", config.web.host, config.web.port);
    let state = Arc::new(AppState::new(config));
    let app = weekgrid_web::app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("weekgrid-web listening on http://{addr}");
    tracing::info!("process id {}", std::process::id());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("weekgrid-web stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
