pub mod error;
pub mod routes;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use weekgrid_core::config::WeekgridConfig;
use weekgrid_core::model::SlotTime;
use weekgrid_core::store::ActivityStore;

pub struct AppState {
    pub store: ActivityStore,
    pub config: WeekgridConfig,
    /// Grid derived from `config.schedule`, computed once.
    pub slots: Vec<SlotTime>,
    pub started_at: Instant,
}

impl AppState {
    /// Fresh state with an empty store.
    pub fn new(config: WeekgridConfig) -> Self {
        let slots = config.schedule.slots();
        Self {
            store: ActivityStore::new(),
            config,
            slots,
            started_at: Instant::now(),
        }
    }
}

/// `[web]` values given on the command line.
#[derive(Debug, Default)]
pub struct WebOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<String>,
}

/// Apply `HOST`/`PORT` and command-line values on top of the loaded config.
///
/// Precedence: command line > environment > config files. Empty environment
/// values are ignored; a non-numeric `PORT` is an error.
pub fn apply_overrides(
    config: &mut WeekgridConfig,
    env_host: Option<String>,
    env_port: Option<String>,
    cli: WebOverrides,
) -> anyhow::Result<()> {
    if let Some(host) = env_host.filter(|h| !h.is_empty()) {
        config.web.host = host;
    }
    if let Some(port) = env_port.filter(|p| !p.is_empty()) {
        config.web.port = port
            .parse()
            .with_context(|| format!("invalid PORT value: {port}"))?;
    }

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if cli.static_dir.is_some() {
        config.web.static_dir = cli.static_dir;
    }
    Ok(())
}

/// The full application: API routes, optional static client, CORS, and
/// request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    let mut router = routes::router();

    if let Some(dir) = state.config.web.static_dir.as_deref() {
        let index = Path::new(dir).join("index.html");
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    router
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
