pub mod activities;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use weekgrid_core::client::HealthStatus;
use weekgrid_core::grid::GridLayout;

use crate::error::ApiError;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/api/slots", get(slots))
        .merge(activities::routes())
        .fallback(not_found)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "OK".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    })
}

async fn slots(State(state): State<Arc<AppState>>) -> Json<GridLayout> {
    Json(GridLayout::new(state.slots.clone()))
}

async fn not_found() -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        message: "no such route".to_string(),
    }
}
