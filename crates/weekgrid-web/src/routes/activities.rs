use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, get};
use axum::Router;
use serde::{Deserialize, Serialize};
use weekgrid_core::client::MessageBody;
use weekgrid_core::model::{validate_new_activity, Activity};

use crate::error::ApiError;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/activities",
            get(list_activities).post(create_activity),
        )
        .route("/api/activities/{id}", delete(delete_activity))
}

// -- Request types --

/// Raw create payload, checked by `validate_new_activity` before it reaches the store.
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateActivityRequest {
    pub name: String,
    pub day: String,
    pub time: String,
    pub duration: i64,
}

// -- Handlers --

async fn list_activities(State(state): State<Arc<AppState>>) -> Json<Vec<Activity>> {
    Json(state.store.list())
}

async fn create_activity(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateActivityRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Activity>), ApiError> {
    let Json(input) = payload?;

    let rules = state.config.schedule.rules(&state.slots);
    let new_activity =
        validate_new_activity(&input.name, &input.day, &input.time, input.duration, &rules)?;

    let activity = state.store.create(new_activity)?;
    tracing::info!(id = %activity.id, day = %activity.day, time = %activity.time, "activity added");

    Ok((StatusCode::CREATED, Json(activity)))
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    state.store.delete(&id)?;
    tracing::info!(id = %id, "activity removed");
    Ok(Json(MessageBody {
        message: "activity deleted".to_string(),
    }))
}
