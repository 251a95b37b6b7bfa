use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use weekgrid_core::error::WeekgridError;

/// JSON API error. Renders as `{"message": "..."}` so clients can show it as is.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<WeekgridError> for ApiError {
    fn from(err: WeekgridError) -> Self {
        match &err {
            WeekgridError::Conflict { .. } | WeekgridError::InvalidInput(_) => {
                tracing::info!("rejected: {}", err);
                Self::bad_request(err.to_string())
            }
            WeekgridError::NotFound(_) => Self::not_found(err.to_string()),
            _ => {
                tracing::error!("api error: {}", err);
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::info!("malformed request body: {}", rejection.body_text());
        Self::bad_request(rejection.body_text())
    }
}
