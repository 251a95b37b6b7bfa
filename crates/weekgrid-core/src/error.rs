use thiserror::Error;

use crate::model::{SlotTime, Weekday};

#[derive(Debug, Error)]
pub enum WeekgridError {
    #[error("an activity already occupies {day} at {time}")]
    Conflict { day: Weekday, time: SlotTime },

    #[error("activity not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WeekgridError {
    /// Returns `true` when the server could not be reached or answered with a
    /// 5xx. The same request may succeed once the server is back.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, WeekgridError>;
