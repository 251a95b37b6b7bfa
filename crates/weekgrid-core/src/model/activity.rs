use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{SlotTime, Weekday};
use crate::error::{Result, WeekgridError};

pub const DEFAULT_MAX_NAME_LENGTH: usize = 50;

/// Generate an opaque, time-ordered identifier.
pub fn fresh_id() -> String {
    Uuid::now_v7().to_string()
}

/// A named occupation of one `(day, time)` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub day: Weekday,
    pub time: SlotTime,
    /// Length in minutes.
    pub duration: u32,
}

impl Activity {
    /// Assign a fresh identifier to a validated input.
    pub fn from_new(input: NewActivity) -> Self {
        Self {
            id: fresh_id(),
            name: input.name,
            day: input.day,
            time: input.time,
            duration: input.duration,
        }
    }

    pub fn occupies(&self, day: Weekday, time: SlotTime) -> bool {
        self.day == day && self.time == time
    }
}

/// Input for creating an activity. Carries no identifier; the store assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    pub name: String,
    pub day: Weekday,
    pub time: SlotTime,
    pub duration: u32,
}

impl NewActivity {
    pub fn new(name: impl Into<String>, day: Weekday, time: SlotTime, duration: u32) -> Self {
        Self {
            name: name.into(),
            day,
            time,
            duration,
        }
    }
}

/// Limits applied to create payloads at the API boundary.
#[derive(Debug, Clone, Copy)]
pub struct ActivityRules<'a> {
    pub max_name_length: usize,
    /// When set, the start time must be one of these slots.
    pub allowed_times: Option<&'a [SlotTime]>,
}

impl Default for ActivityRules<'_> {
    fn default() -> Self {
        Self {
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            allowed_times: None,
        }
    }
}

/// Validate raw create fields and turn them into a [`NewActivity`].
pub fn validate_new_activity(
    name: &str,
    day: &str,
    time: &str,
    duration: i64,
    rules: &ActivityRules<'_>,
) -> Result<NewActivity> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WeekgridError::InvalidInput("name cannot be empty".into()));
    }
    if name.chars().count() > rules.max_name_length {
        return Err(WeekgridError::InvalidInput(format!(
            "name exceeds maximum length of {} characters",
            rules.max_name_length
        )));
    }

    let day: Weekday = day.parse().map_err(WeekgridError::InvalidInput)?;
    let time: SlotTime = time.parse().map_err(WeekgridError::InvalidInput)?;

    if let Some(allowed) = rules.allowed_times {
        if !allowed.contains(&time) {
            return Err(WeekgridError::InvalidInput(format!(
                "time {time} is not on the schedule grid"
            )));
        }
    }

    let duration = u32::try_from(duration)
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| {
            WeekgridError::InvalidInput("duration must be a positive number of minutes".into())
        })?;

    Ok(NewActivity::new(name, day, time, duration))
}
