use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{Result, WeekgridError};
use crate::model::{fresh_id, Activity, NewActivity};

/// The authoritative in-memory collection of scheduled activities.
///
/// Holds the `(day, time)` uniqueness invariant: the collision check and
/// the append in [`create`](Self::create) happen under one lock, so two
/// concurrent creates for the same slot can never both succeed.
///
/// Nothing is persisted. The collection starts empty and is dropped with the
/// process; back it with a file or database if restarts must keep data.
#[derive(Debug, Default)]
pub struct ActivityStore {
    activities: Mutex<Vec<Activity>>,
}

impl ActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Writers never leave the Vec half-updated, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Vec<Activity>> {
        self.activities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// All activities in insertion order.
    pub fn list(&self) -> Vec<Activity> {
        self.lock().clone()
    }

    pub fn get(&self, id: &str) -> Option<Activity> {
        self.lock().iter().find(|a| a.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Insert a new activity unless its slot is already taken.
    pub fn create(&self, input: NewActivity) -> Result<Activity> {
        let mut activities = self.lock();

        if activities.iter().any(|a| a.occupies(input.day, input.time)) {
            tracing::debug!(day = %input.day, time = %input.time, "slot conflict");
            return Err(WeekgridError::Conflict {
                day: input.day,
                time: input.time,
            });
        }

        let mut activity = Activity::from_new(input);
        // ids must never collide with a live entry
        while activities.iter().any(|a| a.id == activity.id) {
            activity.id = fresh_id();
        }

        activities.push(activity.clone());
        tracing::debug!(id = %activity.id, "activity created");
        Ok(activity)
    }

    /// Remove the activity with the given id.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut activities = self.lock();
        let index = activities
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| WeekgridError::NotFound(id.to_string()))?;
        activities.remove(index);
        tracing::debug!(id, "activity deleted");
        Ok(())
    }
}
