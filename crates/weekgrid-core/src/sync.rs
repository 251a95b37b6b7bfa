//! Cache-aside access to the schedule: try the server, fall back to the
//! last snapshot when it cannot be reached.
//!
//! The snapshot is only ever overwritten from server answers. There is no
//! reconciliation and no automatic retry.

use crate::cache::{Snapshot, SnapshotCache};
use crate::client::ScheduleClient;
use crate::error::Result;
use crate::model::{Activity, NewActivity};

/// Where a loaded activity list came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote,
    /// Served from the snapshot; carries the failure that forced the fallback.
    Cache { reason: String },
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub activities: Vec<Activity>,
    pub source: Source,
}

impl Loaded {
    pub fn is_stale(&self) -> bool {
        matches!(self.source, Source::Cache { .. })
    }
}

pub struct CachedSchedule {
    client: ScheduleClient,
    cache: SnapshotCache,
}

impl CachedSchedule {
    pub fn new(client: ScheduleClient, cache: SnapshotCache) -> Self {
        Self { client, cache }
    }

    pub fn client(&self) -> &ScheduleClient {
        &self.client
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    pub fn snapshot(&self) -> Snapshot {
        self.cache.load()
    }

    /// Fetch the list from the server; on any failure read the snapshot.
    pub async fn load(&self) -> Loaded {
        match self.client.list().await {
            Ok(activities) => {
                if let Err(e) = self
                    .cache
                    .update(|s| s.activities = activities.clone())
                {
                    tracing::warn!("failed to write snapshot: {e}");
                }
                Loaded {
                    activities,
                    source: Source::Remote,
                }
            }
            Err(e) => {
                tracing::warn!("server unavailable, using cached snapshot: {e}");
                Loaded {
                    activities: self.cache.load().activities,
                    source: Source::Cache {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// Create remotely. The form draft is remembered whether or not the
    /// server accepts it; the cached list only grows on success.
    pub async fn add(&self, input: NewActivity) -> Result<Activity> {
        if let Err(e) = self.cache.update(|s| s.last_form = Some(input.clone())) {
            tracing::warn!("failed to remember form draft: {e}");
        }

        let created = self.client.create(&input).await?;
        let saved = created.clone();
        if let Err(e) = self.cache.update(move |s| s.activities.push(saved)) {
            tracing::warn!("failed to write snapshot: {e}");
        }
        Ok(created)
    }

    /// Delete remotely and drop the entry from the snapshot on success.
    pub async fn remove(&self, id: &str) -> Result<String> {
        let message = self.client.delete(id).await?;
        if let Err(e) = self.cache.update(|s| s.activities.retain(|a| a.id != id)) {
            tracing::warn!("failed to write snapshot: {e}");
        }
        Ok(message)
    }
}
