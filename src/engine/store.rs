use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CompletedWorkoutRecord, PendingSnapshot};

/// Append-only storage for finished workouts.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, user_id: &str, record: &CompletedWorkoutRecord) -> Result<()>;
}

/// Storage for the single paused session a user may have.
#[async_trait]
pub trait PendingStore: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<PendingSnapshot>>;

    /// Write the snapshot, replacing any existing one.
    async fn save(&self, user_id: &str, snapshot: &PendingSnapshot) -> Result<()>;

    /// Read and delete the snapshot in one step.
    async fn take(&self, user_id: &str) -> Result<Option<PendingSnapshot>>;

    /// Delete the snapshot. Returns whether one existed.
    async fn clear(&self, user_id: &str) -> Result<bool>;
}
