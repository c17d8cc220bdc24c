//! Active workout sessions.
//!
//! `SessionEngine` keeps at most one running session per user. Each
//! session is a task spawned by `runner`; the engine only routes commands
//! to it and reads its published view.

pub mod accounting;
pub mod runner;
pub mod state;
pub mod store;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, Mutex, OwnedMutexGuard};

use crate::error::{AppError, Result};
use crate::models::{PendingSnapshot, WorkoutPlan};
use runner::{SessionHandle, SessionRunner};

pub use runner::{Command, CommandOutcome, SessionStatus, SessionView};
pub use state::{Phase, SessionState, SessionTiming, SkipOutcome, Tick, Transition};
pub use store::{HistoryStore, PendingStore};

#[derive(Clone)]
pub struct SessionEngine {
    sessions: Arc<Mutex<HashMap<String, SessionHandle>>>,
    /// Serializes start and resume per user so store I/O runs outside the
    /// `sessions` lock.
    launches: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    history: Arc<dyn HistoryStore>,
    pending: Arc<dyn PendingStore>,
    timing: SessionTiming,
}

impl SessionEngine {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        pending: Arc<dyn PendingStore>,
        timing: SessionTiming,
    ) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            launches: Arc::new(Mutex::new(HashMap::new())),
            history,
            pending,
            timing,
        }
    }

    /// Start a session for `plan`.
    ///
    /// A saved pending workout blocks the start unless `discard_pending` is
    /// set, in which case the snapshot is deleted first.
    pub async fn start(
        &self,
        user_id: &str,
        plan: WorkoutPlan,
        discard_pending: bool,
    ) -> Result<SessionView> {
        let _launch = self.launch_guard(user_id).await;
        self.ensure_idle(user_id).await?;

        let state = SessionState::start(plan, Utc::now(), &self.timing)?;

        if self.pending.load(user_id).await?.is_some() {
            if !discard_pending {
                return Err(AppError::PendingWorkoutExists);
            }
            self.pending.clear(user_id).await?;
            tracing::info!(user_id = %user_id, "Discarded pending workout to start a new one");
        }

        Ok(self.launch(user_id, state).await)
    }

    /// Continue the saved pending workout from a fresh PREP phase.
    ///
    /// The snapshot is only removed from the store once it has been checked.
    /// A snapshot that fails the check stays stored so it can be discarded.
    pub async fn resume(&self, user_id: &str) -> Result<SessionView> {
        let _launch = self.launch_guard(user_id).await;
        self.ensure_idle(user_id).await?;

        let snapshot = self
            .pending
            .load(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No pending workout to resume".to_string()))?;
        if let Err(reason) = snapshot.validate() {
            tracing::warn!(user_id = %user_id, "Pending workout is not resumable: {}", reason);
            return Err(AppError::Validation(reason));
        }

        let snapshot = self
            .pending
            .take(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No pending workout to resume".to_string()))?;
        let state = SessionState::resume(snapshot, &self.timing)?;

        Ok(self.launch(user_id, state).await)
    }

    pub async fn pending(&self, user_id: &str) -> Result<Option<PendingSnapshot>> {
        self.pending.load(user_id).await
    }

    pub async fn discard_pending(&self, user_id: &str) -> Result<bool> {
        let removed = self.pending.clear(user_id).await?;
        if removed {
            tracing::info!(user_id = %user_id, "Pending workout discarded");
        }
        Ok(removed)
    }

    /// View of the user's running session, if any.
    pub async fn current(&self, user_id: &str) -> Option<SessionView> {
        let mut sessions = self.sessions.lock().await;
        Self::prune(&mut sessions, user_id);
        sessions.get(user_id).map(SessionHandle::view)
    }

    /// Follow every view the running session publishes.
    pub async fn subscribe(&self, user_id: &str) -> Option<watch::Receiver<SessionView>> {
        let sessions = self.sessions.lock().await;
        sessions.get(user_id).map(SessionHandle::subscribe)
    }

    pub async fn active_count(&self) -> usize {
        let sessions = self.sessions.lock().await;
        sessions.values().filter(|handle| !handle.is_finished()).count()
    }

    /// Deliver `command` to the user's session. Without a running session
    /// the outcome is `Inactive`, so repeated end requests are harmless.
    pub async fn send_command(&self, user_id: &str, command: Command) -> Result<CommandOutcome> {
        let handle = {
            let sessions = self.sessions.lock().await;
            sessions.get(user_id).cloned()
        };

        let Some(handle) = handle else {
            tracing::debug!(user_id = %user_id, ?command, "No running session");
            return Ok(CommandOutcome::Inactive);
        };

        let outcome = handle.send(command).await?;

        if matches!(
            outcome,
            CommandOutcome::Paused(_) | CommandOutcome::Completed(_) | CommandOutcome::Abandoned
        ) {
            let mut sessions = self.sessions.lock().await;
            if sessions
                .get(user_id)
                .is_some_and(|current| current.session_id == handle.session_id)
            {
                sessions.remove(user_id);
            }
        }

        Ok(outcome)
    }

    pub async fn finish_set(&self, user_id: &str) -> Result<CommandOutcome> {
        self.send_command(user_id, Command::FinishSet).await
    }

    pub async fn skip_exercise(&self, user_id: &str) -> Result<CommandOutcome> {
        self.send_command(user_id, Command::SkipExercise).await
    }

    pub async fn skip_phase(&self, user_id: &str) -> Result<CommandOutcome> {
        self.send_command(user_id, Command::SkipPhase).await
    }

    pub async fn end_early(&self, user_id: &str) -> Result<CommandOutcome> {
        self.send_command(user_id, Command::EndEarly).await
    }

    pub async fn retry_save(&self, user_id: &str) -> Result<CommandOutcome> {
        self.send_command(user_id, Command::RetrySave).await
    }

    pub async fn abandon(&self, user_id: &str) -> Result<CommandOutcome> {
        self.send_command(user_id, Command::Abandon).await
    }

    async fn launch_guard(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut launches = self.launches.lock().await;
            launches.entry(user_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    async fn ensure_idle(&self, user_id: &str) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        Self::prune(&mut sessions, user_id);
        if sessions.contains_key(user_id) {
            return Err(AppError::SessionActive);
        }
        Ok(())
    }

    /// Callers hold the user's launch guard and have checked `ensure_idle`.
    async fn launch(&self, user_id: &str, state: SessionState) -> SessionView {
        let handle = SessionRunner::spawn(
            user_id,
            state,
            self.timing,
            self.history.clone(),
            self.pending.clone(),
        );
        let view = handle.view();
        self.sessions
            .lock()
            .await
            .insert(user_id.to_string(), handle);
        view
    }

    fn prune(sessions: &mut HashMap<String, SessionHandle>, user_id: &str) {
        if sessions.get(user_id).is_some_and(SessionHandle::is_finished) {
            sessions.remove(user_id);
        }
    }
}
