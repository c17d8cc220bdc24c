//! The task that drives one active session.
//!
//! Each session gets its own tokio task. The task owns the `SessionState`
//! and a single clock, and handles one event at a time: a command from the
//! engine, a one-second tick, or the end of the settle delay. Views of the
//! state are published on a `watch` channel after every change.

use std::future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant, Interval, MissedTickBehavior, Sleep};
use uuid::Uuid;

use super::state::{Phase, SessionState, SessionTiming, SkipOutcome, Tick, Transition};
use super::store::{HistoryStore, PendingStore};
use crate::error::Result;
use crate::models::{CompletedWorkoutRecord, PendingSnapshot};

const TICK_PERIOD: Duration = Duration::from_secs(1);
const COMMAND_BUFFER: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    /// A phase finished and the next one starts after the settle delay.
    Settling,
    /// The session finished but the history write failed; retry is possible.
    SaveFailed,
    Completed,
    Paused,
    Abandoned,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Paused | SessionStatus::Abandoned
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub status: SessionStatus,
    pub plan_label: String,
    pub exercise_index: usize,
    pub exercise_count: usize,
    pub exercise_name: String,
    pub set_number: u32,
    pub total_sets: u32,
    pub phase: Phase,
    pub remaining_seconds: u32,
    pub phase_total_seconds: u32,
    pub calories_so_far: f64,
    pub started_at: DateTime<Utc>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    FinishSet,
    SkipExercise,
    SkipPhase,
    EndEarly,
    RetrySave,
    Abandon,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum CommandOutcome {
    Applied(SessionView),
    /// The command was not valid in the current phase; nothing changed.
    Ignored(SessionView),
    Paused(PendingSnapshot),
    Completed(CompletedWorkoutRecord),
    Abandoned,
    /// No session was running to receive the command.
    Inactive,
}

struct Envelope {
    command: Command,
    reply: oneshot::Sender<Result<CommandOutcome>>,
}

/// Engine-side end of a running session.
#[derive(Clone)]
pub(crate) struct SessionHandle {
    pub(crate) session_id: String,
    commands: mpsc::Sender<Envelope>,
    views: watch::Receiver<SessionView>,
}

impl SessionHandle {
    pub(crate) fn view(&self) -> SessionView {
        self.views.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.views.clone()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.commands.is_closed() || self.views.borrow().status.is_terminal()
    }

    /// Deliver a command and wait for the runner's answer. A runner that
    /// stopped before answering reports `Inactive`.
    pub(crate) async fn send(&self, command: Command) -> Result<CommandOutcome> {
        let (reply, response) = oneshot::channel();
        if self.commands.send(Envelope { command, reply }).await.is_err() {
            return Ok(CommandOutcome::Inactive);
        }
        response.await.unwrap_or(Ok(CommandOutcome::Inactive))
    }
}

enum Clock {
    Idle,
    Ticking(Interval),
    Settling {
        delay: Pin<Box<Sleep>>,
        transition: Transition,
    },
}

enum ClockEvent {
    Tick,
    Settled,
}

impl Clock {
    fn ticking() -> Self {
        let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Clock::Ticking(interval)
    }

    fn settling(delay: Duration, transition: Transition) -> Self {
        Clock::Settling {
            delay: Box::pin(time::sleep(delay)),
            transition,
        }
    }

    fn is_settling(&self) -> bool {
        matches!(self, Clock::Settling { .. })
    }

    async fn fired(&mut self) -> ClockEvent {
        match self {
            Clock::Idle => future::pending().await,
            Clock::Ticking(interval) => {
                interval.tick().await;
                ClockEvent::Tick
            }
            Clock::Settling { delay, .. } => {
                delay.as_mut().await;
                ClockEvent::Settled
            }
        }
    }
}

enum Event {
    Command(Envelope),
    Clock(ClockEvent),
    Closed,
}

enum Flow {
    Continue,
    Exit,
}

pub(crate) struct SessionRunner {
    user_id: String,
    session_id: String,
    state: SessionState,
    timing: SessionTiming,
    clock: Clock,
    unsaved: Option<CompletedWorkoutRecord>,
    last_error: Option<String>,
    wall_origin: DateTime<Utc>,
    clock_origin: Instant,
    history: Arc<dyn HistoryStore>,
    pending: Arc<dyn PendingStore>,
    commands: mpsc::Receiver<Envelope>,
    views: watch::Sender<SessionView>,
}

impl SessionRunner {
    pub(crate) fn spawn(
        user_id: &str,
        state: SessionState,
        timing: SessionTiming,
        history: Arc<dyn HistoryStore>,
        pending: Arc<dyn PendingStore>,
    ) -> SessionHandle {
        let session_id = Uuid::new_v4().to_string();
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let initial = build_view(&session_id, &state, &timing, SessionStatus::Running, None);
        let (views, views_rx) = watch::channel(initial);

        let runner = SessionRunner {
            user_id: user_id.to_string(),
            session_id: session_id.clone(),
            state,
            timing,
            clock: Clock::Idle,
            unsaved: None,
            last_error: None,
            wall_origin: Utc::now(),
            clock_origin: Instant::now(),
            history,
            pending,
            commands,
            views,
        };
        tokio::spawn(runner.run());

        SessionHandle {
            session_id,
            commands: commands_tx,
            views: views_rx,
        }
    }

    async fn run(mut self) {
        tracing::info!(
            user_id = %self.user_id,
            session_id = %self.session_id,
            plan = %self.state.plan().label,
            exercise_index = self.state.exercise_index(),
            set_number = self.state.set_number(),
            "Workout session running"
        );
        self.clock = Clock::ticking();

        loop {
            let event = tokio::select! {
                envelope = self.commands.recv() => match envelope {
                    Some(envelope) => Event::Command(envelope),
                    None => Event::Closed,
                },
                fired = self.clock.fired() => Event::Clock(fired),
            };

            let flow = match event {
                Event::Command(Envelope { command, reply }) => {
                    let (flow, result) = self.handle(command).await;
                    let _ = reply.send(result);
                    flow
                }
                Event::Clock(ClockEvent::Tick) => self.on_tick(),
                Event::Clock(ClockEvent::Settled) => self.on_settled().await,
                Event::Closed => {
                    tracing::debug!(session_id = %self.session_id, "Session handle dropped");
                    Flow::Exit
                }
            };

            if let Flow::Exit = flow {
                break;
            }
        }

        tracing::debug!(session_id = %self.session_id, "Session runner stopped");
    }

    async fn handle(&mut self, command: Command) -> (Flow, Result<CommandOutcome>) {
        if self.unsaved.is_some() {
            return match command {
                Command::RetrySave => self.save_record().await,
                Command::Abandon => self.abandon(),
                _ => self.ignored(command),
            };
        }

        match command {
            Command::Abandon => self.abandon(),
            Command::EndEarly => self.end_early().await,
            // A transition is in flight; manual input waits for it to land.
            _ if self.clock.is_settling() => self.ignored(command),
            Command::FinishSet => {
                if self.state.finish_set_early() {
                    self.publish();
                    self.applied()
                } else {
                    self.ignored(command)
                }
            }
            Command::SkipPhase => {
                if self.state.skip_phase() {
                    self.complete_phase();
                    self.applied()
                } else {
                    self.ignored(command)
                }
            }
            Command::SkipExercise => match self.state.skip_exercise(&self.timing) {
                SkipOutcome::Advanced => {
                    tracing::debug!(
                        session_id = %self.session_id,
                        exercise_index = self.state.exercise_index(),
                        "Skipped to next exercise"
                    );
                    self.clock = Clock::ticking();
                    self.publish();
                    self.applied()
                }
                SkipOutcome::EndEarly => self.end_early().await,
            },
            Command::RetrySave => self.ignored(command),
        }
    }

    fn on_tick(&mut self) -> Flow {
        match self.state.tick() {
            Tick::Counting => self.publish(),
            Tick::PhaseComplete => self.complete_phase(),
        }
        Flow::Continue
    }

    /// Stop the ticker and schedule the next phase behind the settle delay.
    fn complete_phase(&mut self) {
        let transition = self.state.next_transition(&self.timing);
        tracing::debug!(
            session_id = %self.session_id,
            phase = self.state.phase().as_str(),
            ?transition,
            "Phase complete"
        );
        self.clock = Clock::settling(self.timing.settle_delay, transition);
        self.publish();
    }

    async fn on_settled(&mut self) -> Flow {
        let transition = match std::mem::replace(&mut self.clock, Clock::Idle) {
            Clock::Settling { transition, .. } => transition,
            other => {
                self.clock = other;
                return Flow::Continue;
            }
        };

        match transition {
            Transition::Enter { .. } => {
                self.state.apply(transition);
                self.clock = Clock::ticking();
                self.publish();
                Flow::Continue
            }
            Transition::Complete => {
                self.unsaved = Some(self.state.completed_record(self.now()));
                self.save_record().await.0
            }
        }
    }

    async fn save_record(&mut self) -> (Flow, Result<CommandOutcome>) {
        let result = match &self.unsaved {
            Some(record) => self.history.append(&self.user_id, record).await,
            None => return (Flow::Continue, Ok(CommandOutcome::Ignored(self.view()))),
        };

        if let Err(e) = result {
            tracing::error!(
                user_id = %self.user_id,
                session_id = %self.session_id,
                "Failed to save completed workout: {}",
                e
            );
            self.last_error = Some(e.to_string());
            self.publish();
            return (Flow::Continue, Err(e));
        }

        // The record is stored either way; a stale snapshot is surfaced on
        // the final view so the caller can discard it.
        self.last_error = match self.pending.clear(&self.user_id).await {
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(
                    user_id = %self.user_id,
                    "Workout saved but clearing the pending snapshot failed: {}",
                    e
                );
                Some(format!("Pending workout not cleared: {}", e))
            }
        };
        let outcome = match self.unsaved.take() {
            Some(record) => {
                tracing::info!(
                    user_id = %self.user_id,
                    session_id = %self.session_id,
                    duration_seconds = record.total_duration_seconds,
                    calories = record.calories_burned,
                    "Workout completed"
                );
                CommandOutcome::Completed(record)
            }
            None => CommandOutcome::Inactive,
        };
        self.publish_status(SessionStatus::Completed);
        (Flow::Exit, Ok(outcome))
    }

    async fn end_early(&mut self) -> (Flow, Result<CommandOutcome>) {
        let snapshot = self.state.snapshot(self.now());

        if let Err(e) = self.pending.save(&self.user_id, &snapshot).await {
            tracing::error!(
                user_id = %self.user_id,
                session_id = %self.session_id,
                "Failed to save pending workout; session keeps running: {}",
                e
            );
            self.last_error = Some(e.to_string());
            self.publish();
            return (Flow::Continue, Err(e));
        }

        self.clock = Clock::Idle;
        self.last_error = None;
        self.publish_status(SessionStatus::Paused);
        tracing::info!(
            user_id = %self.user_id,
            session_id = %self.session_id,
            exercise_index = snapshot.exercise_index,
            set_number = snapshot.set_number,
            calories = snapshot.calories_accrued,
            "Workout paused"
        );
        (Flow::Exit, Ok(CommandOutcome::Paused(snapshot)))
    }

    fn abandon(&mut self) -> (Flow, Result<CommandOutcome>) {
        if let Some(record) = self.unsaved.take() {
            tracing::warn!(
                user_id = %self.user_id,
                record_id = %record.id,
                "Abandoning session with an unsaved workout record"
            );
        }
        self.clock = Clock::Idle;
        self.publish_status(SessionStatus::Abandoned);
        tracing::info!(session_id = %self.session_id, "Workout abandoned");
        (Flow::Exit, Ok(CommandOutcome::Abandoned))
    }

    fn applied(&self) -> (Flow, Result<CommandOutcome>) {
        (Flow::Continue, Ok(CommandOutcome::Applied(self.view())))
    }

    fn ignored(&self, command: Command) -> (Flow, Result<CommandOutcome>) {
        tracing::debug!(session_id = %self.session_id, ?command, "Command ignored");
        (Flow::Continue, Ok(CommandOutcome::Ignored(self.view())))
    }

    /// Wall time measured on the runtime clock, so durations follow the
    /// same monotonic source as the countdown.
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.clock_origin.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.wall_origin + elapsed
    }

    fn status(&self) -> SessionStatus {
        if self.unsaved.is_some() {
            SessionStatus::SaveFailed
        } else if self.clock.is_settling() {
            SessionStatus::Settling
        } else {
            SessionStatus::Running
        }
    }

    fn view(&self) -> SessionView {
        build_view(
            &self.session_id,
            &self.state,
            &self.timing,
            self.status(),
            self.last_error.clone(),
        )
    }

    fn publish(&self) {
        self.views.send_replace(self.view());
    }

    fn publish_status(&self, status: SessionStatus) {
        let mut view = self.view();
        view.status = status;
        self.views.send_replace(view);
    }
}

fn build_view(
    session_id: &str,
    state: &SessionState,
    timing: &SessionTiming,
    status: SessionStatus,
    last_error: Option<String>,
) -> SessionView {
    let exercise = state.current_exercise();
    SessionView {
        session_id: session_id.to_string(),
        status,
        plan_label: state.plan().label.clone(),
        exercise_index: state.exercise_index(),
        exercise_count: state.plan().exercises.len(),
        exercise_name: exercise.name.clone(),
        set_number: state.set_number(),
        total_sets: exercise.sets,
        phase: state.phase(),
        remaining_seconds: state.display_seconds(),
        phase_total_seconds: state.phase_total_seconds(timing),
        calories_so_far: state.calories_so_far(),
        started_at: state.started_at(),
        last_error,
    }
}
