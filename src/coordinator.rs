//! Adjustment coordination: the pending/in-flight state machine.
//!
//! ```text
//! Idle ──policy fires, online──▶ InFlight ──ok──▶ Idle
//!  │                               │
//!  └──policy fires, offline──▶ Pending ◀──err──┘
//!                                │
//!                                └──offline→online edge──▶ InFlight
//! ```
//!
//! `Pending` is the persisted `adjustmentPending` flag: set the moment the
//! policy fires and cleared only when an adjustment succeeds, so the intent
//! survives failures and restarts. `InFlight` is not persisted. At most one
//! remote call runs at a time; a trigger that arrives while one is running is
//! dropped, not queued.
//!
//! Local transitions happen under a short synchronous lock that is never held
//! across a remote call, so sessions can be logged and connectivity observed
//! while a request is outstanding.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::model::{OnboardingData, SessionLog, UserProfile, WorkoutPlan};
use crate::planner::{AdjustmentError, GenerationError, PlanService};
use crate::policy;
use crate::recorder::{self, PlanDayNotFound};
use crate::storage::{Storage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("no workout plan yet: complete onboarding first")]
    NotOnboarded,

    #[error("a plan request is already in progress")]
    Busy,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = core::result::Result<T, CoordinatorError>;

/// What became of an adjustment trigger.
#[derive(Debug)]
pub enum AdjustmentOutcome {
    /// Offline: the adjustment waits for the next reconnect.
    Deferred,

    /// Another request was already running; this trigger was dropped.
    AlreadyInFlight,

    /// The plan was replaced.
    Applied,

    /// The request failed; the adjustment stays pending.
    Failed(AdjustmentError),

    /// The app was reset while the request ran; its result was discarded.
    Discarded,
}

/// The result of logging one session.
#[derive(Debug)]
pub struct Logged {
    /// Set when the session matched no day in the plan.
    pub miss: Option<PlanDayNotFound>,

    /// Set when the policy fired.
    pub adjustment: Option<AdjustmentOutcome>,
}

struct State {
    profile: Option<UserProfile>,
    plan: Option<Arc<WorkoutPlan>>,
    history: Arc<Vec<SessionLog>>,
    pending: bool,
    last_error: Option<String>,

    /// Bumped on reset so results of requests started before it are dropped.
    epoch: u64,
}

/// Owns the coach's state and drives plan adjustments.
///
/// Share it by reference (or `Arc`) with whatever runs the event loop.
pub struct Coordinator<P> {
    storage: Storage,
    planner: P,
    state: Mutex<State>,
    online: AtomicBool,
    in_flight: AtomicBool,
}

/// Holds the single-flight slot; releases it on drop.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn claim(slot: &'a AtomicBool) -> Option<Self> {
        slot.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(slot))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<P: PlanService> Coordinator<P> {
    /// Loads persisted state. `online` is the connectivity reading at startup;
    /// it is a level, not an edge, and never triggers a retry by itself.
    pub fn load(storage: Storage, planner: P, online: bool) -> Result<Self> {
        let state = State {
            profile: storage.load_profile()?,
            plan: storage.load_plan()?.map(Arc::new),
            history: Arc::new(storage.load_history()?),
            pending: storage.load_pending()?,
            last_error: None,
            epoch: 0,
        };
        debug!(
            sessions = state.history.len(),
            pending = state.pending,
            online,
            "coordinator loaded"
        );
        Ok(Self {
            storage,
            planner,
            state: Mutex::new(state),
            online: AtomicBool::new(online),
            in_flight: AtomicBool::new(false),
        })
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Read side ──

    pub fn profile(&self) -> Option<UserProfile> {
        self.state().profile.clone()
    }

    /// The current plan. The snapshot never changes under the caller.
    pub fn plan(&self) -> Option<Arc<WorkoutPlan>> {
        self.state().plan.clone()
    }

    /// Session history, oldest first.
    pub fn history(&self) -> Arc<Vec<SessionLog>> {
        Arc::clone(&self.state().history)
    }

    pub fn is_onboarded(&self) -> bool {
        let state = self.state();
        state.profile.is_some() && state.plan.is_some()
    }

    pub fn adjustment_pending(&self) -> bool {
        self.state().pending
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// True while a remote plan request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// The last remote failure, for display. Cleared when a new request starts.
    pub fn last_error(&self) -> Option<String> {
        self.state().last_error.clone()
    }

    // ── Onboarding ──

    /// Requests the first plan. Nothing is stored unless it succeeds, so a
    /// failed attempt can simply be retried with the same data.
    pub async fn generate_initial_plan(&self, data: &OnboardingData) -> Result<()> {
        let _flight = FlightGuard::claim(&self.in_flight).ok_or(CoordinatorError::Busy)?;
        let epoch = {
            let mut state = self.state();
            state.last_error = None;
            state.epoch
        };

        info!(goal = %data.fitness_profile.primary_goal, "requesting initial plan");
        let plan = match self.planner.generate_plan(data).await {
            Ok(plan) => plan,
            Err(e) => {
                error!(error = %e, "initial plan generation failed");
                self.state().last_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        let mut state = self.state();
        if state.epoch != epoch {
            warn!("reset during plan generation; discarding plan");
            return Ok(());
        }
        self.storage.save_plan(&plan)?;
        self.storage.save_profile(&data.user_profile)?;
        info!(plan = %plan.id, weeks = plan.weeks.len(), "initial plan stored");
        state.plan = Some(Arc::new(plan));
        state.profile = Some(data.user_profile.clone());
        Ok(())
    }

    // ── Session recording ──

    /// Records a completed session, then runs the adjustment policy.
    ///
    /// When the policy fires the adjustment is attempted right away if online,
    /// otherwise left pending for the next reconnect.
    pub async fn log_session(&self, log: SessionLog) -> Result<Logged> {
        let (miss, fires) = {
            let mut state = self.state();
            let plan = state.plan.as_ref().ok_or(CoordinatorError::NotOnboarded)?;
            let recorded = recorder::record_session(plan, &state.history, log.clone());
            let fires = policy::should_adjust(&recorded.history);

            // One transaction, so memory and store move together or not at all.
            let changed_plan = recorded.miss.is_none().then_some(&recorded.plan);
            self.storage.record_session(&log, changed_plan, fires)?;
            if let Some(miss) = &recorded.miss {
                warn!(%miss, "session recorded without a matching plan day");
            }
            debug!(session = %log.id, rpe = %log.rpe, total = recorded.history.len(), "session recorded");

            state.plan = Some(Arc::new(recorded.plan));
            state.history = Arc::new(recorded.history);
            if fires {
                state.pending = true;
            }
            (recorded.miss, fires)
        };

        if !fires {
            return Ok(Logged {
                miss,
                adjustment: None,
            });
        }

        info!("adjustment criteria met");
        let outcome = if self.is_online() {
            self.attempt_adjustment().await?
        } else {
            info!("offline; queuing adjustment for later");
            AdjustmentOutcome::Deferred
        };
        Ok(Logged {
            miss,
            adjustment: Some(outcome),
        })
    }

    // ── Connectivity ──

    /// Applies a connectivity reading. Returns true on an offline→online edge.
    fn observe_connectivity(&self, online: bool) -> bool {
        let was_online = self.online.swap(online, Ordering::AcqRel);
        if online && !was_online {
            info!("connection restored");
            true
        } else {
            if !online && was_online {
                info!("connection lost");
            }
            false
        }
    }

    /// Reacts to a connectivity reading, retrying a pending adjustment on the
    /// offline→online edge.
    ///
    /// Returns `None` when nothing was attempted: not an edge, or nothing pending.
    pub async fn connectivity_changed(&self, online: bool) -> Result<Option<AdjustmentOutcome>> {
        if !self.observe_connectivity(online) {
            return Ok(None);
        }
        self.retry_pending().await
    }

    async fn retry_pending(&self) -> Result<Option<AdjustmentOutcome>> {
        if !self.adjustment_pending() {
            return Ok(None);
        }
        info!("attempting pending adjustment");
        self.attempt_adjustment().await.map(Some)
    }

    /// Runs one adjustment request with the plan and sessions current right now.
    async fn attempt_adjustment(&self) -> Result<AdjustmentOutcome> {
        let Some(_flight) = FlightGuard::claim(&self.in_flight) else {
            debug!("adjustment already in flight; ignoring trigger");
            return Ok(AdjustmentOutcome::AlreadyInFlight);
        };

        let (plan, recent, epoch) = {
            let mut state = self.state();
            let plan = state.plan.clone().ok_or(CoordinatorError::NotOnboarded)?;
            state.last_error = None;
            let recent = policy::recent_sessions(&state.history).to_vec();
            (plan, recent, state.epoch)
        };

        info!(plan = %plan.id, sessions = recent.len(), "requesting plan adjustment");
        let result = self.planner.adjust_plan(&plan, &recent).await;

        let mut state = self.state();
        if state.epoch != epoch {
            warn!("reset during adjustment; discarding result");
            return Ok(AdjustmentOutcome::Discarded);
        }
        match result {
            Ok(next) => {
                self.storage.save_plan(&next)?;
                self.storage.save_pending(false)?;
                info!(plan = %next.id, "workout plan adjusted");
                state.plan = Some(Arc::new(next));
                state.pending = false;
                Ok(AdjustmentOutcome::Applied)
            }
            Err(e) => {
                warn!(error = %e, "plan adjustment failed; will retry on reconnect");
                self.storage.save_pending(true)?;
                state.pending = true;
                state.last_error = Some(e.to_string());
                Ok(AdjustmentOutcome::Failed(e))
            }
        }
    }

    // ── Reset ──

    /// Erases profile, plan, history, and the pending flag.
    pub fn reset(&self) -> Result<()> {
        let mut state = self.state();
        self.storage.reset()?;
        let epoch = state.epoch + 1;
        *state = State {
            profile: None,
            plan: None,
            history: Arc::new(Vec::new()),
            pending: false,
            last_error: None,
            epoch,
        };
        info!("all coach data erased");
        Ok(())
    }
}

impl<P: PlanService + 'static> Coordinator<P> {
    /// Follows a connectivity signal until its publisher goes away.
    ///
    /// The value at subscription time is taken as the starting level, not as
    /// an edge. Each offline→online transition spawns a retry so further
    /// readings keep being observed while it runs.
    pub async fn watch_connectivity(self: Arc<Self>, mut rx: watch::Receiver<bool>) {
        self.online.store(*rx.borrow_and_update(), Ordering::Release);
        while rx.changed().await.is_ok() {
            let online = *rx.borrow_and_update();
            if !self.observe_connectivity(online) {
                continue;
            }
            let this = Arc::clone(&self);
            tokio::spawn(async move {
                match this.retry_pending().await {
                    Ok(Some(AdjustmentOutcome::Failed(e))) => {
                        debug!(error = %e, "pending adjustment still failing");
                    }
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "pending adjustment aborted"),
                }
            });
        }
        debug!("connectivity signal closed");
    }
}
