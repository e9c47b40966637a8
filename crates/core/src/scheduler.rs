//! Round timer: advances a shared session every `interval_ms` while running.
//!
//! The session sits behind one mutex together with the running flag and a
//! generation counter. A timer task only mutates the session while holding
//! that lock and only if its generation is still current; `stop` bumps the
//! generation under the same lock, so no round can advance once `stop`
//! returns, even if the task had already woken up.

use crate::error::NBackError;
use crate::modality::Modality;
use crate::session::{NBackSession, SessionConfig, SessionSnapshot};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

#[derive(Debug)]
struct Shared {
    session: NBackSession,
    running: bool,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Shared {
    fn halt(&mut self) {
        self.running = false;
        self.generation = self.generation.wrapping_add(1);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Cloneable handle to a timer-driven session.
#[derive(Debug, Clone)]
pub struct Trainer {
    shared: Arc<Mutex<Shared>>,
}

impl Trainer {
    pub fn new(session: NBackSession) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                session,
                running: false,
                generation: 0,
                task: None,
            })),
        }
    }

    pub fn configure(config: SessionConfig) -> Result<Self, NBackError> {
        Ok(Self::new(NBackSession::configure(config)?))
    }

    /// Replace the session with a fresh one. Stops the timer first.
    ///
    /// An invalid config is rejected before anything is touched.
    pub fn reconfigure(&self, config: SessionConfig) -> Result<(), NBackError> {
        self.replace_session(NBackSession::configure(config)?);
        Ok(())
    }

    pub fn replace_session(&self, session: NBackSession) {
        let mut s = self.lock();
        s.halt();
        s.session = session;
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        // Poisoning still leaves a consistent session: rounds cannot panic mid-update.
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start ticking. Returns `Ok(false)` if already running.
    ///
    /// The first round fires one interval after this call.
    pub fn start(&self) -> Result<bool, NBackError> {
        let handle = Handle::try_current().map_err(|_| NBackError::NoRuntime)?;

        let mut s = self.lock();
        if s.running {
            return Ok(false);
        }
        self.start_locked(&mut s, &handle);
        Ok(true)
    }

    fn start_locked(&self, s: &mut Shared, handle: &Handle) {
        s.running = true;
        s.generation = s.generation.wrapping_add(1);

        let period = s.session.config().interval();
        let task = handle.spawn(run_rounds(
            Arc::downgrade(&self.shared),
            s.generation,
            period,
        ));
        s.task = Some(task);
        info!("Trainer started (interval={}ms)", period.as_millis());
    }

    /// Stop ticking. Returns `false` if already stopped.
    pub fn stop(&self) -> bool {
        let mut s = self.lock();
        if !s.running {
            return false;
        }
        s.halt();
        info!(
            "Trainer stopped after {} rounds",
            s.session.rounds_presented()
        );
        true
    }

    /// Flip between running and stopped; returns the new state.
    ///
    /// The decision and the flip happen under one lock, so concurrent toggles
    /// each flip exactly once.
    pub fn toggle(&self) -> Result<bool, NBackError> {
        let handle = Handle::try_current().ok();

        let mut s = self.lock();
        let was_running = s.running;
        if was_running {
            s.halt();
        } else {
            let handle = handle.ok_or(NBackError::NoRuntime)?;
            self.start_locked(&mut s, &handle);
        }
        let now_running = s.running;
        info!(
            "Play state changed: {} -> {}",
            if was_running { "running" } else { "stopped" },
            if now_running { "running" } else { "stopped" }
        );
        Ok(now_running)
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    pub fn declare_response(&self, modality: Modality, is_match: bool) -> Result<(), NBackError> {
        self.lock().session.declare_response(modality, is_match)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let s = self.lock();
        s.session.snapshot(s.running)
    }

    /// Run `f` against the session under the lock.
    pub fn with_session<R>(&self, f: impl FnOnce(&NBackSession) -> R) -> R {
        f(&self.lock().session)
    }
}

async fn run_rounds(shared: Weak<Mutex<Shared>>, generation: u64, period: Duration) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(strong) = shared.upgrade() else {
            break;
        };
        let mut s = strong.lock().unwrap_or_else(PoisonError::into_inner);
        if !s.running || s.generation != generation {
            break;
        }
        let next = s.session.advance();
        debug!(
            "round {} presented (position={})",
            s.session.rounds_presented(),
            next.position
        );
    }
}
