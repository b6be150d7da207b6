//! Session lifecycle: which listener, if any, the playout loop serves.
//!
//! ```text
//! Idle --attach--> Active --detach / finish--> Idle
//!   \                 |
//!    `---disable------+-----> Stopped (terminal)
//! ```
//!
//! The slot is shared between the accept path and the playout thread, so every
//! transition goes through one mutex. Sinks are closed outside the lock.

use std::{path::Path, time::Duration};

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    common::{PlayoutError, SessionId},
    playout::sink::SharedSink,
};

/// The listener currently being served, as borrowed by the playout loop.
#[derive(Clone)]
pub struct ActiveSession {
    pub id: SessionId,
    pub sink: SharedSink,
}

enum Slot {
    Idle,
    Active {
        session: ActiveSession,
        track: Option<String>,
        chunks_sent: u64,
    },
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Idle,
    Active,
    Stopped,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub state: LifecycleState,
    pub session_id: Option<SessionId>,
    pub current_track: Option<String>,
    pub chunks_sent: u64,
}

/// What the playout loop found after waiting for a listener.
pub enum Wait {
    Session(ActiveSession),
    Idle,
    Stopped,
}

pub struct SessionManager {
    slot: Mutex<Slot>,
    wake: Condvar,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Idle),
            wake: Condvar::new(),
        }
    }

    /// Makes `sink` the current listener.
    ///
    /// A listener already attached is pre-empted and its connection closed.
    /// A stopped manager refuses and closes the offered sink.
    pub fn attach(&self, sink: SharedSink) -> Result<SessionId, PlayoutError> {
        let mut slot = self.slot.lock();
        if matches!(*slot, Slot::Stopped) {
            drop(slot);
            sink.close();
            return Err(PlayoutError::Stopped);
        }

        let id = SessionId::generate();
        let previous = std::mem::replace(
            &mut *slot,
            Slot::Active {
                session: ActiveSession {
                    id: id.clone(),
                    sink,
                },
                track: None,
                chunks_sent: 0,
            },
        );
        drop(slot);
        self.wake.notify_all();

        if let Slot::Active { session, .. } = previous {
            info!("Session {} pre-empted by {}", session.id, id);
            session.sink.close();
        }
        info!("Session {} attached", id);
        Ok(id)
    }

    /// Ends the current session, closing its connection.
    pub fn detach(&self) -> Option<SessionId> {
        let session = self.take(|_| true)?;
        session.sink.close();
        info!("Session {} detached", session.id);
        Some(session.id)
    }

    /// Detaches `id` only if it is still the current session.
    pub fn detach_session(&self, id: &SessionId) -> bool {
        self.take_if_current(id, true)
    }

    /// Clears `id` after a completed pass without closing its connection.
    pub fn finish(&self, id: &SessionId) -> bool {
        self.take_if_current(id, false)
    }

    fn take_if_current(&self, id: &SessionId, close: bool) -> bool {
        let Some(session) = self.take(|session| &session.id == id) else {
            return false;
        };

        if close {
            session.sink.close();
            info!("Session {} detached", id);
        } else {
            debug!("Session {} cleared", id);
        }
        true
    }

    /// Moves the slot back to idle when the active session matches.
    fn take(&self, pred: impl Fn(&ActiveSession) -> bool) -> Option<ActiveSession> {
        let mut slot = self.slot.lock();
        match std::mem::replace(&mut *slot, Slot::Idle) {
            Slot::Active { session, .. } if pred(&session) => Some(session),
            other => {
                *slot = other;
                None
            }
        }
    }

    /// Stops the manager for good, closing any attached connection.
    pub fn disable(&self) {
        let previous = std::mem::replace(&mut *self.slot.lock(), Slot::Stopped);
        self.wake.notify_all();

        match previous {
            Slot::Active { session, .. } => {
                session.sink.close();
                info!("Session {} closed: engine disabled", session.id);
            }
            Slot::Idle => info!("Engine disabled"),
            Slot::Stopped => {}
        }
    }

    pub fn is_stopped(&self) -> bool {
        matches!(*self.slot.lock(), Slot::Stopped)
    }

    pub fn is_current(&self, id: &SessionId) -> bool {
        matches!(&*self.slot.lock(), Slot::Active { session, .. } if &session.id == id)
    }

    /// Returns the current session, waiting up to `timeout` for one while idle.
    ///
    /// `attach` and `disable` wake the waiter early.
    pub fn wait_for_session(&self, timeout: Duration) -> Wait {
        let mut slot = self.slot.lock();
        if matches!(*slot, Slot::Idle) {
            self.wake.wait_for(&mut slot, timeout);
        }
        match &*slot {
            Slot::Active { session, .. } => Wait::Session(session.clone()),
            Slot::Idle => Wait::Idle,
            Slot::Stopped => Wait::Stopped,
        }
    }

    pub fn set_track(&self, id: &SessionId, path: &Path) {
        if let Slot::Active { session, track, .. } = &mut *self.slot.lock() {
            if &session.id == id {
                *track = Some(path.display().to_string());
            }
        }
    }

    pub fn record_chunk(&self, id: &SessionId) {
        if let Slot::Active {
            session,
            chunks_sent,
            ..
        } = &mut *self.slot.lock()
        {
            if &session.id == id {
                *chunks_sent += 1;
            }
        }
    }

    pub fn status(&self) -> SessionStatus {
        match &*self.slot.lock() {
            Slot::Idle => SessionStatus {
                state: LifecycleState::Idle,
                session_id: None,
                current_track: None,
                chunks_sent: 0,
            },
            Slot::Active {
                session,
                track,
                chunks_sent,
            } => SessionStatus {
                state: LifecycleState::Active,
                session_id: Some(session.id.clone()),
                current_track: track.clone(),
                chunks_sent: *chunks_sent,
            },
            Slot::Stopped => SessionStatus {
                state: LifecycleState::Stopped,
                session_id: None,
                current_track: None,
                chunks_sent: 0,
            },
        }
    }
}
