//! The single shared game session, behind one async lock.
//!
//! Every read and write goes through [`SessionStore`]. The round executor takes the lock
//! for the whole submit-classify-update cycle, so two rounds can never interleave their
//! read-modify-write of the session.

use rockbot_types::{GameId, Session, StartPolicy};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StartError {
    #[error("a game is already running ({game_id})")]
    AlreadyActive { game_id: GameId },
}

#[derive(Debug)]
pub struct SessionStore {
    session: Mutex<Session>,
    start_policy: StartPolicy,
}

impl SessionStore {
    #[must_use]
    pub fn new(start_policy: StartPolicy) -> Self {
        Self {
            session: Mutex::new(Session::idle()),
            start_policy,
        }
    }

    #[must_use]
    pub const fn start_policy(&self) -> StartPolicy {
        self.start_policy
    }

    /// Begin a fresh game according to the start policy.
    pub async fn start(&self) -> Result<Session, StartError> {
        let mut session = self.session.lock().await;
        if self.start_policy == StartPolicy::RejectIfActive
            && session.is_active()
            && let Some(game_id) = session.game_id()
        {
            tracing::info!(%game_id, "Start refused; game already active");
            return Err(StartError::AlreadyActive { game_id });
        }

        let previous = session.game_id();
        let game_id = restart(&mut session);
        tracing::info!(
            %game_id,
            previous = ?previous.map(|id| id.to_string()),
            "Started new game"
        );
        Ok(session.clone())
    }

    /// Read-only copy of the current session.
    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    /// Exclusive access for the duration of one round.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(StartPolicy::default())
    }
}

/// Replace `session` with a fresh game, regardless of policy. Returns the new id.
pub(crate) fn restart(session: &mut Session) -> GameId {
    let game_id = GameId::generate();
    *session = Session::started(game_id);
    game_id
}
