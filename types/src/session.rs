//! The shared game session record.

use crate::GameId;

/// Guess every fresh session opens with.
pub const FIRST_GUESS: &str = "rock";

/// Where the shared game currently sits in its lifecycle.
///
/// Derived from the session fields rather than stored, so it cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No game has been started yet.
    Idle,
    /// Active and the last response was not a block.
    Running,
    /// Active, with at least one consecutive blocked response.
    Blocked,
    /// A guess lost; `start` is required to play again.
    Terminated,
}

/// The single game instance tracked by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    active: bool,
    game_id: Option<GameId>,
    last_guess: String,
    last_result: Option<String>,
    consecutive_blocks: u32,
}

impl Session {
    /// Session before any `start`: inactive and without a game id.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            active: false,
            game_id: None,
            last_guess: FIRST_GUESS.to_string(),
            last_result: None,
            consecutive_blocks: 0,
        }
    }

    /// A freshly started game with a new id.
    #[must_use]
    pub fn fresh() -> Self {
        Self::started(GameId::generate())
    }

    /// A freshly started game under `game_id`.
    #[must_use]
    pub fn started(game_id: GameId) -> Self {
        Self {
            active: true,
            game_id: Some(game_id),
            last_guess: FIRST_GUESS.to_string(),
            last_result: None,
            consecutive_blocks: 0,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn game_id(&self) -> Option<GameId> {
        self.game_id
    }

    #[must_use]
    pub fn last_guess(&self) -> &str {
        &self.last_guess
    }

    #[must_use]
    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    #[must_use]
    pub const fn consecutive_blocks(&self) -> u32 {
        self.consecutive_blocks
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        match (self.game_id, self.active) {
            (None, _) => SessionState::Idle,
            (Some(_), false) => SessionState::Terminated,
            (Some(_), true) if self.consecutive_blocks > 0 => SessionState::Blocked,
            (Some(_), true) => SessionState::Running,
        }
    }

    /// Apply a partial update. Fields left as `None` keep their value.
    pub fn apply(&mut self, update: SessionUpdate) {
        if let Some(active) = update.active {
            self.active = active;
        }
        if let Some(guess) = update.last_guess {
            self.last_guess = guess;
        }
        if let Some(result) = update.last_result {
            self.last_result = Some(result);
        }
        if let Some(blocks) = update.consecutive_blocks {
            self.consecutive_blocks = blocks;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::idle()
    }
}

/// Partial mutation of a [`Session`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    pub active: Option<bool>,
    pub last_guess: Option<String>,
    pub last_result: Option<String>,
    pub consecutive_blocks: Option<u32>,
}
