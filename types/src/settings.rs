//! Policy knobs shared across crates.
//!
//! Two behaviours have more than one reasonable answer: what `start` does while a game
//! is running, and when the model is asked for the next guess. Both are explicit
//! policies here instead of being hard-wired into the executor.

use serde::Deserialize;

/// What `start` does when a game is already active.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// Always begin a fresh game, discarding the running one.
    #[default]
    Reset,
    /// Refuse while a game is active.
    RejectIfActive,
}

/// When the model is consulted for the next guess.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionTiming {
    /// After a winning submission, suggest the next guess from the fresh result.
    /// Rounds without an explicit guess submit the stored suggestion.
    #[default]
    AfterSubmit,
    /// Ask the model right before submitting; the submitted guess is carried forward.
    BeforeSubmit,
}
