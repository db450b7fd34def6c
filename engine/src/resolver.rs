//! Chooses the word to submit for a round.

use rockbot_types::{FALLBACK_GUESS, Session, normalize_guess};

use crate::backends::Suggester;

#[derive(Debug)]
pub struct GuessResolver<S> {
    suggester: S,
}

impl<S: Suggester> GuessResolver<S> {
    pub const fn new(suggester: S) -> Self {
        Self { suggester }
    }

    pub const fn suggester(&self) -> &S {
        &self.suggester
    }

    /// An explicit guess wins when it is non-blank; otherwise the model is consulted
    /// with the session's last result and guess.
    pub async fn resolve(&self, explicit: Option<&str>, session: &Session) -> String {
        if let Some(guess) = explicit.and_then(normalize_guess) {
            return guess;
        }
        self.suggest(session.last_result(), session.last_guess())
            .await
    }

    /// Model suggestion, or [`FALLBACK_GUESS`] when the model cannot produce one.
    pub async fn suggest(&self, last_result: Option<&str>, last_guess: &str) -> String {
        match self.suggester.suggest(last_result, last_guess).await {
            Ok(word) => word,
            Err(e) => {
                tracing::warn!(error = %e, fallback = FALLBACK_GUESS, "Suggestion failed; using fallback");
                FALLBACK_GUESS.to_string()
            }
        }
    }
}
