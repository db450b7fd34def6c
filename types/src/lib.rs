//! Core domain types for rockbot.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod ids;
mod round;
mod session;
mod settings;

pub use ids::{CallerId, GameId};
pub use round::{ApiOutcome, Classification, RoundAttempt, RoundOutcome};
pub use session::{FIRST_GUESS, Session, SessionState, SessionUpdate};
pub use settings::{StartPolicy, SuggestionTiming};

/// Word submitted whenever the model cannot produce a usable suggestion.
pub const FALLBACK_GUESS: &str = "rock";

// ============================================================================
// Credentials
// ============================================================================

/// API key for the model suggestion service.
///
/// Note: `Debug` is manually implemented to redact the key value, preventing accidental
/// credential disclosure in logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a raw key. Returns `None` for blank input so a missing credential
    /// can never be mistaken for a present one.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

/// Normalize a caller-supplied guess: trimmed and lower-cased, `None` when blank.
#[must_use]
pub fn normalize_guess(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}
