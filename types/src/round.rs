//! Outcomes of talking to the game server and of whole rounds.

use std::time::Duration;

/// Status code reported for failures that never produced an HTTP response.
pub const TRANSPORT_FAILURE_STATUS: i32 = -1;

/// Classified result of one submission to the game API.
///
/// This is a sum type so a blocked or failed response can never be read as an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome {
    /// HTTP 200 with a parseable body.
    Answered { result: String },
    /// HTTP 403 or 418: the server refused to play with us.
    Blocked { status: u16 },
    /// Any other status, an empty body, or a body that did not parse.
    ApiError {
        status: u16,
        message: String,
        details: Option<String>,
    },
    /// The request never got an HTTP response.
    Transport { message: String },
}

impl ApiOutcome {
    /// Numeric status in the game server's terms: HTTP code, or `-1` for transport failures.
    #[must_use]
    pub fn status_code(&self) -> i32 {
        match self {
            Self::Answered { .. } => 200,
            Self::Blocked { status } | Self::ApiError { status, .. } => i32::from(*status),
            Self::Transport { .. } => TRANSPORT_FAILURE_STATUS,
        }
    }

    /// Human-readable result line for the chat.
    #[must_use]
    pub fn result_text(&self) -> String {
        match self {
            Self::Answered { result } => result.clone(),
            Self::Blocked { status } => {
                format!("Request blocked by the game server (HTTP {status})")
            }
            Self::ApiError { message, .. } | Self::Transport { message } => message.clone(),
        }
    }

    #[must_use]
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::ApiError { details, .. } => details.as_deref(),
            _ => None,
        }
    }
}

/// How a played round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The guess was accepted and the game goes on.
    WinContinue,
    /// The guess lost; the session is now inactive.
    Lose,
    /// The server blocked the request. `reset` is set when this block hit the limit
    /// and a fresh session was started.
    Blocked { consecutive: u32, reset: bool },
    /// Transport or API failure; nothing was advanced.
    Error { status: i32 },
}

/// Structured result of one executed round, consumed by the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub guess: String,
    pub result_text: String,
    pub classification: Classification,
    /// Guess suggested for the following round, when one was computed.
    pub next_guess: Option<String>,
    /// Extra diagnostics from the game API, if any.
    pub details: Option<String>,
}

/// Everything `play_round` can answer.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundAttempt {
    /// The caller is still cooling down; `remaining_secs` is rounded to one decimal.
    Denied { remaining_secs: f64 },
    /// No game is running; `start` must be called first.
    NoActiveGame,
    /// The round ran to completion.
    Played(RoundOutcome),
}

impl RoundAttempt {
    /// Build a denial from the exact remaining time.
    #[must_use]
    pub fn denied(remaining: Duration) -> Self {
        let remaining_secs = (remaining.as_secs_f64() * 10.0).round() / 10.0;
        Self::Denied { remaining_secs }
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&RoundOutcome> {
        match self {
            Self::Played(outcome) => Some(outcome),
            _ => None,
        }
    }
}
