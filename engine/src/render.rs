//! Chat text for every outcome the engine produces.
//!
//! The executor only returns structured values; this is the one place that turns them
//! into messages. A round can produce several messages, sent in order.

use rockbot_types::{Classification, FIRST_GUESS, RoundAttempt, RoundOutcome};

use crate::commands::command_help_summary;
use crate::session::StartError;

#[must_use]
pub fn started(prefix: &str) -> String {
    format!(
        "🟢 New game started!\nFirst guess: **{FIRST_GUESS}**\nUse `{prefix}round` or `{prefix}round yourword` to play."
    )
}

#[must_use]
pub fn start_refused(err: &StartError, prefix: &str) -> String {
    match err {
        StartError::AlreadyActive { .. } => {
            format!("⚠️ A game is already running. Use `{prefix}round` to keep playing.")
        }
    }
}

#[must_use]
pub fn pong() -> String {
    "pong 🏓".to_string()
}

#[must_use]
pub fn unknown_command(name: &str, prefix: &str) -> String {
    format!(
        "❓ Unknown command `{prefix}{name}`. {}",
        command_help_summary(prefix)
    )
}

/// Messages for one `round` request, in send order.
#[must_use]
pub fn round_attempt(attempt: &RoundAttempt, block_limit: u32, prefix: &str) -> Vec<String> {
    match attempt {
        RoundAttempt::Denied { remaining_secs } => {
            vec![format!("⏳ Slow down! Try again in {remaining_secs:.1} s.")]
        }
        RoundAttempt::NoActiveGame => {
            vec![format!("❌ No game running. Use `{prefix}start` first.")]
        }
        RoundAttempt::Played(outcome) => round_outcome(outcome, block_limit, prefix),
    }
}

#[must_use]
pub fn round_outcome(outcome: &RoundOutcome, block_limit: u32, prefix: &str) -> Vec<String> {
    let mut messages = vec![format!(
        "🎯 Guess: **{}**\n📊 Result: {}",
        outcome.guess, outcome.result_text
    )];

    if let Some(details) = &outcome.details {
        messages.push(format!("🔍 Debug: `{details}`"));
    }

    messages.push(match outcome.classification {
        Classification::Lose => format!(
            "💀 The guess LOST. Game over for everyone. Use `{prefix}start` to try again."
        ),
        Classification::WinContinue => match &outcome.next_guess {
            Some(next) => format!(
                "🤖 The AI suggests: **{next}**\nUse `{prefix}round` or `{prefix}round yourword` to continue!"
            ),
            None => format!("✅ Still standing. Use `{prefix}round` to continue!"),
        },
        Classification::Blocked {
            consecutive,
            reset: false,
        } => format!("🚧 Blocked by the game server ({consecutive}/{block_limit})"),
        Classification::Blocked {
            consecutive,
            reset: true,
        } => format!(
            "🔄 Blocked {consecutive} times in a row; started a fresh game.\nNext guess: **{}**",
            outcome.next_guess.as_deref().unwrap_or(FIRST_GUESS)
        ),
        Classification::Error { .. } => {
            "⚠️ Round failed; the game state was not advanced.".to_string()
        }
    });

    messages
}
