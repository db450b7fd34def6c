//! Chat command parsing and dispatch.
//!
//! Handles prefixed commands like `!start`, `!round [guess]`, and `!ping`.

use std::sync::Arc;
use std::time::Instant;

use rockbot_types::CallerId;
use thiserror::Error;

use crate::backends::{GameApi, Notifier, Suggester};
use crate::executor::RoundExecutor;
use crate::render;

#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub usage: &'static str,
    pub description: &'static str,
}

const COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        usage: "start",
        description: "Start a fresh shared game",
    },
    CommandSpec {
        usage: "round [guess]",
        description: "Play a round with your guess or the AI's suggestion",
    },
    CommandSpec {
        usage: "ping",
        description: "Check that the bot is alive",
    },
];

#[must_use]
pub fn command_specs() -> &'static [CommandSpec] {
    COMMAND_SPECS
}

#[must_use]
pub fn command_help_summary(prefix: &str) -> String {
    let labels: Vec<String> = COMMAND_SPECS
        .iter()
        .map(|spec| format!("{prefix}{}", spec.usage))
        .collect();
    format!("Commands: {}", labels.join(", "))
}

/// Parsed command with typed arguments.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Start,
    /// Free text after `round`, trimmed. `None` when nothing followed.
    Round(Option<&'a str>),
    Ping,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandParseError {
    /// The line is ordinary chat, not addressed to the bot.
    #[error("line does not start with the command prefix")]
    MissingPrefix,
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
}

impl<'a> Command<'a> {
    /// Parse a chat line into a typed Command.
    pub fn parse(prefix: &str, line: &'a str) -> Result<Self, CommandParseError> {
        let body = line
            .trim_start()
            .strip_prefix(prefix)
            .ok_or(CommandParseError::MissingPrefix)?;
        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body.trim_end(), ""),
        };

        match name {
            "" => Err(CommandParseError::Empty),
            "start" => Ok(Command::Start),
            "round" => Ok(Command::Round((!rest.is_empty()).then_some(rest))),
            "ping" => Ok(Command::Ping),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

/// Routes parsed commands to the executor and renders the replies.
pub struct CommandRouter<G, S> {
    executor: Arc<RoundExecutor<G, S>>,
    prefix: String,
}

impl<G, S> Clone for CommandRouter<G, S> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            prefix: self.prefix.clone(),
        }
    }
}

impl<G: GameApi, S: Suggester> CommandRouter<G, S> {
    pub fn new(executor: Arc<RoundExecutor<G, S>>, prefix: impl Into<String>) -> Self {
        Self {
            executor,
            prefix: prefix.into(),
        }
    }

    pub fn executor(&self) -> &RoundExecutor<G, S> {
        &self.executor
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Handle one chat line from `caller`. Returns `false` when the line was not a command.
    pub async fn handle<N: Notifier>(&self, caller: &CallerId, line: &str, notifier: &N) -> bool {
        let command = match Command::parse(&self.prefix, line) {
            Ok(command) => command,
            Err(CommandParseError::MissingPrefix) => return false,
            Err(CommandParseError::Empty) => {
                notifier.send(&command_help_summary(&self.prefix)).await;
                return true;
            }
            Err(CommandParseError::Unknown(name)) => {
                tracing::debug!(%caller, command = %name, "Unknown command");
                notifier
                    .send(&render::unknown_command(&name, &self.prefix))
                    .await;
                return true;
            }
        };

        tracing::info!(%caller, ?command, "Handling command");
        match command {
            Command::Start => {
                let reply = match self.executor.start_session().await {
                    Ok(_) => render::started(&self.prefix),
                    Err(err) => render::start_refused(&err, &self.prefix),
                };
                notifier.send(&reply).await;
            }
            Command::Round(guess) => {
                let attempt = self
                    .executor
                    .play_round(caller, Instant::now(), guess)
                    .await;
                let block_limit = self.executor.policy().block_limit;
                for message in render::round_attempt(&attempt, block_limit, &self.prefix) {
                    notifier.send(&message).await;
                }
            }
            Command::Ping => notifier.send(&render::pong()).await,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_commands() {
        assert_eq!(Command::parse("!", "!start"), Ok(Command::Start));
        assert_eq!(Command::parse("!", "!ping"), Ok(Command::Ping));
        assert_eq!(Command::parse("!", "!round"), Ok(Command::Round(None)));
        assert_eq!(Command::parse("!", "  !round   "), Ok(Command::Round(None)));
    }

    #[test]
    fn round_keeps_free_text_guess() {
        assert_eq!(
            Command::parse("!", "!round  Big Rock "),
            Ok(Command::Round(Some("Big Rock")))
        );
        assert_eq!(
            Command::parse("!", "!round\tlava"),
            Ok(Command::Round(Some("lava")))
        );
    }

    #[test]
    fn non_commands_are_ignored() {
        assert_eq!(
            Command::parse("!", "hello there"),
            Err(CommandParseError::MissingPrefix)
        );
        assert_eq!(
            Command::parse("?", "!start"),
            Err(CommandParseError::MissingPrefix)
        );
    }

    #[test]
    fn unknown_and_empty_commands() {
        assert_eq!(
            Command::parse("!", "!dance now"),
            Err(CommandParseError::Unknown("dance".into()))
        );
        assert_eq!(Command::parse("!", "!"), Err(CommandParseError::Empty));
        // Command names are case-sensitive.
        assert_eq!(
            Command::parse("!", "!START"),
            Err(CommandParseError::Unknown("START".into()))
        );
    }

    #[test]
    fn multi_char_prefix() {
        assert_eq!(Command::parse("rb ", "rb ping"), Ok(Command::Ping));
    }

    #[test]
    fn help_summary_lists_every_command() {
        let summary = command_help_summary("!");
        assert_eq!(summary, "Commands: !start, !round [guess], !ping");
        assert_eq!(command_specs().len(), 3);
    }
}
