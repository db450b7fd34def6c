//! Core engine for rockbot - the shared game session and round orchestration.
//!
//! # Architecture
//!
//! - [`session`] - the single game session behind one async lock.
//! - [`cooldown`] - per-caller and global admission control, plus request jitter.
//! - [`resolver`] - picks the guess: the caller's word or a model suggestion.
//! - [`executor`] - the round state machine tying the pieces together.
//! - [`commands`] / [`render`] - chat command parsing, dispatch and reply text.
//! - [`config`] - TOML configuration loaded from `~/.rockbot/config.toml`.
//!
//! External services are reached only through the [`backends`] traits.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

pub mod backends;
pub mod commands;
pub mod config;
pub mod cooldown;
pub mod executor;
pub mod render;
pub mod resolver;
pub mod session;

pub use backends::{GameApi, Notifier, Suggester};
pub use commands::{Command, CommandParseError, CommandRouter};
pub use config::{ConfigError, RockbotConfig};
pub use cooldown::{Admission, CooldownGate, CooldownPolicy, Jitter};
pub use executor::{RoundExecutor, RoundPolicy};
pub use resolver::GuessResolver;
pub use session::{SessionStore, StartError};

pub use rockbot_providers::{self, GameClient, OpenAiSuggester};
pub use rockbot_types::{
    ApiKey, ApiOutcome, CallerId, Classification, GameId, RoundAttempt, RoundOutcome, Session,
    SessionState, StartPolicy, SuggestionTiming,
};
