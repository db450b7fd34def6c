//! rockbot CLI - binary entry point.
//!
//! # Architecture
//!
//! ```text
//! main() -> init_tracing() -> RockbotConfig::load() -> clients + RoundExecutor
//!                                                          |
//!                                                          v
//!                                   console::run(CommandRouter) -> task per line
//! ```
//!
//! The only fatal startup condition is a missing OpenAI key. Everything after startup
//! is reported to the chat instead of ending the process.

mod console;

use anyhow::{Context, Result, bail};
use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use rockbot_engine::config::{OPENAI_KEY_ENV, config_path};
use rockbot_engine::{CommandRouter, GameClient, OpenAiSuggester, RockbotConfig, RoundExecutor};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // stdout carries the chat, so logs fall back to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.rockbot/logs/rockbot.log
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".rockbot").join("logs").join("rockbot.log"));
    }

    // Fallback: ./.rockbot/logs/rockbot.log
    candidates.push(PathBuf::from(".rockbot").join("logs").join("rockbot.log"));

    candidates
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = RockbotConfig::load()
        .context("loading configuration")?
        .unwrap_or_default();

    let Some(api_key) = config.openai_key() else {
        let path = config_path().map_or_else(
            || "~/.rockbot/config.toml".to_string(),
            |p| p.display().to_string(),
        );
        tracing::error!("No OpenAI API key configured");
        bail!("missing OpenAI API key: set {OPENAI_KEY_ENV} or [api_keys].openai in {path}");
    };

    let game = GameClient::new(&config.game_api()).context("building game API client")?;
    let suggester =
        OpenAiSuggester::new(api_key, config.suggest()).context("building suggestion client")?;
    tracing::info!(
        endpoint = game.endpoint(),
        model = suggester.model(),
        "Clients ready"
    );

    let executor = RoundExecutor::new(game, suggester)
        .with_start_policy(config.start_policy())
        .with_cooldown(config.cooldown())
        .with_round_policy(config.round_policy());
    let prefix = config.command_prefix();

    tracing::info!(
        %prefix,
        start_policy = ?executor.session().start_policy(),
        timing = ?executor.policy().timing,
        "rockbot ready"
    );
    println!(
        "rockbot ready. Type `{prefix}start`, `{prefix}round [guess]` or `{prefix}ping`; \
         prefix a line with `name:` to speak as someone else. Ctrl-D quits."
    );

    let router = CommandRouter::new(Arc::new(executor), prefix);
    console::run(router).await
}
