//! Line-oriented chat surface on stdin/stdout.
//!
//! Each input line is `<caller>: <message>`, or just `<message>` for the default caller.
//! Every line is handled on its own task, so several callers typing at once contend for
//! the cooldown gate and the session lock exactly as they would in a real chat.

use std::sync::Arc;

use anyhow::{Context, Result};
use rockbot_engine::{CallerId, CommandRouter, GameApi, Notifier, Suggester};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Caller used for lines without a `name:` prefix.
pub const DEFAULT_CALLER: &str = "console";

/// Writes replies to a shared output, tagged with the caller they answer.
///
/// The writer is locked per message, so replies from concurrent rounds never interleave.
#[derive(Debug)]
pub struct ConsoleNotifier<W = Stdout> {
    caller: CallerId,
    out: Arc<Mutex<W>>,
}

impl<W> ConsoleNotifier<W> {
    pub fn new(caller: CallerId, out: Arc<Mutex<W>>) -> Self {
        Self { caller, out }
    }
}

impl<W: AsyncWrite + Unpin + Send> Notifier for ConsoleNotifier<W> {
    async fn send(&self, message: &str) {
        let text: String = message
            .lines()
            .map(|line| format!("[{}] {line}\n", self.caller))
            .collect();
        let mut out = self.out.lock().await;
        let written = match out.write_all(text.as_bytes()).await {
            Ok(()) => out.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            tracing::warn!(caller = %self.caller, error = %e, "Failed to write reply");
        }
    }
}

/// Split `alice: !round lava` into caller and message.
///
/// A line that already starts with the command prefix is never split, so a guess may
/// itself contain a colon.
pub fn split_caller<'a>(line: &'a str, prefix: &str) -> (CallerId, &'a str) {
    let line = line.trim();
    if !line.starts_with(prefix)
        && let Some((who, rest)) = line.split_once(':')
        && is_caller_name(who)
    {
        return (CallerId::new(who), rest.trim());
    }
    (CallerId::new(DEFAULT_CALLER), line)
}

fn is_caller_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

/// Read commands from stdin until EOF or Ctrl-C, then wait for in-flight rounds.
pub async fn run<G, S>(router: CommandRouter<G, S>) -> Result<()>
where
    G: GameApi + 'static,
    S: Suggester + 'static,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();
    let out = Arc::new(Mutex::new(tokio::io::stdout()));

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted; shutting down");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let router = router.clone();
        let out = Arc::clone(&out);
        tasks.spawn(async move {
            let (caller, message) = split_caller(&line, router.prefix());
            let notifier = ConsoleNotifier::new(caller.clone(), out);
            if !router.handle(&caller, message, &notifier).await {
                tracing::trace!(%caller, "Ignoring non-command line");
            }
        });

        // Reap finished tasks so the set does not grow without bound.
        while let Some(done) = tasks.try_join_next() {
            if let Err(e) = done {
                tracing::error!(error = %e, "Command task failed");
            }
        }
    }

    while let Some(done) = tasks.join_next().await {
        if let Err(e) = done {
            tracing::error!(error = %e, "Command task failed");
        }
    }
    Ok(())
}
