//! HTTP clients for rockbot's two external collaborators.
//!
//! # Architecture
//!
//! - [`game`] - What Beats Rock game API (`POST /api/vs`). A single request per guess,
//!   classified into an [`ApiOutcome`](rockbot_types::ApiOutcome). Never returns an error.
//! - [`openai`] - OpenAI Chat Completions client that proposes the next guess. Returns
//!   `Result<String, SuggestError>`; the fallback word is the caller's decision.
//! - [`retry`] - Backoff policy used by the suggestion client.
//!
//! Both clients own a `reqwest::Client` built from [`client_builder`], so timeouts and the
//! user agent are fixed at construction time.

pub mod game;
pub mod openai;
pub mod retry;

use std::time::Duration;

pub use game::{GameApiConfig, GameClient};
pub use openai::{OpenAiSuggester, SuggestConfig, SuggestError};
pub use rockbot_types;

/// Default What Beats Rock origin.
pub const GAME_API_BASE_URL: &str = "https://www.whatbeatsrock.com";
/// Default OpenAI API origin.
pub const OPENAI_API_BASE_URL: &str = "https://api.openai.com";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;
const TCP_KEEPALIVE_SECS: u64 = 60;

const MAX_BODY_BYTES: usize = 32 * 1024;

/// Identifier sent as `User-Agent` unless configured otherwise.
#[must_use]
pub fn default_user_agent() -> String {
    format!(
        "rockbot/{} (What Beats Rock chat relay)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Shared client settings: bounded connect and request time, no redirects.
pub(crate) fn client_builder(user_agent: &str, timeout: Duration) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}

/// Read a response body as text, capped at 32 KiB.
///
/// A body that fails mid-stream yields whatever arrived before the failure.
pub async fn read_capped_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::debug!(error = %e, bytes = body.len(), "Response body ended early");
                break;
            }
        };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_BODY_BYTES {
            body.truncate(MAX_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// Shorten text for logs and chat diagnostics.
pub(crate) fn truncate_for_display(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
