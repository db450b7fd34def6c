//! OpenAI Chat Completions client that proposes the next guess.
//!
//! The model is asked for a short, single-word, creative answer. Its reply is reduced to
//! one lower-cased word; anything that does not yield a word is a [`SuggestError`].
//! Substituting the fallback guess is deliberately left to the caller.

use std::time::Duration;

use rockbot_types::ApiKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::{RetryConfig, RetryOutcome, send_with_retry};
use crate::{OPENAI_API_BASE_URL, client_builder, default_user_agent, read_capped_body, truncate_for_display};

/// Path of the Chat Completions endpoint relative to the base URL.
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_TEMPERATURE: f32 = 1.1;
const DEFAULT_MAX_TOKENS: u32 = 16;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct SuggestConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            base_url: OPENAI_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("request failed after {attempts} attempt(s): {source}")]
    Connection {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("API error {status}: {body}")]
    Http { status: u16, body: String },
    #[error("could not decode completion: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("completion did not contain a usable word")]
    EmptyReply,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Build the user prompt for one suggestion.
#[must_use]
pub fn build_prompt(last_result: Option<&str>, last_guess: &str) -> String {
    let result = last_result.unwrap_or("none yet");
    format!(
        "We're playing a word game called 'What Beats Rock'.\n\
         Last guess: \"{last_guess}\". Result: \"{result}\".\n\
         Suggest a new, clever one-word guess that beats it. Just return the word. No explanation."
    )
}

/// Reduce a completion to a single guess word.
///
/// Takes the first whitespace-separated token, strips surrounding quotes and punctuation,
/// and lower-cases it.
#[must_use]
pub fn extract_word(content: &str) -> Option<String> {
    let token = content.split_whitespace().next()?;
    let word = token.trim_matches(|c: char| !c.is_alphanumeric());
    if word.is_empty() {
        None
    } else {
        Some(word.to_lowercase())
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiSuggester {
    http: reqwest::Client,
    endpoint: String,
    api_key: ApiKey,
    config: SuggestConfig,
}

impl OpenAiSuggester {
    pub fn new(api_key: ApiKey, config: SuggestConfig) -> Result<Self, reqwest::Error> {
        let http = client_builder(&default_user_agent(), config.timeout).build()?;
        let endpoint = format!(
            "{}{CHAT_COMPLETIONS_PATH}",
            config.base_url.trim_end_matches('/')
        );
        Ok(Self {
            http,
            endpoint,
            api_key,
            config,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Ask the model for the guess to play after `last_guess` produced `last_result`.
    pub async fn suggest(
        &self,
        last_result: Option<&str>,
        last_guess: &str,
    ) -> Result<String, SuggestError> {
        let prompt = build_prompt(last_result, last_guess);
        let body = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let outcome = send_with_retry(
            || {
                self.http
                    .post(&self.endpoint)
                    .bearer_auth(self.api_key.expose_secret())
                    .json(&body)
            },
            &self.config.retry,
        )
        .await;

        let response = match outcome {
            RetryOutcome::Success(response) => response,
            RetryOutcome::HttpError(response) => {
                let status = response.status().as_u16();
                let text = read_capped_body(response).await;
                return Err(SuggestError::Http {
                    status,
                    body: truncate_for_display(&text, MAX_ERROR_CHARS),
                });
            }
            RetryOutcome::ConnectionError { attempts, source } => {
                return Err(SuggestError::Connection { attempts, source });
            }
        };

        let text = read_capped_body(response).await;
        let parsed: ChatResponse = serde_json::from_str(&text)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        let word = extract_word(&content).ok_or(SuggestError::EmptyReply)?;
        tracing::debug!(model = %self.config.model, suggestion = %word, "Model suggested a guess");
        Ok(word)
    }
}
