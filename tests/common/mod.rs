//! Shared test utilities and fixtures
//!
//! Wiremock stand-ins for the game server and the suggestion model, plus builders that
//! wire the real HTTP clients into an executor with jitter switched off.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rockbot_engine::{
    CommandRouter, GameClient, Jitter, Notifier, OpenAiSuggester, RoundExecutor, RoundPolicy,
};
use rockbot_providers::game::VS_PATH;
use rockbot_providers::openai::CHAT_COMPLETIONS_PATH;
use rockbot_providers::retry::RetryConfig;
use rockbot_providers::{GameApiConfig, SuggestConfig};
use rockbot_types::ApiKey;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub type LiveExecutor = RoundExecutor<GameClient, OpenAiSuggester>;

/// A 200 answer from the game server.
pub fn game_answer(result: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": result }))
}

/// The game server's "go away" response.
pub fn game_teapot() -> ResponseTemplate {
    ResponseTemplate::new(418).set_body_string("I'm a teapot")
}

/// Replay `responses` in order; once exhausted, keep answering with the last one.
pub async fn mount_game_sequence(server: &MockServer, responses: Vec<ResponseTemplate>) {
    let calls = AtomicUsize::new(0);
    Mock::given(method("POST"))
        .and(path(VS_PATH))
        .respond_with(move |_: &Request| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            responses
                .get(n)
                .or_else(|| responses.last())
                .cloned()
                .unwrap_or_else(|| ResponseTemplate::new(500))
        })
        .mount(server)
        .await;
}

/// Chat Completions reply whose content is `word`.
pub async fn mount_model_reply(server: &MockServer, word: &str) {
    let body = serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": word },
            "finish_reason": "stop"
        }]
    });

    Mock::given(method("POST"))
        .and(path(CHAT_COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_model_failure(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(CHAT_COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string("model unavailable"))
        .mount(server)
        .await;
}

/// Guesses submitted to the game server, in order, with their game ids.
pub async fn submitted_guesses(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == VS_PATH)
        .map(|request| {
            let body: serde_json::Value = request.body_json().unwrap();
            (
                body["gameId"].as_str().unwrap().to_string(),
                body["guess"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

pub fn live_executor(game: &MockServer, model: &MockServer) -> LiveExecutor {
    live_executor_at(game.uri(), model)
}

/// Executor whose game client points at an arbitrary base URL.
pub fn live_executor_at(game_url: String, model: &MockServer) -> LiveExecutor {
    let game_client = GameClient::new(&GameApiConfig {
        base_url: game_url,
        timeout: Duration::from_secs(5),
        ..GameApiConfig::default()
    })
    .unwrap();

    let suggester = OpenAiSuggester::new(
        ApiKey::new("sk-test").unwrap(),
        SuggestConfig {
            base_url: model.uri(),
            timeout: Duration::from_secs(5),
            retry: RetryConfig::none(),
            ..SuggestConfig::default()
        },
    )
    .unwrap();

    RoundExecutor::new(game_client, suggester).with_round_policy(RoundPolicy {
        jitter: Jitter::none(),
        ..RoundPolicy::default()
    })
}

pub fn live_router(game: &MockServer, model: &MockServer) -> CommandRouter<GameClient, OpenAiSuggester> {
    CommandRouter::new(Arc::new(live_executor(game, model)), "!")
}

/// Notifier that keeps every message for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap())
    }

    pub fn joined(&self) -> String {
        self.messages().join("\n")
    }
}

impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
