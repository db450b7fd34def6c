//! What Beats Rock game API client.
//!
//! One guess is one `POST {base_url}/api/vs` with body `{"gameId": ..., "guess": ...}`.
//! Every response, including transport failures, is folded into an [`ApiOutcome`];
//! nothing here returns an error or panics on a strange body.

use std::time::Duration;

use reqwest::StatusCode;
use rockbot_types::{ApiOutcome, GameId};
use serde::{Deserialize, Serialize};

use crate::{GAME_API_BASE_URL, client_builder, default_user_agent, read_capped_body, truncate_for_display};

/// Path of the versus endpoint relative to the base URL.
pub const VS_PATH: &str = "/api/vs";

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const MAX_DETAIL_CHARS: usize = 300;

#[derive(Debug, Clone)]
pub struct GameApiConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for GameApiConfig {
    fn default() -> Self {
        Self {
            base_url: GAME_API_BASE_URL.to_string(),
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VsRequest<'a> {
    game_id: String,
    guess: &'a str,
}

#[derive(Deserialize)]
struct VsResponse {
    result: String,
}

#[derive(Debug, Clone)]
pub struct GameClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GameClient {
    pub fn new(config: &GameApiConfig) -> Result<Self, reqwest::Error> {
        let http = client_builder(&config.user_agent, config.timeout).build()?;
        let endpoint = format!("{}{VS_PATH}", config.base_url.trim_end_matches('/'));
        Ok(Self { http, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit `guess` for `game_id` and classify what came back.
    pub async fn submit(&self, game_id: GameId, guess: &str) -> ApiOutcome {
        let payload = VsRequest {
            game_id: game_id.to_string(),
            guess,
        };

        let response = match self.http.post(&self.endpoint).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%game_id, error = %e, "Game API request failed");
                return ApiOutcome::Transport {
                    message: format!("Error submitting guess: {e}"),
                };
            }
        };

        let status = response.status();
        if matches!(status, StatusCode::FORBIDDEN | StatusCode::IM_A_TEAPOT) {
            tracing::warn!(%game_id, status = status.as_u16(), "Game API blocked the request");
            return ApiOutcome::Blocked {
                status: status.as_u16(),
            };
        }

        let body = read_capped_body(response).await;
        classify_body(status, &body, game_id, guess)
    }
}

fn classify_body(status: StatusCode, body: &str, game_id: GameId, guess: &str) -> ApiOutcome {
    if status != StatusCode::OK {
        tracing::warn!(%game_id, status = status.as_u16(), "Game API returned an error status");
        let details = (!body.trim().is_empty()).then(|| truncate_for_display(body, MAX_DETAIL_CHARS));
        return ApiOutcome::ApiError {
            status: status.as_u16(),
            message: format!("API returned status {}", status.as_u16()),
            details,
        };
    }

    if body.trim().is_empty() {
        tracing::warn!(%game_id, "Game API returned an empty body");
        return ApiOutcome::ApiError {
            status: status.as_u16(),
            message: "Empty response from server. Game ID may be expired or guess was rejected."
                .to_string(),
            details: Some(format!("Game ID: {game_id}, Guess: {guess}")),
        };
    }

    match serde_json::from_str::<VsResponse>(body) {
        Ok(parsed) => ApiOutcome::Answered {
            result: parsed.result,
        },
        Err(e) => {
            tracing::warn!(%game_id, error = %e, "Game API body did not parse");
            ApiOutcome::ApiError {
                status: status.as_u16(),
                message: "Malformed response from server".to_string(),
                details: Some(format!(
                    "{e}: {}",
                    truncate_for_display(body, MAX_DETAIL_CHARS)
                )),
            }
        }
    }
}
