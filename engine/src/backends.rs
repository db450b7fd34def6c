//! Seams between the round executor and the outside world.
//!
//! The executor is generic over these traits so it can be driven by the real HTTP clients
//! in production and by scripted doubles in tests.

use std::future::Future;

use rockbot_providers::{GameClient, OpenAiSuggester, SuggestError};
use rockbot_types::{ApiOutcome, GameId};

/// Submits guesses to the game server.
pub trait GameApi: Send + Sync {
    fn submit(&self, game_id: GameId, guess: &str) -> impl Future<Output = ApiOutcome> + Send;
}

/// Proposes the next guess from the previous guess and its result.
pub trait Suggester: Send + Sync {
    fn suggest(
        &self,
        last_result: Option<&str>,
        last_guess: &str,
    ) -> impl Future<Output = Result<String, SuggestError>> + Send;
}

/// Delivers rendered text to the chat surface.
pub trait Notifier: Send + Sync {
    fn send(&self, message: &str) -> impl Future<Output = ()> + Send;
}

impl GameApi for GameClient {
    fn submit(&self, game_id: GameId, guess: &str) -> impl Future<Output = ApiOutcome> + Send {
        GameClient::submit(self, game_id, guess)
    }
}

impl Suggester for OpenAiSuggester {
    fn suggest(
        &self,
        last_result: Option<&str>,
        last_guess: &str,
    ) -> impl Future<Output = Result<String, SuggestError>> + Send {
        OpenAiSuggester::suggest(self, last_result, last_guess)
    }
}
