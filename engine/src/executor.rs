//! The round state machine.
//!
//! A round moves through: active check, cooldown gate, global wait, jitter, session lock,
//! guess resolution, submission, classification, session update. Only the gate wait and
//! the jitter suspend before the lock is taken; from resolution to update the session lock
//! is held, so rounds are fully serialized against each other and against `start`.
//!
//! Classification of the game server's answer:
//!
//! | Response | Session effect | Outcome |
//! |----------|----------------|---------|
//! | blocked (403/418) | `consecutive_blocks += 1`, fresh game once the limit is hit | `Blocked` |
//! | transport failure or other API error | `consecutive_blocks = 0` | `Error` |
//! | answer containing "lose" | `active = false`, `consecutive_blocks = 0` | `Lose` |
//! | any other answer | guess/result advanced, `consecutive_blocks = 0` | `WinContinue` |

use std::time::{Duration, Instant};

use rockbot_types::{
    ApiOutcome, CallerId, Classification, FIRST_GUESS, RoundAttempt, RoundOutcome, Session,
    SessionUpdate, StartPolicy, SuggestionTiming, normalize_guess,
};

use crate::backends::{GameApi, Suggester};
use crate::cooldown::{Admission, CooldownGate, CooldownPolicy, Jitter};
use crate::resolver::GuessResolver;
use crate::session::{SessionStore, StartError, restart};

/// Blocked responses in a row that trigger an automatic fresh game.
pub const DEFAULT_BLOCK_LIMIT: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundPolicy {
    pub timing: SuggestionTiming,
    pub block_limit: u32,
    pub jitter: Jitter,
}

impl Default for RoundPolicy {
    fn default() -> Self {
        Self {
            timing: SuggestionTiming::default(),
            block_limit: DEFAULT_BLOCK_LIMIT,
            jitter: Jitter::default(),
        }
    }
}

/// Whether a game server answer means the guess lost.
#[must_use]
pub fn is_loss(result: &str) -> bool {
    result.to_lowercase().contains("lose")
}

pub struct RoundExecutor<G, S> {
    session: SessionStore,
    gate: CooldownGate,
    resolver: GuessResolver<S>,
    game: G,
    policy: RoundPolicy,
}

impl<G: GameApi, S: Suggester> RoundExecutor<G, S> {
    pub fn new(game: G, suggester: S) -> Self {
        Self {
            session: SessionStore::default(),
            gate: CooldownGate::default(),
            resolver: GuessResolver::new(suggester),
            game,
            policy: RoundPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_start_policy(mut self, start_policy: StartPolicy) -> Self {
        self.session = SessionStore::new(start_policy);
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, policy: CooldownPolicy) -> Self {
        self.gate = CooldownGate::new(policy);
        self
    }

    #[must_use]
    pub fn with_round_policy(mut self, policy: RoundPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    pub const fn gate(&self) -> &CooldownGate {
        &self.gate
    }

    pub const fn policy(&self) -> &RoundPolicy {
        &self.policy
    }

    pub async fn start_session(&self) -> Result<Session, StartError> {
        self.session.start().await
    }

    pub async fn snapshot(&self) -> Session {
        self.session.snapshot().await
    }

    /// Run one round for `caller`, arriving at `now`.
    ///
    /// Never fails: gate denials, missing games, and every external failure are folded
    /// into the returned [`RoundAttempt`].
    pub async fn play_round(
        &self,
        caller: &CallerId,
        now: Instant,
        explicit_guess: Option<&str>,
    ) -> RoundAttempt {
        if !self.session.snapshot().await.is_active() {
            tracing::debug!(%caller, "Round requested without an active game");
            return RoundAttempt::NoActiveGame;
        }

        match self.gate.admit(caller, now) {
            Admission::Denied { remaining } => {
                tracing::debug!(%caller, remaining_ms = millis(remaining), "Round denied by cooldown");
                return RoundAttempt::denied(remaining);
            }
            Admission::Granted { wait } if !wait.is_zero() => {
                tracing::debug!(%caller, delay_ms = millis(wait), "Waiting for global cooldown");
                tokio::time::sleep(wait).await;
            }
            Admission::Granted { .. } => {}
        }

        let jitter = self.policy.jitter.sample();
        if !jitter.is_zero() {
            tracing::debug!(%caller, delay_ms = millis(jitter), "Jitter before game request");
            tokio::time::sleep(jitter).await;
        }

        let mut session = self.session.lock().await;
        // A loss may have landed while this round was waiting.
        let Some(game_id) = session.game_id().filter(|_| session.is_active()) else {
            return RoundAttempt::NoActiveGame;
        };

        let guess = match self.policy.timing {
            SuggestionTiming::AfterSubmit => explicit_guess
                .and_then(normalize_guess)
                .unwrap_or_else(|| session.last_guess().to_string()),
            SuggestionTiming::BeforeSubmit => self.resolver.resolve(explicit_guess, &session).await,
        };

        tracing::info!(%caller, %game_id, %guess, "Submitting guess");
        let response = self.game.submit(game_id, &guess).await;
        let status = response.status_code();
        let result_text = response.result_text();
        let details = response.details().map(str::to_string);

        let (classification, next_guess) = match response {
            ApiOutcome::Blocked { .. } => {
                let consecutive = session.consecutive_blocks().saturating_add(1);
                if consecutive >= self.policy.block_limit.max(1) {
                    let fresh = restart(&mut session);
                    tracing::warn!(
                        previous = %game_id,
                        game_id = %fresh,
                        consecutive_blocks = consecutive,
                        "Block limit reached; started a fresh game"
                    );
                    (
                        Classification::Blocked {
                            consecutive,
                            reset: true,
                        },
                        Some(FIRST_GUESS.to_string()),
                    )
                } else {
                    tracing::warn!(%game_id, status, consecutive_blocks = consecutive, "Guess blocked");
                    session.apply(SessionUpdate {
                        consecutive_blocks: Some(consecutive),
                        ..SessionUpdate::default()
                    });
                    (
                        Classification::Blocked {
                            consecutive,
                            reset: false,
                        },
                        None,
                    )
                }
            }
            ApiOutcome::Transport { .. } | ApiOutcome::ApiError { .. } => {
                if status < 0 {
                    tracing::warn!(%game_id, "Round failed before reaching the game server");
                } else {
                    tracing::warn!(%game_id, status, "Round failed with an API error");
                }
                session.apply(SessionUpdate {
                    consecutive_blocks: Some(0),
                    ..SessionUpdate::default()
                });
                (Classification::Error { status }, None)
            }
            ApiOutcome::Answered { result } if is_loss(&result) => {
                tracing::info!(%game_id, %guess, %result, "Guess lost; game over");
                session.apply(SessionUpdate {
                    active: Some(false),
                    consecutive_blocks: Some(0),
                    ..SessionUpdate::default()
                });
                (Classification::Lose, None)
            }
            ApiOutcome::Answered { result } => {
                let (last_guess, next_guess) = match self.policy.timing {
                    SuggestionTiming::AfterSubmit => {
                        let next = self.resolver.suggest(Some(&result), &guess).await;
                        (next.clone(), Some(next))
                    }
                    SuggestionTiming::BeforeSubmit => (guess.clone(), None),
                };
                tracing::info!(%game_id, %guess, %result, next = ?next_guess, "Guess accepted");
                session.apply(SessionUpdate {
                    last_guess: Some(last_guess),
                    last_result: Some(result),
                    consecutive_blocks: Some(0),
                    ..SessionUpdate::default()
                });
                (Classification::WinContinue, next_guess)
            }
        };

        RoundAttempt::Played(RoundOutcome {
            guess,
            result_text,
            classification,
            next_guess,
            details,
        })
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
