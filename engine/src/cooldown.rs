//! Admission control for rounds.
//!
//! Two limits apply to every round request:
//!
//! - **Per caller**: one admitted round per caller every `per_caller` (default 5s).
//!   Violations are denied outright with the remaining wait.
//! - **Global**: admitted rounds are spaced at least `global` (default 0.5s) apart.
//!   A caller that clears the per-caller check but arrives too soon after another
//!   round is admitted with a wait instead of being denied.
//!
//! Decisions depend only on the `now` passed in, so the gate is testable without sleeping.
//! Admission reserves the slot at `now + wait`: two callers racing for the same global
//! slot are spaced out instead of both firing when the wait ends.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use rockbot_types::CallerId;

const DEFAULT_PER_CALLER: Duration = Duration::from_secs(5);
const DEFAULT_GLOBAL: Duration = Duration::from_millis(500);
const DEFAULT_JITTER_MIN: Duration = Duration::from_millis(500);
const DEFAULT_JITTER_MAX: Duration = Duration::from_millis(1250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    pub per_caller: Duration,
    pub global: Duration,
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self {
            per_caller: DEFAULT_PER_CALLER,
            global: DEFAULT_GLOBAL,
        }
    }
}

/// Decision for one round request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Proceed after sleeping `wait` (zero when the global slot is free).
    Granted { wait: Duration },
    /// The caller is still cooling down. Nothing was recorded.
    Denied { remaining: Duration },
}

#[derive(Debug, Default)]
struct GateState {
    last_round: HashMap<CallerId, Instant>,
    global_last: Option<Instant>,
}

#[derive(Debug)]
pub struct CooldownGate {
    policy: CooldownPolicy,
    state: Mutex<GateState>,
}

impl CooldownGate {
    #[must_use]
    pub fn new(policy: CooldownPolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(GateState::default()),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> CooldownPolicy {
        self.policy
    }

    /// Check and record a round request from `caller` at `now`.
    ///
    /// Check and update happen under one lock, so concurrent callers cannot both pass
    /// on the same stale timestamp.
    pub fn admit(&self, caller: &CallerId, now: Instant) -> Admission {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(last) = state.last_round.get(caller) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < self.policy.per_caller {
                return Admission::Denied {
                    remaining: self.policy.per_caller - elapsed,
                };
            }
        }

        let wait = state
            .global_last
            .map_or(Duration::ZERO, |last| global_wait(last, now, self.policy.global));
        // A slot too far out to be represented is never reached.
        let Some(admitted_at) = now.checked_add(wait) else {
            return Admission::Denied { remaining: wait };
        };

        state.global_last = Some(admitted_at);
        state.last_round.insert(caller.clone(), admitted_at);

        Admission::Granted { wait }
    }

    /// Number of callers with a recorded round.
    #[must_use]
    pub fn tracked_callers(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_round
            .len()
    }
}

/// Time from `now` until `interval` has passed since `last`, which may lie in the future.
fn global_wait(last: Instant, now: Instant, interval: Duration) -> Duration {
    match last.checked_duration_since(now) {
        Some(ahead) => ahead.saturating_add(interval),
        None => interval.saturating_sub(now.duration_since(last)),
    }
}

impl Default for CooldownGate {
    fn default() -> Self {
        Self::new(CooldownPolicy::default())
    }
}

/// Random pause inserted before each game API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jitter {
    min: Duration,
    max: Duration,
}

impl Jitter {
    /// Uniform jitter in `[min, max]`. The bounds are swapped if given in reverse.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// No pause at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn bounds(&self) -> (Duration, Duration) {
        (self.min, self.max)
    }

    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.max == self.min {
            return self.min;
        }
        let span = (self.max - self.min).as_secs_f64();
        let offset = Duration::try_from_secs_f64(span * rand::random::<f64>()).unwrap_or_default();
        self.min.saturating_add(offset).min(self.max)
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::new(DEFAULT_JITTER_MIN, DEFAULT_JITTER_MAX)
    }
}
