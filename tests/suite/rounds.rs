//! Round executor driven end to end over HTTP mocks

use std::time::{Duration, Instant};

use rockbot_engine::{CallerId, Classification, RoundAttempt, SessionState};
use wiremock::MockServer;

use crate::common::{
    game_answer, game_teapot, live_executor, live_executor_at, mount_game_sequence,
    mount_model_failure, mount_model_reply, submitted_guesses,
};

/// Distinct callers one second apart, so neither cooldown gets in the way.
fn turns(base: Instant) -> impl Iterator<Item = (CallerId, Instant)> {
    (1..).map(move |i: u64| {
        (
            CallerId::new(format!("player-{i}")),
            base + Duration::from_secs(i),
        )
    })
}

#[tokio::test]
async fn three_blocks_reset_the_game_and_restart_from_rock() {
    let game = MockServer::start().await;
    let model = MockServer::start().await;
    mount_game_sequence(
        &game,
        vec![
            game_answer("beats! rock→paper"),
            game_teapot(),
            game_teapot(),
            game_teapot(),
            game_answer("Rock beats rock?"),
        ],
    )
    .await;
    mount_model_reply(&model, "paper").await;

    let executor = live_executor(&game, &model);
    let first_game = executor.start_session().await.unwrap().game_id().unwrap();
    let mut turns = turns(Instant::now());

    let mut classifications = Vec::new();
    for _ in 0..5 {
        let (caller, now) = turns.next().unwrap();
        let attempt = executor.play_round(&caller, now, None).await;
        classifications.push(attempt.outcome().unwrap().classification);
    }

    assert_eq!(
        classifications,
        vec![
            Classification::WinContinue,
            Classification::Blocked {
                consecutive: 1,
                reset: false
            },
            Classification::Blocked {
                consecutive: 2,
                reset: false
            },
            Classification::Blocked {
                consecutive: 3,
                reset: true
            },
            Classification::WinContinue,
        ]
    );

    let submitted = submitted_guesses(&game).await;
    let guesses: Vec<&str> = submitted.iter().map(|(_, guess)| guess.as_str()).collect();
    assert_eq!(guesses, ["rock", "paper", "paper", "paper", "rock"]);

    let first_id = first_game.to_string();
    assert!(submitted[..4].iter().all(|(id, _)| *id == first_id));
    assert_ne!(submitted[4].0, first_id);
    assert_eq!(executor.snapshot().await.consecutive_blocks(), 0);
}

#[tokio::test]
async fn losing_answer_ends_the_game_for_everyone() {
    let game = MockServer::start().await;
    let model = MockServer::start().await;
    mount_game_sequence(&game, vec![game_answer("Rock beats paper. You lose!")]).await;
    mount_model_reply(&model, "scissors").await;

    let executor = live_executor(&game, &model);
    executor.start_session().await.unwrap();
    let mut turns = turns(Instant::now());

    let (caller, now) = turns.next().unwrap();
    let outcome = executor
        .play_round(&caller, now, Some("Paper"))
        .await
        .outcome()
        .cloned()
        .unwrap();
    assert_eq!(outcome.guess, "paper");
    assert_eq!(outcome.classification, Classification::Lose);
    assert_eq!(executor.snapshot().await.state(), SessionState::Terminated);

    let (other, later) = turns.next().unwrap();
    assert_eq!(
        executor.play_round(&other, later, None).await,
        RoundAttempt::NoActiveGame
    );
    assert_eq!(submitted_guesses(&game).await.len(), 1);
    // The model is never consulted for a lost round.
    assert!(model.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn model_outage_falls_back_to_rock() {
    let game = MockServer::start().await;
    let model = MockServer::start().await;
    mount_game_sequence(&game, vec![game_answer("Paper covers rock")]).await;
    mount_model_failure(&model, 500).await;

    let executor = live_executor(&game, &model);
    executor.start_session().await.unwrap();
    let (caller, now) = turns(Instant::now()).next().unwrap();

    let attempt = executor.play_round(&caller, now, Some("paper")).await;
    let outcome = attempt.outcome().unwrap();
    assert_eq!(outcome.classification, Classification::WinContinue);
    assert_eq!(outcome.next_guess.as_deref(), Some("rock"));

    let session = executor.snapshot().await;
    assert_eq!(session.last_guess(), "rock");
    assert_eq!(session.last_result(), Some("Paper covers rock"));
}

#[tokio::test]
async fn server_error_is_reported_without_advancing() {
    let game = MockServer::start().await;
    let model = MockServer::start().await;
    mount_game_sequence(
        &game,
        vec![wiremock::ResponseTemplate::new(502).set_body_string("bad gateway")],
    )
    .await;
    mount_model_reply(&model, "lava").await;

    let executor = live_executor(&game, &model);
    let before = executor.start_session().await.unwrap();
    let (caller, now) = turns(Instant::now()).next().unwrap();

    let attempt = executor.play_round(&caller, now, None).await;
    let outcome = attempt.outcome().unwrap();
    assert_eq!(outcome.classification, Classification::Error { status: 502 });
    assert_eq!(outcome.result_text, "API returned status 502");
    assert_eq!(outcome.details.as_deref(), Some("bad gateway"));
    assert_eq!(executor.snapshot().await, before);
}

#[tokio::test]
async fn cooldown_denies_without_touching_the_server() {
    let game = MockServer::start().await;
    let model = MockServer::start().await;
    mount_game_sequence(&game, vec![game_answer("beats!")]).await;
    mount_model_reply(&model, "lava").await;

    let executor = live_executor(&game, &model);
    executor.start_session().await.unwrap();
    let alice = CallerId::new("alice");
    let t0 = Instant::now();

    assert!(matches!(
        executor.play_round(&alice, t0, None).await,
        RoundAttempt::Played(_)
    ));
    let session = executor.snapshot().await;

    match executor
        .play_round(&alice, t0 + Duration::from_secs(2), None)
        .await
    {
        RoundAttempt::Denied { remaining_secs } => assert!((remaining_secs - 3.0).abs() < 0.11),
        other => panic!("expected cooldown denial, got {other:?}"),
    }
    assert_eq!(executor.snapshot().await, session);
    assert_eq!(submitted_guesses(&game).await.len(), 1);
}

#[tokio::test]
async fn unreachable_game_server_is_a_transport_error() {
    let model = MockServer::start().await;
    mount_model_reply(&model, "lava").await;
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let executor = live_executor_at(format!("http://{addr}"), &model);

    let before = executor.start_session().await.unwrap();
    let (caller, now) = turns(Instant::now()).next().unwrap();

    let attempt = executor.play_round(&caller, now, None).await;
    let outcome = attempt.outcome().unwrap();
    assert_eq!(outcome.classification, Classification::Error { status: -1 });
    assert!(outcome.result_text.starts_with("Error submitting guess"));
    assert_eq!(executor.snapshot().await, before);
}
