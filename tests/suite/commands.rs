//! Chat commands through the router, with replies captured by a recording notifier

use std::sync::Arc;

use rockbot_engine::{CallerId, CommandRouter, StartPolicy};
use wiremock::MockServer;

use crate::common::{
    RecordingNotifier, game_answer, game_teapot, live_executor, live_router, mount_game_sequence,
    mount_model_reply,
};

async fn servers() -> (MockServer, MockServer) {
    let game = MockServer::start().await;
    let model = MockServer::start().await;
    (game, model)
}

#[tokio::test]
async fn ping_answers_pong() {
    let (game, model) = servers().await;
    let router = live_router(&game, &model);
    let notifier = RecordingNotifier::default();

    assert!(router.handle(&CallerId::new("alice"), "!ping", &notifier).await);
    assert_eq!(notifier.messages(), vec!["pong 🏓".to_string()]);
}

#[tokio::test]
async fn plain_chat_is_ignored() {
    let (game, model) = servers().await;
    let router = live_router(&game, &model);
    let notifier = RecordingNotifier::default();

    assert!(!router.handle(&CallerId::new("alice"), "gg everyone", &notifier).await);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn unknown_command_lists_commands() {
    let (game, model) = servers().await;
    let router = live_router(&game, &model);
    let notifier = RecordingNotifier::default();

    assert!(router.handle(&CallerId::new("alice"), "!dance", &notifier).await);
    let reply = notifier.joined();
    assert!(reply.contains("Unknown command `!dance`"));
    assert!(reply.contains("!round [guess]"));
}

#[tokio::test]
async fn round_before_start_asks_for_start() {
    let (game, model) = servers().await;
    let router = live_router(&game, &model);
    let notifier = RecordingNotifier::default();

    router.handle(&CallerId::new("alice"), "!round", &notifier).await;
    assert!(notifier.joined().contains("No game running. Use `!start` first."));
    assert!(game.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn start_then_round_reports_guess_result_and_suggestion() {
    let (game, model) = servers().await;
    mount_game_sequence(&game, vec![game_answer("Lava melts rock!")]).await;
    mount_model_reply(&model, "Ocean.").await;
    let router = live_router(&game, &model);
    let notifier = RecordingNotifier::default();
    let alice = CallerId::new("alice");

    router.handle(&alice, "!start", &notifier).await;
    assert!(notifier.take()[0].contains("New game started!"));

    router.handle(&alice, "!round  Lava ", &notifier).await;
    let replies = notifier.take();
    assert_eq!(replies.len(), 2);
    assert!(replies[0].contains("Guess: **lava**"));
    assert!(replies[0].contains("Result: Lava melts rock!"));
    assert!(replies[1].contains("The AI suggests: **ocean**"));

    router.handle(&alice, "!round", &notifier).await;
    assert!(notifier.joined().contains("Slow down! Try again in"));
}

#[tokio::test]
async fn blocked_round_shows_counter() {
    let (game, model) = servers().await;
    mount_game_sequence(&game, vec![game_teapot()]).await;
    mount_model_reply(&model, "paper").await;
    let router = live_router(&game, &model);
    let notifier = RecordingNotifier::default();

    router.handle(&CallerId::new("alice"), "!start", &notifier).await;
    notifier.take();
    router.handle(&CallerId::new("bob"), "!round", &notifier).await;

    let replies = notifier.take();
    assert!(replies[0].contains("Request blocked by the game server (HTTP 418)"));
    assert!(replies[1].contains("Blocked by the game server (1/3)"));
}

#[tokio::test]
async fn reject_policy_refuses_second_start() {
    let (game, model) = servers().await;
    let executor = live_executor(&game, &model).with_start_policy(StartPolicy::RejectIfActive);
    let router = CommandRouter::new(Arc::new(executor), "!");
    let notifier = RecordingNotifier::default();
    let alice = CallerId::new("alice");

    router.handle(&alice, "!start", &notifier).await;
    let first = router.executor().snapshot().await;
    router.handle(&alice, "!start", &notifier).await;

    assert!(notifier.messages()[1].contains("A game is already running."));
    assert_eq!(router.executor().snapshot().await, first);
}

#[tokio::test]
async fn concurrent_callers_share_one_game() {
    let (game, model) = servers().await;
    mount_game_sequence(&game, vec![game_answer("beats!")]).await;
    mount_model_reply(&model, "lava").await;
    let router = live_router(&game, &model);
    let notifier = Arc::new(RecordingNotifier::default());

    router.handle(&CallerId::new("host"), "!start", &*notifier).await;
    let game_id = router.executor().snapshot().await.game_id();

    let tasks: Vec<_> = ["alice", "bob", "carol"]
        .into_iter()
        .map(|name| {
            let router = router.clone();
            let notifier = Arc::clone(&notifier);
            tokio::spawn(async move {
                router
                    .handle(&CallerId::new(name), "!round", &*notifier)
                    .await
            })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap());
    }

    let requests = game.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(router.executor().snapshot().await.game_id(), game_id);
    assert_eq!(router.executor().gate().tracked_callers(), 3);
}
