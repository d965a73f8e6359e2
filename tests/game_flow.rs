use std::sync::Arc;
use std::time::Duration;

use arena_bot::game::{
    Cell, ExpiredGame, ExpiryNotifier, GameRegistry, GameSession, MoveError, MoveRejected,
    RegistryError, Status,
};
use async_trait::async_trait;
use serenity::model::id::{ChannelId, MessageId, UserId};
use tokio::sync::mpsc;

const IDLE: Duration = Duration::from_secs(300);

struct Recorder(mpsc::UnboundedSender<ExpiredGame>);

#[async_trait]
impl ExpiryNotifier for Recorder {
    async fn game_expired(&self, expired: ExpiredGame) {
        let _ = self.0.send(expired);
    }
}

fn recorder() -> (Arc<dyn ExpiryNotifier>, mpsc::UnboundedReceiver<ExpiredGame>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(Recorder(tx)), rx)
}

fn cell(row: usize, col: usize) -> Cell {
    Cell::new(row, col).unwrap()
}

const ALICE: UserId = UserId::new(1);
const BOB: UserId = UserId::new(2);

/// Starts a game where ALICE is X and moves first.
async fn start(
    registry: &GameRegistry,
    channel: ChannelId,
) -> (u64, mpsc::UnboundedReceiver<ExpiredGame>) {
    let (notifier, rx) = recorder();
    let (id, _) = registry
        .insert(channel, GameSession::new(ALICE, BOB), notifier)
        .await
        .unwrap();
    (id, rx)
}

#[tokio::test(start_paused = true)]
async fn test_one_game_per_channel() {
    let registry = GameRegistry::new(IDLE);
    let channel = ChannelId::new(10);
    start(&registry, channel).await;

    let (notifier, _rx) = recorder();
    let second = registry.start(channel, UserId::new(3), UserId::new(4), notifier).await;
    assert_eq!(second.err(), Some(RegistryError::GameInProgress));

    // another channel is independent
    let (notifier, _rx) = recorder();
    let (_, session) = registry
        .start(ChannelId::new(11), UserId::new(3), UserId::new(4), notifier)
        .await
        .unwrap();
    assert!(session.is_player(UserId::new(3)));
    assert!(session.is_player(UserId::new(4)));
}

#[tokio::test(start_paused = true)]
async fn test_game_against_yourself_is_refused() {
    let registry = GameRegistry::new(IDLE);
    let channel = ChannelId::new(15);

    let (notifier, mut rx) = recorder();
    let err = registry.start(channel, ALICE, ALICE, notifier).await.unwrap_err();
    assert_eq!(err, RegistryError::SamePlayer);

    let (notifier, _rx) = recorder();
    let err = registry
        .insert(channel, GameSession::new(BOB, BOB), notifier)
        .await
        .unwrap_err();
    assert_eq!(err, RegistryError::SamePlayer);

    // nothing was registered, so no timer ever fires and the channel is free
    tokio::time::sleep(IDLE * 2).await;
    assert!(rx.try_recv().is_err());
    let (id, _rx) = start(&registry, channel).await;
    assert!(registry.get(channel, id).await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_moves_leave_game_untouched() {
    let registry = GameRegistry::new(IDLE);
    let channel = ChannelId::new(20);
    let (id, _rx) = start(&registry, channel).await;

    let err = registry.submit_move(channel, id, BOB, cell(0, 0)).await.unwrap_err();
    assert_eq!(err, MoveRejected::Move(MoveError::NotYourTurn));

    registry.submit_move(channel, id, ALICE, cell(1, 1)).await.unwrap();
    let err = registry.submit_move(channel, id, BOB, cell(1, 1)).await.unwrap_err();
    assert_eq!(err, MoveRejected::Move(MoveError::CellOccupied));

    let session = registry.get(channel, id).await.unwrap();
    assert_eq!(session.moves_made(), 1);
    assert_eq!(session.current_turn(), BOB);
    assert_eq!(session.status(), Status::InProgress);
}

#[tokio::test(start_paused = true)]
async fn test_winning_move_retires_game() {
    let registry = GameRegistry::new(IDLE);
    let channel = ChannelId::new(30);
    let (id, mut rx) = start(&registry, channel).await;

    let moves = [
        (ALICE, cell(0, 0)),
        (BOB, cell(1, 0)),
        (ALICE, cell(0, 1)),
        (BOB, cell(1, 1)),
    ];
    for (player, c) in moves {
        let report = registry.submit_move(channel, id, player, c).await.unwrap();
        assert!(!report.finished);
    }

    let report = registry.submit_move(channel, id, ALICE, cell(0, 2)).await.unwrap();
    assert!(report.finished);
    assert_eq!(report.session.status(), Status::WonBy(ALICE));
    assert!(registry.get(channel, id).await.is_none());

    // late clicks on the finished board
    let err = registry.submit_move(channel, id, BOB, cell(2, 2)).await.unwrap_err();
    assert_eq!(err, MoveRejected::NoActiveGame);

    // the idle timer was cancelled with the game
    tokio::time::sleep(IDLE * 2).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_idle_game_times_out_once() {
    let registry = GameRegistry::new(IDLE);
    let channel = ChannelId::new(40);
    let (id, mut rx) = start(&registry, channel).await;
    registry.attach_message(channel, id, MessageId::new(99)).await;

    tokio::time::sleep(IDLE + Duration::from_secs(1)).await;

    let expired = rx.recv().await.unwrap();
    assert_eq!(expired.game_id, id);
    assert_eq!(expired.channel_id, channel);
    assert_eq!(expired.message_id, Some(MessageId::new(99)));
    assert_eq!(expired.session.status(), Status::TimedOut);
    assert!(registry.get(channel, id).await.is_none());

    // expiring again is a no-op
    assert!(registry.expire(channel, id).await.is_none());
    let err = registry.submit_move(channel, id, ALICE, cell(0, 0)).await.unwrap_err();
    assert_eq!(err, MoveRejected::NoActiveGame);
}

#[tokio::test(start_paused = true)]
async fn test_accepted_move_restarts_idle_timer() {
    let registry = GameRegistry::new(IDLE);
    let channel = ChannelId::new(50);
    let (id, mut rx) = start(&registry, channel).await;

    tokio::time::sleep(Duration::from_secs(200)).await;
    registry.submit_move(channel, id, ALICE, cell(2, 2)).await.unwrap();

    // past the first deadline, but not the new one
    tokio::time::sleep(Duration::from_secs(200)).await;
    assert!(registry.get(channel, id).await.is_some());
    assert!(rx.try_recv().is_err());

    tokio::time::sleep(Duration::from_secs(101)).await;
    let expired = rx.recv().await.unwrap();
    assert_eq!(expired.session.moves_made(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_move_does_not_restart_timer() {
    let registry = GameRegistry::new(IDLE);
    let channel = ChannelId::new(60);
    let (id, mut rx) = start(&registry, channel).await;

    tokio::time::sleep(Duration::from_secs(200)).await;
    assert!(registry.submit_move(channel, id, BOB, cell(0, 0)).await.is_err());

    tokio::time::sleep(Duration::from_secs(101)).await;
    assert!(rx.recv().await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_stale_game_id_is_rejected() {
    let registry = GameRegistry::new(IDLE);
    let channel = ChannelId::new(70);
    let (old_id, _rx) = start(&registry, channel).await;

    assert!(registry.expire(channel, old_id).await.is_some());
    let (new_id, _rx) = start(&registry, channel).await;
    assert_ne!(old_id, new_id);

    // buttons from the previous board must not drive the new game
    let err = registry.submit_move(channel, old_id, ALICE, cell(0, 0)).await.unwrap_err();
    assert_eq!(err, MoveRejected::NoActiveGame);
    assert!(registry.expire(channel, old_id).await.is_none());
    assert!(registry.get(channel, new_id).await.is_some());
}
