//! Active games, one per channel, each with its own idle timer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serenity::model::id::{ChannelId, MessageId, UserId};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::debug;

use super::board::Cell;
use super::session::{GameSession, MoveError};

pub type Session = GameSession<UserId>;

/// Why a game could not be started.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a game is already running in this channel")]
    GameInProgress,
    #[error("a game needs two different players")]
    SamePlayer,
}

/// Why a move on a registered game was refused.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MoveRejected {
    #[error("this game has already ended")]
    NoActiveGame,
    #[error(transparent)]
    Move(#[from] MoveError),
}

/// Called by the idle timer once a game has been retired for inactivity.
#[async_trait]
pub trait ExpiryNotifier: Send + Sync {
    async fn game_expired(&self, expired: ExpiredGame);
}

#[derive(Clone, Debug)]
pub struct ExpiredGame {
    pub channel_id: ChannelId,
    pub game_id: u64,
    pub message_id: Option<MessageId>,
    pub session: Session,
}

/// State after an accepted move.
#[derive(Clone, Debug)]
pub struct MoveReport {
    pub game_id: u64,
    pub session: Session,
    /// The move ended the game and it has been removed from the registry.
    pub finished: bool,
}

struct ActiveGame {
    id: u64,
    session: Session,
    message_id: Option<MessageId>,
    timer: Option<AbortHandle>,
    notifier: Arc<dyn ExpiryNotifier>,
}

impl Drop for ActiveGame {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

#[derive(Clone)]
pub struct GameRegistry {
    games: Arc<Mutex<HashMap<ChannelId, ActiveGame>>>,
    next_id: Arc<AtomicU64>,
    idle_timeout: Duration,
}

impl GameRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            games: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Registers a new game for `channel_id`. The first mover is picked by a
    /// coin flip. Fails if the channel already has a running game.
    pub async fn start(
        &self,
        channel_id: ChannelId,
        challenger: UserId,
        opponent: UserId,
        notifier: Arc<dyn ExpiryNotifier>,
    ) -> Result<(u64, Session), RegistryError> {
        let session = GameSession::with_coin_flip(challenger, opponent, &mut rand::thread_rng());
        self.insert(channel_id, session, notifier).await
    }

    /// Registers an already-built session. `start` goes through here.
    pub async fn insert(
        &self,
        channel_id: ChannelId,
        session: Session,
        notifier: Arc<dyn ExpiryNotifier>,
    ) -> Result<(u64, Session), RegistryError> {
        if session.player_x() == session.player_o() {
            return Err(RegistryError::SamePlayer);
        }

        let mut games = self.games.lock().await;
        if games.contains_key(&channel_id) {
            return Err(RegistryError::GameInProgress);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut game = ActiveGame {
            id,
            session: session.clone(),
            message_id: None,
            timer: None,
            notifier,
        };
        self.arm_timer(channel_id, &mut game);
        games.insert(channel_id, game);

        debug!("game {id} started in channel {channel_id}");
        Ok((id, session))
    }

    /// Remembers which message shows the board so the timer can update it.
    pub async fn attach_message(&self, channel_id: ChannelId, game_id: u64, message_id: MessageId) {
        let mut games = self.games.lock().await;
        if let Some(game) = games.get_mut(&channel_id).filter(|g| g.id == game_id) {
            game.message_id = Some(message_id);
        }
    }

    /// Snapshot of the running game in `channel_id`, if it is `game_id`.
    pub async fn get(&self, channel_id: ChannelId, game_id: u64) -> Option<Session> {
        let games = self.games.lock().await;
        games
            .get(&channel_id)
            .filter(|g| g.id == game_id)
            .map(|g| g.session.clone())
    }

    /// Hands a move to the arbiter. Moves for the same channel are
    /// serialized by the registry lock. An accepted move restarts the idle
    /// timer; a finishing move cancels it and retires the game.
    pub async fn submit_move(
        &self,
        channel_id: ChannelId,
        game_id: u64,
        player: UserId,
        cell: Cell,
    ) -> Result<MoveReport, MoveRejected> {
        let mut games = self.games.lock().await;
        let game = games
            .get_mut(&channel_id)
            .filter(|g| g.id == game_id)
            .ok_or(MoveRejected::NoActiveGame)?;

        game.session.submit_move(player, cell)?;
        let session = game.session.clone();
        let finished = session.status().is_terminal();

        if finished {
            games.remove(&channel_id);
            debug!("game {game_id} in channel {channel_id} finished: {:?}", session.status());
        } else {
            self.arm_timer(channel_id, game);
        }

        Ok(MoveReport {
            game_id,
            session,
            finished,
        })
    }

    /// Retires `game_id` for inactivity. Safe to call any number of times:
    /// returns `None` if the game already ended or was replaced.
    pub async fn expire(&self, channel_id: ChannelId, game_id: u64) -> Option<ExpiredGame> {
        let mut games = self.games.lock().await;
        let game = games.get_mut(&channel_id).filter(|g| g.id == game_id)?;
        if !game.session.time_out() {
            return None;
        }
        // the timer task calling us must not abort itself on drop
        game.timer = None;
        let game = games.remove(&channel_id)?;
        debug!("game {game_id} in channel {channel_id} timed out");

        Some(ExpiredGame {
            channel_id,
            game_id,
            message_id: game.message_id,
            session: game.session.clone(),
        })
    }

    fn arm_timer(&self, channel_id: ChannelId, game: &mut ActiveGame) {
        if let Some(previous) = game.timer.take() {
            previous.abort();
        }

        let registry = self.clone();
        let notifier = Arc::clone(&game.notifier);
        let game_id = game.id;
        let idle = self.idle_timeout;

        let task = tokio::spawn(async move {
            tokio::time::sleep(idle).await;
            if let Some(expired) = registry.expire(channel_id, game_id).await {
                notifier.game_expired(expired).await;
            }
        });
        game.timer = Some(task.abort_handle());
    }
}
