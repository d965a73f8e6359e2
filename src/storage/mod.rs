//! SQLite persistence for playlists and music playback state.

pub mod music_state;
pub mod playlists;

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rusqlite::Connection;

pub use music_state::MusicState;
pub use playlists::{Playlist, PlaylistSummary};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("playlist names must be between 1 and {max} characters", max = playlists::MAX_NAME_LEN)]
    InvalidName,

    #[error("there are no tracks to save")]
    EmptyPlaylist,
}

pub type StorageResult<T> = Result<T, StorageError>;

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS playlists (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        guild_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (guild_id, user_id, name)
    );

    CREATE TABLE IF NOT EXISTS playlist_tracks (
        playlist_id INTEGER NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        uri TEXT NOT NULL,
        title TEXT NOT NULL,
        author TEXT,
        length_secs INTEGER,
        PRIMARY KEY (playlist_id, position)
    );

    CREATE TABLE IF NOT EXISTS music_states (
        guild_id INTEGER PRIMARY KEY,
        channel_id INTEGER NOT NULL,
        text_channel_id INTEGER,
        persistent_channel_id INTEGER,
        current_uri TEXT,
        current_title TEXT,
        current_author TEXT,
        current_length_secs INTEGER,
        current_requester_id INTEGER,
        current_requester_name TEXT,
        current_position_secs INTEGER NOT NULL DEFAULT 0,
        loop_mode TEXT NOT NULL DEFAULT 'off',
        volume INTEGER NOT NULL DEFAULT 100,
        playlist_name TEXT,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS music_queue (
        guild_id INTEGER NOT NULL REFERENCES music_states(guild_id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        uri TEXT NOT NULL,
        title TEXT NOT NULL,
        author TEXT,
        length_secs INTEGER,
        requester_id INTEGER,
        requester_name TEXT NOT NULL DEFAULT '',
        PRIMARY KEY (guild_id, position)
    );
";

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens (creating if needed) the database file and its parent directory.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> StorageResult<T>) -> StorageResult<T> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut conn)
    }
}
