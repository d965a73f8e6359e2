//! Playback snapshots that survive restarts, plus the per-guild
//! "stay in this voice channel" setting.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, StorageResult};
use crate::music::{LoopMode, Track};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MusicState {
    pub guild_id: u64,
    pub channel_id: u64,
    pub text_channel_id: Option<u64>,
    pub persistent_channel_id: Option<u64>,
    pub current: Option<Track>,
    pub current_position_secs: u64,
    pub loop_mode: LoopMode,
    /// 0 – 100
    pub volume: u8,
    pub playlist_name: Option<String>,
    pub queue: Vec<Track>,
    pub updated_at: DateTime<Utc>,
}

impl MusicState {
    pub fn new(guild_id: u64, channel_id: u64) -> Self {
        Self {
            guild_id,
            channel_id,
            text_channel_id: None,
            persistent_channel_id: None,
            current: None,
            current_position_secs: 0,
            loop_mode: LoopMode::Off,
            volume: 100,
            playlist_name: None,
            queue: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

fn state_from_row(row: &Row<'_>) -> rusqlite::Result<MusicState> {
    let current = match row.get::<_, Option<String>>("current_uri")? {
        Some(uri) => Some(Track {
            uri,
            title: row.get::<_, Option<String>>("current_title")?.unwrap_or_default(),
            author: row.get("current_author")?,
            length_secs: row.get("current_length_secs")?,
            requester_id: row.get("current_requester_id")?,
            requester_name: row
                .get::<_, Option<String>>("current_requester_name")?
                .unwrap_or_default(),
        }),
        None => None,
    };

    Ok(MusicState {
        guild_id: row.get("guild_id")?,
        channel_id: row.get("channel_id")?,
        text_channel_id: row.get("text_channel_id")?,
        persistent_channel_id: row.get("persistent_channel_id")?,
        current,
        current_position_secs: row.get("current_position_secs")?,
        loop_mode: row
            .get::<_, String>("loop_mode")?
            .parse()
            .unwrap_or_default(),
        volume: row.get::<_, u8>("volume")?.min(100),
        playlist_name: row.get("playlist_name")?,
        queue: Vec::new(),
        updated_at: row.get("updated_at")?,
    })
}

fn load_queue(conn: &Connection, guild_id: u64) -> rusqlite::Result<Vec<Track>> {
    let mut stmt = conn.prepare(
        "SELECT uri, title, author, length_secs, requester_id, requester_name
         FROM music_queue WHERE guild_id = ?1 ORDER BY position ASC",
    )?;
    let tracks = stmt
        .query_map(params![guild_id], |row| {
            Ok(Track {
                uri: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
                length_secs: row.get(3)?,
                requester_id: row.get(4)?,
                requester_name: row.get(5)?,
            })
        })?
        .collect();
    tracks
}

fn load_state(conn: &Connection, guild_id: u64) -> rusqlite::Result<Option<MusicState>> {
    let state = conn
        .query_row(
            "SELECT * FROM music_states WHERE guild_id = ?1",
            params![guild_id],
            state_from_row,
        )
        .optional()?;
    match state {
        Some(mut state) => {
            state.queue = load_queue(conn, guild_id)?;
            Ok(Some(state))
        }
        None => Ok(None),
    }
}

impl Database {
    /// Writes a full snapshot for the guild. The persistent channel setting
    /// of an existing row is left alone; it has its own setters.
    pub fn save_state(&self, state: &MusicState) -> StorageResult<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let current = state.current.as_ref();
            tx.execute(
                "INSERT INTO music_states (
                    guild_id, channel_id, text_channel_id, persistent_channel_id,
                    current_uri, current_title, current_author, current_length_secs,
                    current_requester_id, current_requester_name, current_position_secs,
                    loop_mode, volume, playlist_name, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
                 ON CONFLICT (guild_id) DO UPDATE SET
                    channel_id = excluded.channel_id,
                    text_channel_id = excluded.text_channel_id,
                    current_uri = excluded.current_uri,
                    current_title = excluded.current_title,
                    current_author = excluded.current_author,
                    current_length_secs = excluded.current_length_secs,
                    current_requester_id = excluded.current_requester_id,
                    current_requester_name = excluded.current_requester_name,
                    current_position_secs = excluded.current_position_secs,
                    loop_mode = excluded.loop_mode,
                    volume = excluded.volume,
                    playlist_name = excluded.playlist_name,
                    updated_at = excluded.updated_at",
                params![
                    state.guild_id,
                    state.channel_id,
                    state.text_channel_id,
                    state.persistent_channel_id,
                    current.map(|t| &t.uri),
                    current.map(|t| &t.title),
                    current.and_then(|t| t.author.as_ref()),
                    current.and_then(|t| t.length_secs),
                    current.and_then(|t| t.requester_id),
                    current.map(|t| &t.requester_name),
                    state.current_position_secs,
                    state.loop_mode.as_str(),
                    state.volume.min(100),
                    state.playlist_name,
                    Utc::now(),
                ],
            )?;

            tx.execute(
                "DELETE FROM music_queue WHERE guild_id = ?1",
                params![state.guild_id],
            )?;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO music_queue
                        (guild_id, position, uri, title, author, length_secs, requester_id, requester_name)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )?;
                for (position, track) in state.queue.iter().enumerate() {
                    insert.execute(params![
                        state.guild_id,
                        position,
                        track.uri,
                        track.title,
                        track.author,
                        track.length_secs,
                        track.requester_id,
                        track.requester_name
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn load_state(&self, guild_id: u64) -> StorageResult<Option<MusicState>> {
        self.with_conn(|conn| Ok(load_state(conn, guild_id)?))
    }

    /// Removes the snapshot and its queue entirely, persistent channel included.
    pub fn delete_state(&self, guild_id: u64) -> StorageResult<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM music_states WHERE guild_id = ?1",
                params![guild_id],
            )?;
            Ok(removed > 0)
        })
    }

    /// Forgets what was playing. Guilds with a persistent channel keep their
    /// row (and the setting); others are deleted.
    pub fn clear_playback(&self, guild_id: u64) -> StorageResult<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM music_queue WHERE guild_id = ?1",
                params![guild_id],
            )?;
            tx.execute(
                "DELETE FROM music_states WHERE guild_id = ?1 AND persistent_channel_id IS NULL",
                params![guild_id],
            )?;
            tx.execute(
                "UPDATE music_states SET
                    current_uri = NULL, current_title = NULL, current_author = NULL,
                    current_length_secs = NULL, current_requester_id = NULL,
                    current_requester_name = NULL, current_position_secs = 0,
                    playlist_name = NULL, updated_at = ?2
                 WHERE guild_id = ?1",
                params![guild_id, Utc::now()],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn all_states(&self) -> StorageResult<Vec<MusicState>> {
        self.with_conn(|conn| {
            let ids = {
                let mut stmt = conn.prepare("SELECT guild_id FROM music_states ORDER BY guild_id")?;
                let ids = stmt
                    .query_map([], |row| row.get::<_, u64>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                ids
            };
            let mut states = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(state) = load_state(conn, id)? {
                    states.push(state);
                }
            }
            Ok(states)
        })
    }

    pub fn set_persistent_channel(&self, guild_id: u64, channel_id: u64) -> StorageResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO music_states (guild_id, channel_id, persistent_channel_id, updated_at)
                 VALUES (?1, ?2, ?2, ?3)
                 ON CONFLICT (guild_id) DO UPDATE SET
                    persistent_channel_id = excluded.persistent_channel_id,
                    updated_at = excluded.updated_at",
                params![guild_id, channel_id, Utc::now()],
            )?;
            Ok(())
        })
    }

    pub fn persistent_channel(&self, guild_id: u64) -> StorageResult<Option<u64>> {
        self.with_conn(|conn| {
            let channel = conn
                .query_row(
                    "SELECT persistent_channel_id FROM music_states WHERE guild_id = ?1",
                    params![guild_id],
                    |row| row.get::<_, Option<u64>>(0),
                )
                .optional()?;
            Ok(channel.flatten())
        })
    }

    pub fn clear_persistent_channel(&self, guild_id: u64) -> StorageResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE music_states SET persistent_channel_id = NULL, updated_at = ?2
                 WHERE guild_id = ?1",
                params![guild_id, Utc::now()],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(n: u32) -> Track {
        Track {
            title: format!("Track {n}"),
            author: Some("Someone".to_string()),
            uri: format!("https://youtube.com/watch?v=s{n}"),
            length_secs: Some(200),
            requester_id: Some(77),
            requester_name: "listener".to_string(),
        }
    }

    fn sample_state() -> MusicState {
        MusicState {
            text_channel_id: Some(55),
            current: Some(track(1)),
            current_position_secs: 42,
            loop_mode: LoopMode::Queue,
            volume: 80,
            playlist_name: Some("evening".to_string()),
            queue: vec![track(2), track(3)],
            ..MusicState::new(1, 10)
        }
    }

    #[test]
    fn test_save_and_load_state() {
        let db = Database::open_in_memory().unwrap();
        let state = sample_state();
        db.save_state(&state).unwrap();

        let loaded = db.load_state(1).unwrap().unwrap();
        assert_eq!(loaded.channel_id, 10);
        assert_eq!(loaded.text_channel_id, Some(55));
        assert_eq!(loaded.current, Some(track(1)));
        assert_eq!(loaded.current_position_secs, 42);
        assert_eq!(loaded.loop_mode, LoopMode::Queue);
        assert_eq!(loaded.volume, 80);
        assert_eq!(loaded.playlist_name.as_deref(), Some("evening"));
        assert_eq!(loaded.queue, vec![track(2), track(3)]);
    }

    #[test]
    fn test_save_replaces_queue() {
        let db = Database::open_in_memory().unwrap();
        db.save_state(&sample_state()).unwrap();

        let next = MusicState {
            current: Some(track(2)),
            queue: vec![track(3)],
            ..sample_state()
        };
        db.save_state(&next).unwrap();

        let loaded = db.load_state(1).unwrap().unwrap();
        assert_eq!(loaded.current, Some(track(2)));
        assert_eq!(loaded.queue, vec![track(3)]);
    }

    #[test]
    fn test_missing_state_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_state(404).unwrap().is_none());
        assert!(!db.delete_state(404).unwrap());
        assert_eq!(db.persistent_channel(404).unwrap(), None);
    }

    #[test]
    fn test_persistent_channel_survives_snapshots() {
        let db = Database::open_in_memory().unwrap();
        db.set_persistent_channel(1, 99).unwrap();
        assert_eq!(db.persistent_channel(1).unwrap(), Some(99));

        db.save_state(&sample_state()).unwrap();
        assert_eq!(db.persistent_channel(1).unwrap(), Some(99));

        db.clear_persistent_channel(1).unwrap();
        assert_eq!(db.persistent_channel(1).unwrap(), None);
    }

    #[test]
    fn test_clear_playback_keeps_persistent_guilds() {
        let db = Database::open_in_memory().unwrap();
        db.save_state(&sample_state()).unwrap();
        db.set_persistent_channel(1, 10).unwrap();
        db.save_state(&MusicState {
            guild_id: 2,
            ..sample_state()
        })
        .unwrap();

        db.clear_playback(1).unwrap();
        db.clear_playback(2).unwrap();

        let kept = db.load_state(1).unwrap().unwrap();
        assert_eq!(kept.persistent_channel_id, Some(10));
        assert!(kept.current.is_none());
        assert!(kept.queue.is_empty());
        assert!(kept.playlist_name.is_none());
        assert!(db.load_state(2).unwrap().is_none());
    }

    #[test]
    fn test_delete_state_cascades_queue() {
        let db = Database::open_in_memory().unwrap();
        db.save_state(&sample_state()).unwrap();
        assert!(db.delete_state(1).unwrap());

        let rows: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM music_queue", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn test_all_states() {
        let db = Database::open_in_memory().unwrap();
        db.save_state(&sample_state()).unwrap();
        db.save_state(&MusicState::new(5, 50)).unwrap();

        let states = db.all_states().unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].guild_id, 1);
        assert_eq!(states[0].queue.len(), 2);
        assert_eq!(states[1].guild_id, 5);
        assert!(states[1].current.is_none());
    }
}
