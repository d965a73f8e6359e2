//! Saved playlists, keyed by `(guild_id, user_id, name)`.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{Database, StorageError, StorageResult};
use crate::music::Track;

pub const MAX_NAME_LEN: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub name: String,
    pub track_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<Track>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn normalize_name(name: &str) -> StorageResult<String> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(StorageError::InvalidName);
    }
    Ok(name.to_string())
}

impl Database {
    /// Saves `tracks` under `name`, replacing the tracks of an existing
    /// playlist with that name. Returns the stored (trimmed) name.
    pub fn save_playlist(
        &self,
        guild_id: u64,
        user_id: u64,
        name: &str,
        tracks: &[Track],
    ) -> StorageResult<String> {
        let name = normalize_name(name)?;
        if tracks.is_empty() {
            return Err(StorageError::EmptyPlaylist);
        }

        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let now = Utc::now();
            tx.execute(
                "INSERT INTO playlists (guild_id, user_id, name, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT (guild_id, user_id, name) DO UPDATE SET updated_at = excluded.updated_at",
                params![guild_id, user_id, name, now],
            )?;
            let playlist_id: i64 = tx.query_row(
                "SELECT id FROM playlists WHERE guild_id = ?1 AND user_id = ?2 AND name = ?3",
                params![guild_id, user_id, name],
                |row| row.get(0),
            )?;

            tx.execute(
                "DELETE FROM playlist_tracks WHERE playlist_id = ?1",
                params![playlist_id],
            )?;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO playlist_tracks (playlist_id, position, uri, title, author, length_secs)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;
                for (position, track) in tracks.iter().enumerate() {
                    insert.execute(params![
                        playlist_id,
                        position,
                        track.uri,
                        track.title,
                        track.author,
                        track.length_secs
                    ])?;
                }
            }
            tx.commit()?;
            Ok(name)
        })
    }

    pub fn load_playlist(&self, guild_id: u64, user_id: u64, name: &str) -> StorageResult<Option<Playlist>> {
        let name = name.trim();
        self.with_conn(|conn| {
            let header = conn
                .query_row(
                    "SELECT id, name, created_at, updated_at FROM playlists
                     WHERE guild_id = ?1 AND user_id = ?2 AND name = ?3",
                    params![guild_id, user_id, name],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, DateTime<Utc>>(2)?,
                            row.get::<_, DateTime<Utc>>(3)?,
                        ))
                    },
                )
                .optional()?;

            let Some((id, name, created_at, updated_at)) = header else {
                return Ok(None);
            };

            let mut stmt = conn.prepare(
                "SELECT uri, title, author, length_secs FROM playlist_tracks
                 WHERE playlist_id = ?1 ORDER BY position ASC",
            )?;
            let tracks = stmt
                .query_map(params![id], |row| {
                    Ok(Track {
                        uri: row.get(0)?,
                        title: row.get(1)?,
                        author: row.get(2)?,
                        length_secs: row.get(3)?,
                        requester_id: None,
                        requester_name: String::new(),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Some(Playlist {
                name,
                tracks,
                created_at,
                updated_at,
            }))
        })
    }

    /// One page of a user's playlists, newest first.
    pub fn list_playlists(
        &self,
        guild_id: u64,
        user_id: u64,
        limit: usize,
        offset: usize,
    ) -> StorageResult<Vec<PlaylistSummary>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.name, p.created_at,
                        (SELECT COUNT(*) FROM playlist_tracks t WHERE t.playlist_id = p.id)
                 FROM playlists p
                 WHERE p.guild_id = ?1 AND p.user_id = ?2
                 ORDER BY p.created_at DESC, p.id DESC
                 LIMIT ?3 OFFSET ?4",
            )?;
            let rows = stmt
                .query_map(params![guild_id, user_id, limit, offset], |row| {
                    Ok(PlaylistSummary {
                        name: row.get(0)?,
                        created_at: row.get(1)?,
                        track_count: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_playlists(&self, guild_id: u64, user_id: u64) -> StorageResult<usize> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM playlists WHERE guild_id = ?1 AND user_id = ?2",
                params![guild_id, user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Returns whether a playlist was actually removed.
    pub fn delete_playlist(&self, guild_id: u64, user_id: u64, name: &str) -> StorageResult<bool> {
        let name = name.trim();
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM playlists WHERE guild_id = ?1 AND user_id = ?2 AND name = ?3",
                params![guild_id, user_id, name],
            )?;
            Ok(removed > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUILD: u64 = 111;
    const USER: u64 = 222;

    fn track(n: u32) -> Track {
        Track {
            title: format!("Track {n}"),
            author: Some(format!("Artist {n}")),
            uri: format!("https://youtube.com/watch?v=t{n}"),
            length_secs: Some(60 * n as u64),
            requester_id: Some(9),
            requester_name: "dj".to_string(),
        }
    }

    #[test]
    fn test_save_and_load_keeps_order() {
        let db = Database::open_in_memory().unwrap();
        let tracks: Vec<Track> = (1..=3).map(track).collect();
        let name = db.save_playlist(GUILD, USER, "  Road trip ", &tracks).unwrap();
        assert_eq!(name, "Road trip");

        let loaded = db.load_playlist(GUILD, USER, "Road trip").unwrap().unwrap();
        let titles: Vec<&str> = loaded.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Track 1", "Track 2", "Track 3"]);
        assert_eq!(loaded.tracks[1].author.as_deref(), Some("Artist 2"));
        assert_eq!(loaded.tracks[2].length_secs, Some(180));
        // requester is not part of a saved playlist
        assert!(loaded.tracks[0].requester_id.is_none());
    }

    #[test]
    fn test_save_same_name_replaces_tracks() {
        let db = Database::open_in_memory().unwrap();
        db.save_playlist(GUILD, USER, "mix", &[track(1), track(2)]).unwrap();
        db.save_playlist(GUILD, USER, "mix", &[track(7)]).unwrap();

        let loaded = db.load_playlist(GUILD, USER, "mix").unwrap().unwrap();
        assert_eq!(loaded.tracks, vec![track_without_requester(7)]);
        assert_eq!(db.count_playlists(GUILD, USER).unwrap(), 1);
    }

    fn track_without_requester(n: u32) -> Track {
        Track {
            requester_id: None,
            requester_name: String::new(),
            ..track(n)
        }
    }

    #[test]
    fn test_playlists_are_scoped_per_user_and_guild() {
        let db = Database::open_in_memory().unwrap();
        db.save_playlist(GUILD, USER, "mine", &[track(1)]).unwrap();

        assert!(db.load_playlist(GUILD, USER + 1, "mine").unwrap().is_none());
        assert!(db.load_playlist(GUILD + 1, USER, "mine").unwrap().is_none());
        assert_eq!(db.count_playlists(GUILD, USER + 1).unwrap(), 0);
    }

    #[test]
    fn test_rejects_bad_names_and_empty_playlists() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.save_playlist(GUILD, USER, "   ", &[track(1)]),
            Err(StorageError::InvalidName)
        ));
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            db.save_playlist(GUILD, USER, &long, &[track(1)]),
            Err(StorageError::InvalidName)
        ));
        assert!(matches!(
            db.save_playlist(GUILD, USER, "empty", &[]),
            Err(StorageError::EmptyPlaylist)
        ));
    }

    #[test]
    fn test_list_paginates_with_counts() {
        let db = Database::open_in_memory().unwrap();
        for i in 1..=12u32 {
            let tracks: Vec<Track> = (1..=i).map(track).collect();
            db.save_playlist(GUILD, USER, &format!("list {i}"), &tracks).unwrap();
        }

        assert_eq!(db.count_playlists(GUILD, USER).unwrap(), 12);
        let first = db.list_playlists(GUILD, USER, 10, 0).unwrap();
        let second = db.list_playlists(GUILD, USER, 10, 10).unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 2);

        // newest first
        assert_eq!(first[0].name, "list 12");
        assert_eq!(first[0].track_count, 12);
        assert_eq!(second[1].name, "list 1");
        assert_eq!(second[1].track_count, 1);
    }

    #[test]
    fn test_delete_reports_removal_and_drops_tracks() {
        let db = Database::open_in_memory().unwrap();
        db.save_playlist(GUILD, USER, "gone", &[track(1), track(2)]).unwrap();

        assert!(db.delete_playlist(GUILD, USER, "gone").unwrap());
        assert!(!db.delete_playlist(GUILD, USER, "gone").unwrap());
        assert!(db.load_playlist(GUILD, USER, "gone").unwrap().is_none());

        let orphans: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM playlist_tracks", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
