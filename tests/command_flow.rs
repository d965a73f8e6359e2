use arena_bot::music::{self, queue, restore, LoopMode, Track};
use arena_bot::storage::{Database, MusicState};
use serenity::model::id::{ChannelId, GuildId};

fn test_track(n: u32) -> Track {
    Track {
        title: format!("Track {n}"),
        author: Some("someone".to_string()),
        uri: format!("https://youtube.com/watch?v=test{n}"),
        length_secs: Some(u64::from(n) * 60),
        requester_id: Some(7),
        requester_name: "user".to_string(),
    }
}

fn titles(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(|t| t.title.clone()).collect()
}

#[tokio::test]
async fn test_play_queue_skip_flow() {
    // /play x3, then skip through to the end
    let players = music::new_player_manager();
    let gid = GuildId::new(1);

    queue::enqueue(&players, gid, test_track(1)).await;
    queue::enqueue(&players, gid, test_track(2)).await;
    queue::enqueue(&players, gid, test_track(3)).await;

    let current = queue::advance(&players, gid, false).await;
    assert_eq!(current.unwrap().title, "Track 1");
    assert_eq!(queue::current(&players, gid).await.unwrap().title, "Track 1");

    let (cur, upcoming) = queue::snapshot(&players, gid).await;
    assert_eq!(cur.unwrap().title, "Track 1");
    assert_eq!(upcoming.len(), 2);

    assert_eq!(queue::advance(&players, gid, true).await.unwrap().title, "Track 2");
    assert_eq!(queue::advance(&players, gid, true).await.unwrap().title, "Track 3");
    assert!(queue::advance(&players, gid, true).await.is_none());
    assert!(queue::is_idle(&players, gid).await);
}

#[tokio::test]
async fn test_loop_track_flow() {
    let players = music::new_player_manager();
    let gid = GuildId::new(2);

    queue::enqueue(&players, gid, test_track(1)).await;
    queue::enqueue(&players, gid, test_track(2)).await;
    queue::advance(&players, gid, false).await;

    queue::set_loop_mode(&players, gid, LoopMode::Track).await;

    // natural end repeats, a skip moves on
    assert_eq!(queue::advance(&players, gid, false).await.unwrap().title, "Track 1");
    assert_eq!(queue::advance(&players, gid, true).await.unwrap().title, "Track 2");
}

#[tokio::test]
async fn test_loop_queue_flow() {
    let players = music::new_player_manager();
    let gid = GuildId::new(3);

    queue::enqueue(&players, gid, test_track(1)).await;
    queue::enqueue(&players, gid, test_track(2)).await;
    queue::set_loop_mode(&players, gid, LoopMode::Queue).await;

    assert_eq!(queue::advance(&players, gid, false).await.unwrap().title, "Track 1");
    assert_eq!(queue::advance(&players, gid, false).await.unwrap().title, "Track 2");
    assert_eq!(queue::advance(&players, gid, false).await.unwrap().title, "Track 1");
}

#[tokio::test]
async fn test_shuffle_remove_flow() {
    let players = music::new_player_manager();
    let gid = GuildId::new(4);

    for i in 1..=5 {
        queue::enqueue(&players, gid, test_track(i)).await;
    }
    queue::advance(&players, gid, false).await;

    assert_eq!(queue::shuffle(&players, gid).await, 4);
    assert!(queue::remove_at(&players, gid, 1).await.is_some());
    assert!(queue::remove_at(&players, gid, 0).await.is_none());
    assert!(queue::remove_at(&players, gid, 9).await.is_none());

    let (_, upcoming) = queue::snapshot(&players, gid).await;
    assert_eq!(upcoming.len(), 3);
}

#[tokio::test]
async fn test_volume_flow() {
    let players = music::new_player_manager();
    let gid = GuildId::new(5);

    assert!((queue::volume(&players, gid).await - 1.0).abs() < f32::EPSILON);

    queue::set_volume(&players, gid, 0.8).await;
    assert!((queue::volume(&players, gid).await - 0.8).abs() < f32::EPSILON);

    queue::set_volume(&players, gid, 3.0).await;
    assert!((queue::volume(&players, gid).await - 1.0).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_clear_empties_player() {
    let players = music::new_player_manager();
    let gid = GuildId::new(6);

    queue::enqueue(&players, gid, test_track(1)).await;
    queue::enqueue(&players, gid, test_track(2)).await;
    queue::advance(&players, gid, false).await;

    queue::clear(&players, gid).await;

    assert!(queue::is_idle(&players, gid).await);
    assert!(queue::current(&players, gid).await.is_none());
    assert!(queue::all_tracks(&players, gid).await.is_empty());
}

#[tokio::test]
async fn test_multiple_guilds_isolated() {
    let players = music::new_player_manager();
    let g1 = GuildId::new(100);
    let g2 = GuildId::new(200);

    queue::enqueue(&players, g1, test_track(1)).await;
    queue::enqueue(&players, g2, test_track(2)).await;

    assert_eq!(queue::advance(&players, g1, false).await.unwrap().title, "Track 1");
    assert_eq!(queue::advance(&players, g2, false).await.unwrap().title, "Track 2");

    queue::clear(&players, g1).await;
    assert!(queue::is_idle(&players, g1).await);
    assert!(!queue::is_idle(&players, g2).await);
}

#[tokio::test]
async fn test_playlist_save_then_load_flow() {
    // /play x3, skip one, /playlist save, /stop, /playlist load
    let players = music::new_player_manager();
    let db = Database::open_in_memory().unwrap();
    let gid = GuildId::new(7);

    for i in 1..=3 {
        queue::enqueue(&players, gid, test_track(i)).await;
    }
    queue::advance(&players, gid, false).await;

    let tracks = queue::all_tracks(&players, gid).await;
    let name = db.save_playlist(gid.get(), 7, "  road trip ", &tracks).unwrap();
    assert_eq!(name, "road trip");

    queue::clear(&players, gid).await;

    let loaded = db.load_playlist(gid.get(), 7, "road trip").unwrap().unwrap();
    let count = queue::replace(&players, gid, loaded.tracks, Some(loaded.name)).await;
    assert_eq!(count, 3);

    assert_eq!(queue::advance(&players, gid, false).await.unwrap().title, "Track 1");
    let (_, upcoming) = queue::snapshot(&players, gid).await;
    assert_eq!(titles(&upcoming), ["Track 2", "Track 3"]);

    // someone else's playlists are separate
    assert!(db.load_playlist(gid.get(), 8, "road trip").unwrap().is_none());
}

#[tokio::test]
async fn test_saved_state_restores_queue() {
    let db = Database::open_in_memory().unwrap();

    let mut state = MusicState::new(9, 90);
    state.current = Some(test_track(1));
    state.queue = vec![test_track(2), test_track(3)];
    state.loop_mode = LoopMode::Queue;
    state.volume = 60;
    db.save_state(&state).unwrap();
    db.set_persistent_channel(9, 90).unwrap();

    let stored = db.all_states().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].persistent_channel_id, Some(90));

    let players = music::new_player_manager();
    let gid = GuildId::new(9);
    players
        .write()
        .await
        .insert(gid, restore::player_from_state(&stored[0], ChannelId::new(90)));

    assert_eq!(queue::loop_mode(&players, gid).await, LoopMode::Queue);
    assert_eq!(queue::advance(&players, gid, false).await.unwrap().title, "Track 1");
    let (_, upcoming) = queue::snapshot(&players, gid).await;
    assert_eq!(titles(&upcoming), ["Track 2", "Track 3"]);
}
