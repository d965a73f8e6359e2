use std::time::Duration;

use rand::seq::SliceRandom;
use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::mention::Mentionable;

use crate::game::{DisplayModel, Mark, Phase};
use crate::music::{format_secs, LoopMode, Track};
use crate::storage::PlaylistSummary;

pub const COLOR_INFO: u32 = 0x5865F2;
pub const COLOR_SUCCESS: u32 = 0x57F287;
pub const COLOR_ERROR: u32 = 0xED4245;
const COLOR_X: u32 = 0xFF3366;
const COLOR_O: u32 = 0x3366FF;
const COLOR_DRAW: u32 = 0xFFD700;
const COLOR_TIMEOUT: u32 = 0x99AAB5;

pub const PLAYLISTS_PER_PAGE: usize = 10;

const WIN_MESSAGES: &[&str] = &[
    "🎊 **SPECTACULAR VICTORY!** 🎊",
    "⭐ **FLAWLESS TRIUMPH!** ⭐",
    "🏆 **CHAMPION CROWNED!** 🏆",
    "👑 **SUPREME CHAMPION!** 👑",
];

const DRAW_MESSAGES: &[&str] = &[
    "🤝 **EVENLY MATCHED!** An honorable draw!",
    "⚖️ **PERFECTLY BALANCED!** What a close match!",
    "🎭 **STALEMATE!** Nobody could break through!",
];

pub fn mark_emoji(mark: Mark) -> char {
    match mark {
        Mark::X => '❌',
        Mark::O => '⭕',
    }
}

fn duration_text(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}m {}s", secs / 60, secs % 60)
}

fn players_field(model: &DisplayModel) -> String {
    format!(
        "❌ **Player X** {}\n⭕ **Player O** {}",
        model.player_x.mention(),
        model.player_o.mention()
    )
}

pub fn idle_text(idle: Duration) -> String {
    let secs = idle.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        format!("{} minute(s)", secs / 60)
    } else {
        format!("{secs} second(s)")
    }
}

/// Opening text posted above a new board.
pub fn game_intro(model: &DisplayModel, idle: Duration) -> String {
    format!(
        "# ⚔️ BATTLE INITIATED! ⚔️\n{} *(❌ X)* **VS** {} *(⭕ O)*\n{} makes the first move. \
         The game ends after **{}** without a move.",
        model.player_x.mention(),
        model.player_o.mention(),
        model.player_x.mention(),
        idle_text(idle),
    )
}

pub fn game(model: &DisplayModel) -> CreateEmbed {
    let stats = format!(
        "**Moves:** {}/9\n**Started:** <t:{}:R>",
        model.moves_made,
        model.started_at.timestamp()
    );

    match model.phase {
        Phase::Playing { turn, mark } => CreateEmbed::new()
            .title("🎮 TIC-TAC-TOE")
            .color(if mark == Mark::X { COLOR_X } else { COLOR_O })
            .field("🎯 Players", players_field(model), false)
            .field(
                "⚡ Current turn",
                format!("{} {}", mark_emoji(mark), turn.mention()),
                false,
            )
            .field("📊 Game info", stats, false)
            .footer(CreateEmbedFooter::new("Click an empty cell to make your move")),
        Phase::Won { winner, loser, mark } => {
            let headline = WIN_MESSAGES
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(WIN_MESSAGES[0]);
            let victory = match model.moves_made {
                0..=5 => "Lightning fast!",
                6..=7 => "Strategic masterclass!",
                _ => "Hard-fought battle!",
            };
            CreateEmbed::new()
                .title("🎉 GAME OVER 🎉")
                .description(headline)
                .color(if mark == Mark::X { COLOR_X } else { COLOR_O })
                .field(
                    "👑 Champion",
                    format!("{} {} conquered the board!", mark_emoji(mark), winner.mention()),
                    false,
                )
                .field("🎖️ Opponent", loser.mention().to_string(), false)
                .field(
                    "📊 Match statistics",
                    format!(
                        "**Total moves:** {}\n**Duration:** {}\n**Victory type:** {victory}",
                        model.moves_made,
                        duration_text(model.elapsed_secs)
                    ),
                    false,
                )
                .footer(CreateEmbedFooter::new("Play again with /ttt"))
        }
        Phase::Draw => {
            let headline = DRAW_MESSAGES
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(DRAW_MESSAGES[0]);
            CreateEmbed::new()
                .title("🎭 DRAW 🎭")
                .description(headline)
                .color(COLOR_DRAW)
                .field("🎯 Players", players_field(model), false)
                .field(
                    "📊 Match statistics",
                    format!(
                        "**Total moves:** {}\n**Duration:** {}",
                        model.moves_made,
                        duration_text(model.elapsed_secs)
                    ),
                    false,
                )
                .footer(CreateEmbedFooter::new("Ready for a rematch? Use /ttt"))
        }
        Phase::TimedOut => CreateEmbed::new()
            .title("⏰ GAME TIMED OUT")
            .description("Nobody moved in time, so this game has ended.")
            .color(COLOR_TIMEOUT)
            .field("🎯 Players", players_field(model), false)
            .field("📊 Game info", stats, false),
    }
}

pub fn now_playing(track: &Track) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("🎵 Now playing")
        .description(format!("[{}]({})", track.title, track.uri))
        .color(0x1DB954);

    if let Some(author) = &track.author {
        embed = embed.field("Artist", author, true);
    }
    if let Some(length) = track.length_label() {
        embed = embed.field("Length", length, true);
    }
    if !track.requester_name.is_empty() {
        embed = embed.field("Requested by", &track.requester_name, true);
    }
    embed
}

pub fn added_to_queue(track: &Track, position: usize) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("✅ Added to queue")
        .description(format!("[{}]({})", track.title, track.uri))
        .color(COLOR_INFO);

    if let Some(length) = track.length_label() {
        embed = embed.field("Length", length, true);
    }

    embed.field("Position", format!("#{position}"), true)
}

pub fn queue_list(current: Option<&Track>, tracks: &[Track], page: usize, loop_mode: LoopMode) -> CreateEmbed {
    let per_page = 10;
    let total_pages = tracks.len().div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let mut description = String::new();

    if let Some(track) = current {
        description.push_str(&format!(
            "**Now playing:** [{}]({}){}\n\n",
            track.title,
            track.uri,
            track
                .length_label()
                .map_or(String::new(), |d| format!(" `{d}`"))
        ));
    }

    if tracks.is_empty() {
        description.push_str("The queue is empty.");
    } else {
        let start = (page - 1) * per_page;
        let end = (start + per_page).min(tracks.len());

        for (i, track) in tracks[start..end].iter().enumerate() {
            let num = start + i + 1;
            let length = track
                .length_label()
                .map_or(String::new(), |d| format!(" `{d}`"));
            description.push_str(&format!("**{num}.** [{}]({}){length}\n", track.title, track.uri));
        }
    }

    let total_secs: u64 = tracks.iter().filter_map(|t| t.length_secs).sum();

    CreateEmbed::new()
        .title(format!("📋 Queue ({page}/{total_pages})"))
        .description(description)
        .color(COLOR_INFO)
        .footer(CreateEmbedFooter::new(format!(
            "{} tracks · {} · loop: {loop_mode}",
            tracks.len(),
            format_secs(total_secs)
        )))
}

/// `page` is 1-based.
pub fn playlist_list(summaries: &[PlaylistSummary], total: usize, page: usize) -> CreateEmbed {
    let total_pages = total.div_ceil(PLAYLISTS_PER_PAGE).max(1);

    let body = if summaries.is_empty() {
        "You haven't saved any playlists yet.\nUse `/playlist save` to create one.".to_string()
    } else {
        summaries
            .iter()
            .enumerate()
            .map(|(i, p)| {
                format!(
                    "`{}.` **{}**\n   └ {} tracks • created {}",
                    (page - 1) * PLAYLISTS_PER_PAGE + i + 1,
                    p.name,
                    p.track_count,
                    p.created_at.format("%Y-%m-%d")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    CreateEmbed::new()
        .title("📋 My playlists")
        .description(format!("You have **{total}** saved playlist(s)\n\n{body}"))
        .color(0x00CED1)
        .footer(CreateEmbedFooter::new(format!("Page {page}/{total_pages}")))
}

pub fn success(message: &str) -> CreateEmbed {
    CreateEmbed::new().description(message).color(COLOR_SUCCESS)
}

pub fn error(message: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("❌ Error")
        .description(message)
        .color(COLOR_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_text() {
        assert_eq!(idle_text(Duration::from_secs(300)), "5 minute(s)");
        assert_eq!(idle_text(Duration::from_secs(90)), "90 second(s)");
        assert_eq!(idle_text(Duration::from_secs(30)), "30 second(s)");
    }

    #[test]
    fn test_duration_text() {
        assert_eq!(duration_text(125), "2m 5s");
        assert_eq!(duration_text(-4), "0m 0s");
    }
}
