use serenity::builder::{CreateActionRow, CreateButton, CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption};
use serenity::model::application::ButtonStyle;

use crate::game::{self, DisplayModel, Mark};
use crate::music::Track;
use crate::storage::PlaylistSummary;

/// Discord needs a non-empty label; a zero-width space keeps empty cells blank.
const EMPTY_LABEL: &str = "\u{200b}";

/// Three rows of three buttons, one per cell, all routed through the same
/// `ttt:` handler.
pub fn board(model: &DisplayModel) -> Vec<CreateActionRow> {
    model
        .rows()
        .map(|row| {
            let buttons = row
                .iter()
                .map(|view| {
                    let button = CreateButton::new(game::button_id(model.game_id, view.cell))
                        .disabled(view.disabled);
                    match view.mark {
                        Some(Mark::X) => button.label("X").style(ButtonStyle::Danger),
                        Some(Mark::O) => button.label("O").style(ButtonStyle::Primary),
                        None => button.label(EMPTY_LABEL).style(ButtonStyle::Secondary),
                    }
                })
                .collect();
            CreateActionRow::Buttons(buttons)
        })
        .collect()
}

pub fn music_buttons(is_paused: bool) -> CreateActionRow {
    let pause_resume = if is_paused {
        CreateButton::new("music_resume")
            .label("Resume")
            .emoji('▶')
            .style(ButtonStyle::Success)
    } else {
        CreateButton::new("music_pause")
            .label("Pause")
            .emoji('⏸')
            .style(ButtonStyle::Primary)
    };

    let skip = CreateButton::new("music_skip")
        .label("Skip")
        .emoji('⏭')
        .style(ButtonStyle::Secondary);

    let stop = CreateButton::new("music_stop")
        .label("Stop")
        .emoji('⏹')
        .style(ButtonStyle::Danger);

    CreateActionRow::Buttons(vec![pause_resume, skip, stop])
}

pub fn music_buttons_disabled() -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new("music_pause")
            .label("Pause")
            .emoji('⏸')
            .style(ButtonStyle::Primary)
            .disabled(true),
        CreateButton::new("music_skip")
            .label("Skip")
            .emoji('⏭')
            .style(ButtonStyle::Secondary)
            .disabled(true),
        CreateButton::new("music_stop")
            .label("Stop")
            .emoji('⏹')
            .style(ButtonStyle::Danger)
            .disabled(true),
    ])
}

/// The "end call" button under a voice chat's start message.
pub fn voice_chat_controls() -> CreateActionRow {
    CreateActionRow::Buttons(vec![CreateButton::new("voice_end")
        .label("End call")
        .emoji('📴')
        .style(ButtonStyle::Danger)])
}

pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

fn queue_select_menu(upcoming: &[Track]) -> CreateActionRow {
    let count = upcoming.len().min(25);
    let options: Vec<CreateSelectMenuOption> = upcoming
        .iter()
        .take(25)
        .enumerate()
        .map(|(i, track)| {
            let label = truncate_str(&track.title, 100);
            let desc = match track.length_label() {
                Some(d) => format!("#{} · {d}", i + 1),
                None => format!("#{}", i + 1),
            };
            CreateSelectMenuOption::new(label, format!("queue_{i}")).description(truncate_str(&desc, 100))
        })
        .collect();

    let placeholder = if upcoming.len() > 25 {
        format!("Up next ({count}/{} tracks)", upcoming.len())
    } else {
        format!("Up next ({count} tracks)")
    };

    let menu = CreateSelectMenu::new("music_queue_select", CreateSelectMenuKind::String { options })
        .placeholder(placeholder);

    CreateActionRow::SelectMenu(menu)
}

pub fn music_components(is_paused: bool, upcoming: &[Track]) -> Vec<CreateActionRow> {
    let mut rows = vec![music_buttons(is_paused)];
    if !upcoming.is_empty() {
        rows.push(queue_select_menu(upcoming));
    }
    rows
}

pub fn music_components_disabled() -> Vec<CreateActionRow> {
    vec![music_buttons_disabled()]
}

/// Dropdown that loads the chosen playlist, plus page navigation.
/// `page` is 1-based.
pub fn playlist_components(summaries: &[PlaylistSummary], page: usize, total_pages: usize) -> Vec<CreateActionRow> {
    let mut rows = Vec::new();
    if !summaries.is_empty() {
        let options = summaries
            .iter()
            .take(25)
            .map(|p| {
                CreateSelectMenuOption::new(truncate_str(&p.name, 100), p.name.clone())
                    .description(format!("{} tracks", p.track_count))
            })
            .collect();
        rows.push(CreateActionRow::SelectMenu(
            CreateSelectMenu::new("playlist_load", CreateSelectMenuKind::String { options })
                .placeholder("Select a playlist to load..."),
        ));
    }

    rows.push(CreateActionRow::Buttons(vec![
        CreateButton::new(format!("playlist_page:{}", page.saturating_sub(1)))
            .emoji('◀')
            .style(ButtonStyle::Secondary)
            .disabled(page <= 1),
        CreateButton::new(format!("playlist_page:{}", page + 1))
            .emoji('▶')
            .style(ButtonStyle::Secondary)
            .disabled(page >= total_pages),
    ]));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("abcdefghijkl", 8), "abcde...");
        assert_eq!(truncate_str("ÅÄÖåäö", 5), "ÅÄ...");
    }

    #[test]
    fn test_playlist_components_without_playlists_has_only_nav() {
        let rows = playlist_components(&[], 1, 1);
        assert_eq!(rows.len(), 1);
    }
}
