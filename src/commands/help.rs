use poise::CreateReply;
use serenity::builder::CreateEmbed;

use crate::utils::embed::{self, COLOR_INFO};
use crate::{Context, Error};

async fn help_impl(ctx: Context<'_>) -> Result<(), Error> {
    let game_cmds = format!(
        "`/tictactoe` (`/ttt`) — challenge someone to tic-tac-toe\n\
         Click an empty cell on your turn. A game ends after {} without a move.",
        embed::idle_text(ctx.data().games.idle_timeout())
    );

    let music_cmds = "\
`/play` (`/p`) — play a track or add it to the queue
`/skip` (`/s`) — skip the current track
`/stop` (`/st`) — stop and leave the voice channel
`/queue` (`/q`) — show the queue
`/nowplaying` (`/np`) — show the current track
`/pause` · `/resume` — pause or resume playback
`/loop` (`/l`) — loop mode (off/track/queue)
`/shuffle` (`/sh`) — shuffle the queue
`/remove` (`/rm`) — remove a track from the queue
`/volume` (`/v`) — set the volume (0-100)
`/stay` — toggle 24/7 mode in your voice channel";

    let playlist_cmds = "\
`/playlist save` — save the current track and queue
`/playlist load` — replace the queue with a playlist
`/playlist list` — list your playlists
`/playlist delete` — delete a playlist";

    let other_cmds = "\
`/voicechat` — type in this channel and hear the bot in your voice channel
`/endvoicechat` — end the voice chat
`/extract` — export a channel's recent messages as JSON, TXT or CSV";

    let embed = CreateEmbed::new()
        .title("Arena Bot help")
        .field("Games", game_cmds, false)
        .field("Music", music_cmds, false)
        .field("Playlists", playlist_cmds, false)
        .field("Voice chat and tools", other_cmds, false)
        .color(COLOR_INFO);

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// List the bot's commands
#[poise::command(slash_command, guild_only)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    help_impl(ctx).await
}
