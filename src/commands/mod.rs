mod extract;
mod help;
mod loop_cmd;
mod nowplaying;
mod pause;
mod play;
pub mod playlist;
mod queue;
mod remove;
mod shuffle;
mod skip;
mod stay;
pub mod stop;
mod tictactoe;
pub mod voicechat;
mod volume;

use crate::{Data, Error};

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        help::help(),
        tictactoe::tictactoe(),
        tictactoe::ttt(),
        play::play(),
        play::p(),
        skip::skip(),
        skip::s(),
        stop::stop(),
        stop::st(),
        queue::queue(),
        queue::q(),
        pause::pause(),
        pause::resume(),
        nowplaying::nowplaying(),
        nowplaying::np(),
        loop_cmd::loop_cmd(),
        loop_cmd::l(),
        shuffle::shuffle(),
        shuffle::sh(),
        remove::remove(),
        remove::rm(),
        volume::volume(),
        volume::v(),
        stay::stay(),
        playlist::playlist(),
        extract::extract(),
        voicechat::voicechat(),
        voicechat::endvoicechat(),
    ]
}
