//! Slash commands for the music player.
//!
//! Each command resolves the guild's player from the registry in [`Data`],
//! performs one operation on it and answers with an embed. Failures are shown
//! to the caller as an ephemeral error embed rather than bubbling to poise.

pub mod back;
pub mod leave;
pub mod loop_mode;
pub mod pause;
pub mod play;
pub mod playlist;
pub mod queue;
pub mod remove;
pub mod seek;
pub mod shuffle;
pub mod skip;
pub mod stop;

pub mod audio_sources;
pub mod utils;

use poise::{CreateReply, serenity_prelude as serenity};
use serenity::model::id::GuildId;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::{CommandResult, Context, Data};
use utils::embedded_messages;
use utils::guild_player::GuildPlayer;
use utils::messaging::SerenityMessenger;
use utils::music_manager::{self, MusicError, MusicResult};
use utils::playback::SongbirdPlayback;
use utils::session::PlayerSession;

/// Every music command, for registration with the framework.
pub fn commands() -> Vec<poise::Command<Data, crate::Error>> {
    vec![
        play::play(),
        pause::pause(),
        skip::skip(),
        back::back(),
        loop_mode::loop_mode(),
        queue::queue(),
        remove::remove(),
        shuffle::shuffle(),
        seek::seek(),
        stop::stop(),
        leave::leave(),
        playlist::playlist(),
    ]
}

fn guild_id(ctx: Context<'_>) -> MusicResult<GuildId> {
    ctx.guild_id().ok_or(MusicError::NotInGuild)
}

/// The guild's running player.
fn active_player(ctx: Context<'_>) -> MusicResult<Arc<Mutex<GuildPlayer>>> {
    let guild_id = guild_id(ctx)?;
    ctx.data()
        .players
        .get(guild_id)
        .ok_or(MusicError::NotConnected)
}

/// The guild's player, joining the caller's voice channel and creating the
/// player on first use. The caller becomes its owner.
async fn connect_player(ctx: Context<'_>) -> MusicResult<Arc<Mutex<GuildPlayer>>> {
    let guild_id = guild_id(ctx)?;
    let data = ctx.data();
    if let Some(player) = data.players.get(guild_id) {
        return Ok(player);
    }

    let serenity_ctx = ctx.serenity_context();
    music_manager::ensure_voice_connection(serenity_ctx, guild_id, ctx.author().id).await?;
    let songbird = music_manager::get_songbird(serenity_ctx).await?;

    let owner = ctx.author().id;
    let channel_id = ctx.channel_id();
    let http = Arc::clone(&serenity_ctx.http);
    Ok(data.players.get_or_create(guild_id, || {
        GuildPlayer::new(
            guild_id,
            PlayerSession::new(owner, channel_id),
            Arc::new(SongbirdPlayback::new(
                guild_id,
                songbird,
                data.http_client.clone(),
                data.playback_events.clone(),
            )),
            Arc::new(SerenityMessenger::new(http)),
            *data.players.config(),
            Instant::now(),
        )
    }))
}

/// Send `reply`, or the error embed if the operation failed.
async fn respond(ctx: Context<'_>, reply: MusicResult<CreateReply>) -> CommandResult {
    let reply = match reply {
        Ok(reply) => reply,
        Err(err) => {
            warn!("/{} failed: {}", ctx.command().qualified_name, err);
            embedded_messages::error(&err)
        }
    };
    ctx.send(reply).await?;
    Ok(())
}
