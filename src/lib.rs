//! Discord music bot built around a per-guild playback session engine.
//!
//! The engine (sessions, pagination, scrolling controls) lives under
//! [`commands::music::utils`] and is re-exported as [`player`]. Everything
//! that talks to Discord or voice goes through the collaborator traits defined
//! there, so the engine can be driven without a gateway connection.

pub mod commands;
#[cfg(feature = "music")]
pub mod events;
pub mod utils;

#[cfg(feature = "music")]
pub use commands::music::utils as player;

#[cfg(feature = "music")]
use std::sync::Arc;

use utils::config::Config;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// User data shared by every command invocation and event.
pub struct Data {
    pub config: Config,
    /// One player per guild, created on the first play request.
    #[cfg(feature = "music")]
    pub players: Arc<player::music_manager::SessionRegistry>,
    #[cfg(feature = "music")]
    pub playlists: Arc<dyn player::playlist::PlaylistStore>,
    #[cfg(feature = "music")]
    pub resolver: Arc<dyn commands::music::audio_sources::TrackResolver>,
    /// Handed to every playback backend; drained by the registry's dispatcher.
    #[cfg(feature = "music")]
    pub playback_events: tokio::sync::mpsc::UnboundedSender<player::event_handlers::PlaybackEvent>,
    /// Shared client handed to songbird's `YoutubeDl` inputs.
    pub http_client: reqwest::Client,
}

#[poise::command(slash_command, category = "General")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            show_context_menu_commands: true,
            ..Default::default()
        },
    )
    .await
    .map_err(|e| e.into())
}

#[poise::command(prefix_command, hide_in_help)]
pub async fn register(ctx: Context<'_>) -> Result<(), Error> {
    poise::builtins::register_application_commands_buttons(ctx)
        .await
        .map_err(|e| e.into())
}
