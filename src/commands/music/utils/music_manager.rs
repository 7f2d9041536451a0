use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::Mutex as SerenityMutex;
use songbird::{Call, Songbird};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::utils::config::PlayerConfig;

use super::event_handlers::PlaybackEvent;
use super::guild_player::{GuildPlayer, spawn_display_task};

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Index {index} is out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Message no longer exists: {0}")]
    StaleReference(String),

    #[error("Upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Nothing is playing")]
    NothingPlaying,

    #[error("Not in a guild")]
    NotInGuild,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Failed to get voice manager")]
    NoVoiceManager,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Only the member who started the player can do that")]
    NotOwner,

    #[error("Audio source error: {0}")]
    AudioSourceError(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

struct PlayerEntry {
    player: Arc<Mutex<GuildPlayer>>,
    display_task: JoinHandle<()>,
}

/// Owns one [`GuildPlayer`] per guild together with its display task.
pub struct SessionRegistry {
    players: DashMap<GuildId, PlayerEntry>,
    config: PlayerConfig,
}

impl SessionRegistry {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            players: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn get(&self, guild_id: GuildId) -> Option<Arc<Mutex<GuildPlayer>>> {
        self.players
            .get(&guild_id)
            .map(|entry| Arc::clone(&entry.player))
    }

    pub fn contains(&self, guild_id: GuildId) -> bool {
        self.players.contains_key(&guild_id)
    }

    pub fn guild_ids(&self) -> Vec<GuildId> {
        self.players.iter().map(|entry| *entry.key()).collect()
    }

    /// Return the guild's player, building it with `create` if there is none yet.
    pub fn get_or_create(
        &self,
        guild_id: GuildId,
        create: impl FnOnce() -> GuildPlayer,
    ) -> Arc<Mutex<GuildPlayer>> {
        let entry = self.players.entry(guild_id).or_insert_with(|| {
            info!("Creating player session for guild {}", guild_id);
            let player = create();
            let events = player.subscribe();
            let player = Arc::new(Mutex::new(player));
            let display_task =
                spawn_display_task(Arc::clone(&player), events, self.config.refresh_interval);
            PlayerEntry {
                player,
                display_task,
            }
        });
        Arc::clone(&entry.player)
    }

    /// Tear down a guild's session: stop its display task, disconnect and delete the message.
    pub async fn evict(&self, guild_id: GuildId) -> bool {
        let Some((_, entry)) = self.players.remove(&guild_id) else {
            debug!("No player session to evict for guild {}", guild_id);
            return false;
        };

        info!("Evicting player session for guild {}", guild_id);
        entry.display_task.abort();
        entry.player.lock().await.close().await;
        true
    }

    /// Route a playback event to the guild it belongs to.
    pub async fn dispatch(&self, event: PlaybackEvent) {
        let PlaybackEvent::TrackEnded {
            guild_id,
            generation,
        } = event;

        let Some(player) = self.get(guild_id) else {
            debug!("Dropping track end for guild {} without a session", guild_id);
            return;
        };

        let mut player = player.lock().await;
        if let Err(e) = player.on_track_end(generation).await {
            error!(
                "Failed to continue playback in guild {} after track end: {}",
                guild_id, e
            );
        }
    }

    /// Drain playback events for as long as any sender is alive.
    pub fn spawn_dispatcher(
        self: Arc<Self>,
        mut events: mpsc::UnboundedReceiver<PlaybackEvent>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                // A guild whose player is busy must not hold up the others.
                let registry = Arc::clone(&self);
                tokio::spawn(async move { registry.dispatch(event).await });
            }
            info!("Playback event dispatcher finished");
        })
    }

    /// Guilds whose session has had nothing to play for at least the configured idle window.
    pub async fn idle_guilds(&self, now: Instant) -> Vec<GuildId> {
        let mut idle = Vec::new();
        for guild_id in self.guild_ids() {
            let Some(player) = self.get(guild_id) else {
                continue;
            };
            if player
                .lock()
                .await
                .is_empty_for(now, self.config.idle_disconnect)
            {
                idle.push(guild_id);
            }
        }
        idle
    }

    /// Periodically evict sessions that have sat empty for too long.
    pub fn spawn_reaper(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.refresh_interval * 6);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                for guild_id in self.idle_guilds(Instant::now()).await {
                    info!("Disconnecting idle player in guild {}", guild_id);
                    self.evict(guild_id).await;
                }
            }
        })
    }
}

/// Get the Songbird voice client from the context
pub async fn get_songbird(ctx: &Context) -> MusicResult<Arc<Songbird>> {
    songbird::get(ctx).await.ok_or(MusicError::NoVoiceManager)
}

/// Get the voice channel ID that the user is currently in
pub fn get_user_voice_channel(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
) -> MusicResult<ChannelId> {
    let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

    let voice_state = guild
        .voice_states
        .get(&user_id)
        .ok_or(MusicError::UserNotInVoiceChannel)?;

    voice_state
        .channel_id
        .ok_or(MusicError::UserNotInVoiceChannel)
}

/// Join the user's voice channel unless the bot is already connected in this guild.
pub async fn ensure_voice_connection(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
) -> MusicResult<Arc<SerenityMutex<Call>>> {
    let manager = get_songbird(ctx).await?;
    if let Some(call) = manager.get(guild_id) {
        return Ok(call);
    }

    let channel_id = get_user_voice_channel(ctx, guild_id, user_id)?;
    manager.join(guild_id, channel_id).await.map_err(|err| {
        warn!(
            "Failed to join voice channel {} for guild {}: {}",
            channel_id, guild_id, err
        );
        MusicError::JoinError(err.to_string())
    })
}
