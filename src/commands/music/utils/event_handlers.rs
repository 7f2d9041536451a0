//! Events flowing into and out of the player.
//!
//! Playback reports into the registry through [`PlaybackEvent`]s on an mpsc
//! channel; each guild player publishes [`SessionEvent`]s on a broadcast
//! channel that the display task (and anything else) can subscribe to.

use poise::serenity_prelude as serenity;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::session::LoopMode;
use super::track::Track;

/// Reported by the audio backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The track started under `generation` finished, was stopped, or failed.
    TrackEnded {
        guild_id: serenity::GuildId,
        generation: u64,
    },
}

/// Published by a guild player whenever its observable state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TrackAdvanced {
        guild_id: serenity::GuildId,
        track: Option<Track>,
    },
    QueueChanged {
        guild_id: serenity::GuildId,
        queue_len: usize,
    },
    LoopModeChanged {
        guild_id: serenity::GuildId,
        mode: LoopMode,
    },
    PlaybackPaused {
        guild_id: serenity::GuildId,
        paused: bool,
    },
    Closed {
        guild_id: serenity::GuildId,
    },
}

/// Songbird handler attached to each started track; forwards its end as a [`PlaybackEvent`].
#[derive(Clone)]
pub struct TrackEndNotifier {
    pub guild_id: serenity::GuildId,
    pub generation: u64,
    pub events: mpsc::UnboundedSender<PlaybackEvent>,
}

#[cfg(feature = "music")]
#[async_trait::async_trait]
impl songbird::EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        if let songbird::EventContext::Track(tracks) = ctx {
            for (state, _) in tracks.iter() {
                if let songbird::tracks::PlayMode::Errored(err) = &state.playing {
                    warn!(
                        "Track errored in guild {} (generation {}): {}",
                        self.guild_id, self.generation, err
                    );
                }
            }

            debug!(
                "Track ended in guild {} (generation {})",
                self.guild_id, self.generation
            );
            if self
                .events
                .send(PlaybackEvent::TrackEnded {
                    guild_id: self.guild_id,
                    generation: self.generation,
                })
                .is_err()
            {
                warn!(
                    "Playback event dispatcher is gone; dropping track end for guild {}",
                    self.guild_id
                );
            }
        }
        None
    }
}
