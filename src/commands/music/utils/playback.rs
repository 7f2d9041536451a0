//! Audio playback collaborator.
//!
//! The guild player drives playback through [`PlaybackBackend`]; the songbird
//! implementation streams each track through yt-dlp and reports its end on
//! the playback event channel, tagged with the generation it was started under.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use poise::serenity_prelude as serenity;
use serenity::model::id::GuildId;
use serenity::prelude::Mutex as SerenityMutex;
use songbird::error::ControlError;
use songbird::input::YoutubeDl;
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Call, Event, Songbird, TrackEvent};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::event_handlers::{PlaybackEvent, TrackEndNotifier};
use super::music_manager::{MusicError, MusicResult};
use super::track::Track;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlaybackBackend: Send + Sync {
    /// Start `track`, replacing whatever is playing. Its end must be reported
    /// as a [`PlaybackEvent::TrackEnded`] carrying `generation`.
    async fn start(&self, track: &Track, generation: u64) -> MusicResult<()>;

    /// Stop the current track. Its end is still reported.
    async fn stop(&self) -> MusicResult<()>;

    async fn pause(&self) -> MusicResult<()>;

    async fn resume(&self) -> MusicResult<()>;

    async fn seek(&self, position: Duration) -> MusicResult<()>;

    async fn is_paused(&self) -> bool;

    /// Elapsed time of the current track, if anything is loaded.
    async fn position(&self) -> Option<Duration>;

    /// Leave the voice channel.
    async fn disconnect(&self) -> MusicResult<()>;
}

fn control_error(err: ControlError) -> MusicError {
    MusicError::UpstreamUnavailable(err.to_string())
}

/// Plays tracks into a guild's songbird call.
pub struct SongbirdPlayback {
    guild_id: GuildId,
    songbird: Arc<Songbird>,
    http_client: reqwest::Client,
    events: mpsc::UnboundedSender<PlaybackEvent>,
    current: Mutex<Option<TrackHandle>>,
}

impl SongbirdPlayback {
    pub fn new(
        guild_id: GuildId,
        songbird: Arc<Songbird>,
        http_client: reqwest::Client,
        events: mpsc::UnboundedSender<PlaybackEvent>,
    ) -> Self {
        Self {
            guild_id,
            songbird,
            http_client,
            events,
            current: Mutex::new(None),
        }
    }

    fn call(&self) -> MusicResult<Arc<SerenityMutex<Call>>> {
        self.songbird
            .get(self.guild_id)
            .ok_or(MusicError::NotConnected)
    }

    fn handle(&self) -> Option<TrackHandle> {
        self.current.lock().ok().and_then(|handle| handle.clone())
    }

    fn set_handle(&self, handle: Option<TrackHandle>) {
        if let Ok(mut current) = self.current.lock() {
            *current = handle;
        }
    }
}

#[async_trait]
impl PlaybackBackend for SongbirdPlayback {
    async fn start(&self, track: &Track, generation: u64) -> MusicResult<()> {
        let call = self.call()?;
        let input = YoutubeDl::new(self.http_client.clone(), track.id.clone());

        let handle = {
            let mut call = call.lock().await;
            call.play_only_input(input.into())
        };

        let notifier = TrackEndNotifier {
            guild_id: self.guild_id,
            generation,
            events: self.events.clone(),
        };
        handle
            .add_event(Event::Track(TrackEvent::End), notifier.clone())
            .map_err(control_error)?;
        handle
            .add_event(Event::Track(TrackEvent::Error), notifier)
            .map_err(control_error)?;

        info!(
            "Started '{}' in guild {} (generation {})",
            track.title, self.guild_id, generation
        );
        self.set_handle(Some(handle));
        Ok(())
    }

    async fn stop(&self) -> MusicResult<()> {
        let Some(handle) = self.handle() else {
            return Ok(());
        };
        match handle.stop() {
            Ok(()) | Err(ControlError::Finished) => Ok(()),
            Err(err) => Err(control_error(err)),
        }
    }

    async fn pause(&self) -> MusicResult<()> {
        let handle = self.handle().ok_or(MusicError::NothingPlaying)?;
        handle.pause().map_err(control_error)
    }

    async fn resume(&self) -> MusicResult<()> {
        let handle = self.handle().ok_or(MusicError::NothingPlaying)?;
        handle.play().map_err(control_error)
    }

    async fn seek(&self, position: Duration) -> MusicResult<()> {
        let handle = self.handle().ok_or(MusicError::NothingPlaying)?;
        let reached = handle.seek_async(position).await.map_err(control_error)?;
        debug!("Seeked to {:?} in guild {}", reached, self.guild_id);
        Ok(())
    }

    async fn is_paused(&self) -> bool {
        match self.handle() {
            Some(handle) => handle
                .get_info()
                .await
                .is_ok_and(|state| matches!(state.playing, PlayMode::Pause)),
            None => false,
        }
    }

    async fn position(&self) -> Option<Duration> {
        let handle = self.handle()?;
        handle.get_info().await.ok().map(|state| state.position)
    }

    async fn disconnect(&self) -> MusicResult<()> {
        self.set_handle(None);
        if self.songbird.get(self.guild_id).is_none() {
            return Ok(());
        }
        self.songbird
            .remove(self.guild_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))
    }
}
