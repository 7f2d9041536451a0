//! Common test utilities, fixtures, and fakes
//! Recording stand-ins for the voice and Discord collaborators, so players can
//! be driven end to end without a gateway connection.
#![allow(dead_code)]

use async_trait::async_trait;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, UserId};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use rusty_jukebox::player::controller::PlayerView;
use rusty_jukebox::player::event_handlers::PlaybackEvent;
use rusty_jukebox::player::guild_player::GuildPlayer;
use rusty_jukebox::player::messaging::{MessageHandle, Messenger};
use rusty_jukebox::player::music_manager::{MusicError, MusicResult};
use rusty_jukebox::player::playback::PlaybackBackend;
use rusty_jukebox::player::session::PlayerSession;
use rusty_jukebox::player::track::Track;
use rusty_jukebox::utils::config::PlayerConfig;

pub const GUILD: GuildId = GuildId::new(1);
pub const OWNER: UserId = UserId::new(42);
pub const CHANNEL: ChannelId = ChannelId::new(10);

pub fn track(id: &str) -> Track {
    Track::new(id, format!("Title {}", id), Duration::from_secs(180))
}

pub fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| track(id)).collect()
}

pub fn config() -> PlayerConfig {
    PlayerConfig {
        refresh_interval: Duration::from_secs(5),
        idle_timeout: Duration::from_secs(60),
        delete_grace: Duration::from_secs(10),
        idle_disconnect: Duration::from_secs(600),
    }
}

#[derive(Debug, Default)]
pub struct PlaybackLog {
    /// `(track id, generation)` for every start.
    pub started: Vec<(String, u64)>,
    pub stops: usize,
    pub paused: bool,
    pub disconnected: bool,
    playing: Option<u64>,
}

/// Playback that reports a stopped track's end on the event channel, the way
/// songbird fires `TrackEvent::End` after `stop`.
pub struct FakePlayback {
    guild_id: GuildId,
    events: mpsc::UnboundedSender<PlaybackEvent>,
    log: Mutex<PlaybackLog>,
}

impl FakePlayback {
    pub fn new(guild_id: GuildId, events: mpsc::UnboundedSender<PlaybackEvent>) -> Arc<Self> {
        Arc::new(Self {
            guild_id,
            events,
            log: Mutex::default(),
        })
    }

    pub fn started_ids(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .started
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn with_log<T>(&self, f: impl FnOnce(&PlaybackLog) -> T) -> T {
        f(&self.log.lock().unwrap())
    }
}

#[async_trait]
impl PlaybackBackend for FakePlayback {
    async fn start(&self, track: &Track, generation: u64) -> MusicResult<()> {
        let mut log = self.log.lock().unwrap();
        log.started.push((track.id.clone(), generation));
        log.playing = Some(generation);
        log.paused = false;
        Ok(())
    }

    async fn stop(&self) -> MusicResult<()> {
        let mut log = self.log.lock().unwrap();
        log.stops += 1;
        if let Some(generation) = log.playing.take() {
            let _ = self.events.send(PlaybackEvent::TrackEnded {
                guild_id: self.guild_id,
                generation,
            });
        }
        Ok(())
    }

    async fn pause(&self) -> MusicResult<()> {
        self.log.lock().unwrap().paused = true;
        Ok(())
    }

    async fn resume(&self) -> MusicResult<()> {
        self.log.lock().unwrap().paused = false;
        Ok(())
    }

    async fn seek(&self, _position: Duration) -> MusicResult<()> {
        Ok(())
    }

    async fn is_paused(&self) -> bool {
        self.log.lock().unwrap().paused
    }

    async fn position(&self) -> Option<Duration> {
        self.log
            .lock()
            .unwrap()
            .playing
            .map(|_| Duration::from_secs(30))
    }

    async fn disconnect(&self) -> MusicResult<()> {
        self.log.lock().unwrap().disconnected = true;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MessageLog {
    pub sent: Vec<MessageHandle>,
    pub edits: usize,
    pub deleted: Vec<MessageHandle>,
    pub last_view: Option<PlayerView>,
}

/// Messenger keeping an in-memory channel. Messages can be made to vanish to
/// imitate someone deleting them in Discord.
#[derive(Default)]
pub struct FakeMessenger {
    next_id: AtomicU64,
    live: Mutex<HashSet<MessageHandle>>,
    log: Mutex<MessageLog>,
}

impl FakeMessenger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Drop every live message without telling the player.
    pub fn vanish_all(&self) {
        self.live.lock().unwrap().clear();
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn with_log<T>(&self, f: impl FnOnce(&MessageLog) -> T) -> T {
        f(&self.log.lock().unwrap())
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn send_message(
        &self,
        channel_id: ChannelId,
        view: &PlayerView,
    ) -> MusicResult<MessageHandle> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = MessageHandle {
            channel_id,
            message_id: MessageId::new(id),
        };
        self.live.lock().unwrap().insert(handle);
        let mut log = self.log.lock().unwrap();
        log.sent.push(handle);
        log.last_view = Some(view.clone());
        Ok(handle)
    }

    async fn edit_message(&self, handle: MessageHandle, view: &PlayerView) -> MusicResult<()> {
        if !self.live.lock().unwrap().contains(&handle) {
            return Err(MusicError::StaleReference("Unknown Message".to_string()));
        }
        let mut log = self.log.lock().unwrap();
        log.edits += 1;
        log.last_view = Some(view.clone());
        Ok(())
    }

    async fn delete_message(&self, handle: MessageHandle) -> MusicResult<()> {
        if !self.live.lock().unwrap().remove(&handle) {
            return Err(MusicError::StaleReference("Unknown Message".to_string()));
        }
        self.log.lock().unwrap().deleted.push(handle);
        Ok(())
    }
}

pub fn guild_player(
    playback: Arc<FakePlayback>,
    messenger: Arc<FakeMessenger>,
    config: PlayerConfig,
) -> GuildPlayer {
    guild_player_in(GUILD, playback, messenger, config)
}

pub fn guild_player_in(
    guild_id: GuildId,
    playback: Arc<FakePlayback>,
    messenger: Arc<FakeMessenger>,
    config: PlayerConfig,
) -> GuildPlayer {
    GuildPlayer::new(
        guild_id,
        PlayerSession::new(OWNER, CHANNEL),
        playback,
        messenger,
        config,
        Instant::now(),
    )
}

/// Let spawned tasks drain their channels. Needs a paused clock.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
