//! One guild's live player.
//!
//! [`GuildPlayer`] wires a [`PlayerSession`] to its collaborators: it starts
//! and stops audio through a [`PlaybackBackend`], keeps the player message in
//! sync through a [`Messenger`], and publishes [`SessionEvent`]s. All access
//! goes through the registry's per-guild mutex, so mutations are serialized.

use poise::serenity_prelude as serenity;
use serenity::model::id::{ChannelId, GuildId, UserId};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::utils::config::PlayerConfig;

use super::controller::{PlayerController, PlayerView};
use super::event_handlers::SessionEvent;
use super::messaging::{MessageHandle, Messenger};
use super::music_manager::{MusicError, MusicResult};
use super::playback::PlaybackBackend;
use super::player_controls::PlaybackAction;
use super::scroller::ScrollAction;
use super::session::{
    Advance, Direction, LoopChange, LoopMode, PlayerSession, SessionState, SkipAction,
};
use super::track::Track;

const EVENT_CAPACITY: usize = 32;

/// What woke the display task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Interval,
    Event,
}

/// Run `op`, retrying once if the collaborator reports itself unavailable.
async fn retry_once<T, F, Fut>(what: &str, guild_id: GuildId, mut op: F) -> MusicResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = MusicResult<T>>,
{
    match op().await {
        Err(MusicError::UpstreamUnavailable(reason)) => {
            warn!(
                "{} failed in guild {} ({}), retrying once",
                what, guild_id, reason
            );
            op().await
        }
        other => other,
    }
}

pub struct GuildPlayer {
    guild_id: GuildId,
    session: PlayerSession,
    controller: PlayerController,
    playback: Arc<dyn PlaybackBackend>,
    messenger: Arc<dyn Messenger>,
    message: Option<MessageHandle>,
    /// Whether the backend holds a started track whose end is still to come.
    live: bool,
    config: PlayerConfig,
    retire_at: Option<Instant>,
    empty_since: Option<Instant>,
    events: broadcast::Sender<SessionEvent>,
}

impl GuildPlayer {
    pub fn new(
        guild_id: GuildId,
        session: PlayerSession,
        playback: Arc<dyn PlaybackBackend>,
        messenger: Arc<dyn Messenger>,
        config: PlayerConfig,
        now: Instant,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            guild_id,
            session,
            controller: PlayerController::new(config.idle_timeout, now),
            playback,
            messenger,
            message: None,
            live: false,
            config,
            retire_at: None,
            empty_since: None,
            events,
        }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn session(&self) -> &PlayerSession {
        &self.session
    }

    pub fn controller(&self) -> &PlayerController {
        &self.controller
    }

    pub fn message(&self) -> Option<MessageHandle> {
        self.message
    }

    pub fn owner(&self) -> UserId {
        self.session.owner()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("No subscribers for player events in guild {}", self.guild_id);
        }
    }

    fn publish_track(&self) {
        self.publish(SessionEvent::TrackAdvanced {
            guild_id: self.guild_id,
            track: self.session.current_track().cloned(),
        });
    }

    fn publish_queue(&self) {
        self.publish(SessionEvent::QueueChanged {
            guild_id: self.guild_id,
            queue_len: self.session.queue().len(),
        });
    }

    async fn start_current(&mut self) -> MusicResult<()> {
        let Some(track) = self.session.current_track().cloned() else {
            return Ok(());
        };
        let generation = self.session.begin_playback();
        let playback = Arc::clone(&self.playback);
        retry_once("Starting playback", self.guild_id, || {
            playback.start(&track, generation)
        })
        .await?;
        self.live = true;
        Ok(())
    }

    /// Start the current track, moving past tracks that refuse to start.
    async fn play_current(&mut self) -> MusicResult<()> {
        let mut attempts = self.session.queue().len() + 1;
        loop {
            let err = match self.start_current().await {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            warn!("Could not start track in guild {}: {}", self.guild_id, err);
            self.live = false;
            self.session.invalidate_playback();

            attempts -= 1;
            if attempts == 0 || self.session.advance(Direction::Forward) != Advance::Moved {
                self.session.set_stopped(true);
                self.publish_track();
                return Err(err);
            }
            self.publish_track();
        }
    }

    /// Append tracks to the queue, starting playback if nothing is current.
    ///
    /// Returns the position of the first new track, where 0 means it is
    /// playing now.
    pub async fn enqueue(&mut self, tracks: Vec<Track>) -> MusicResult<usize> {
        if tracks.is_empty() {
            return Err(MusicError::InvalidArgument("nothing to queue".to_string()));
        }
        let position = self.session.queue().len() + 1;
        self.session.enqueue(tracks);
        self.publish_queue();
        self.start_if_idle(position).await
    }

    /// Queue tracks to play right after the current one.
    pub async fn enqueue_next(&mut self, tracks: Vec<Track>) -> MusicResult<usize> {
        if tracks.is_empty() {
            return Err(MusicError::InvalidArgument("nothing to queue".to_string()));
        }
        self.session.enqueue_next(tracks);
        self.publish_queue();
        self.start_if_idle(1).await
    }

    async fn start_if_idle(&mut self, position: usize) -> MusicResult<usize> {
        if self.session.current_track().is_some() {
            return Ok(position);
        }
        self.session.advance(Direction::Forward);
        self.publish_track();
        self.play_current().await?;
        Ok(position - 1)
    }

    /// Consume a track-end report from playback.
    pub async fn on_track_end(&mut self, generation: u64) -> MusicResult<()> {
        let Some(direction) = self.session.on_track_end(generation) else {
            return Ok(());
        };
        self.live = false;
        debug!(
            "Advanced {:?} in guild {} after track end",
            direction, self.guild_id
        );
        self.publish_track();

        if self.session.current_track().is_none() {
            info!("Nothing left to play in guild {}", self.guild_id);
            return Ok(());
        }
        self.play_current().await
    }

    pub async fn skip(&mut self, direction: Direction, count: usize) -> MusicResult<()> {
        if !self.live {
            // Stopping would produce no track end, so move the timeline here.
            self.session.step(direction, count)?;
            self.publish_track();
            return self.play_current().await;
        }
        match self.session.skip(direction, count)? {
            SkipAction::StartCurrent => {
                self.publish_track();
                self.play_current().await
            }
            SkipAction::StopCurrent => {
                let playback = Arc::clone(&self.playback);
                retry_once("Stopping playback", self.guild_id, || playback.stop()).await
            }
        }
    }

    /// Pause or resume. Returns whether playback is now paused.
    pub async fn toggle_pause(&mut self) -> MusicResult<bool> {
        if self.session.current_track().is_none() {
            return Err(MusicError::NothingPlaying);
        }

        let paused = !self.playback.is_paused().await;
        if paused {
            self.playback.pause().await?;
        } else {
            self.playback.resume().await?;
        }
        self.session.set_stopped(paused);
        self.publish(SessionEvent::PlaybackPaused {
            guild_id: self.guild_id,
            paused,
        });
        Ok(paused)
    }

    pub async fn seek(&mut self, position: Duration) -> MusicResult<()> {
        let track = self
            .session
            .current_track()
            .ok_or(MusicError::NothingPlaying)?;
        if !track.duration.is_zero() && position > track.duration {
            return Err(MusicError::InvalidArgument(format!(
                "'{}' is only {} long",
                track.title,
                super::format_duration(track.duration)
            )));
        }
        self.playback.seek(position).await
    }

    pub fn change_loop_mode(&mut self, change: LoopChange) -> LoopMode {
        let mode = self.session.change_loop_mode(change);
        self.publish(SessionEvent::LoopModeChanged {
            guild_id: self.guild_id,
            mode,
        });
        mode
    }

    /// Remove the queued track at `index` (0-based).
    pub fn remove(&mut self, index: usize) -> MusicResult<Track> {
        let removed = self.session.remove_from_queue(index)?;
        self.publish_queue();
        Ok(removed)
    }

    pub fn shuffle<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        self.session.shuffle_queue(rng);
        self.publish_queue();
        self.session.queue().len()
    }

    /// Drop the whole timeline and stop the current track.
    pub async fn stop(&mut self) -> MusicResult<()> {
        self.session.clear();
        self.live = false;
        self.publish_track();
        self.publish_queue();
        self.playback.stop().await
    }

    /// Apply a playback button press.
    pub async fn press(&mut self, action: PlaybackAction, now: Instant) -> MusicResult<()> {
        self.controller.touch(now);
        match action {
            PlaybackAction::Previous => self.skip(Direction::Reverse, 1).await,
            PlaybackAction::PlayPause => self.toggle_pause().await.map(|_| ()),
            PlaybackAction::Next => self.skip(Direction::Forward, 1).await,
            PlaybackAction::Loop => {
                self.change_loop_mode(LoopChange::CycleNext);
                Ok(())
            }
            PlaybackAction::Stop => self.stop().await,
        }
    }

    /// Apply a scroll button press, redrawing if the page changed.
    pub async fn scroll(&mut self, action: ScrollAction, now: Instant) -> MusicResult<bool> {
        let moved = self.controller.scroll(action, now);
        if moved {
            let view = self.controller.view();
            self.push_view(&view).await?;
        }
        Ok(moved)
    }

    async fn render(&mut self) -> PlayerView {
        let paused = self.playback.is_paused().await;
        let elapsed = self.playback.position().await;
        self.controller.update(&self.session, paused, elapsed);
        self.controller.view()
    }

    /// Recompute the pages and push them to the player message.
    pub async fn refresh_display(&mut self) -> MusicResult<()> {
        let view = self.render().await;
        self.push_view(&view).await
    }

    async fn push_view(&mut self, view: &PlayerView) -> MusicResult<()> {
        let messenger = Arc::clone(&self.messenger);

        if let Some(handle) = self.message {
            match retry_once("Editing player message", self.guild_id, || {
                messenger.edit_message(handle, view)
            })
            .await
            {
                Err(MusicError::StaleReference(reason)) => {
                    info!(
                        "Player message in guild {} is gone ({}), sending a new one",
                        self.guild_id, reason
                    );
                    self.message = None;
                }
                other => return other,
            }
        }

        let channel_id = self.session.control_channel();
        let handle = retry_once("Sending player message", self.guild_id, || {
            messenger.send_message(channel_id, view)
        })
        .await?;
        self.message = Some(handle);
        Ok(())
    }

    /// Delete the player message and disable its controls.
    pub async fn delete_display(&mut self) -> MusicResult<()> {
        self.controller.disable();
        self.retire_at = None;
        let Some(handle) = self.message.take() else {
            return Ok(());
        };
        match self.messenger.delete_message(handle).await {
            Ok(()) | Err(MusicError::StaleReference(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Re-post the player in another channel.
    pub async fn show_in(&mut self, channel_id: ChannelId, now: Instant) -> MusicResult<()> {
        if let Err(err) = self.delete_display().await {
            warn!(
                "Failed to delete old player message in guild {}: {}",
                self.guild_id, err
            );
        }
        self.session.set_control_channel(channel_id);
        self.controller.rearm(now);
        self.refresh_display().await
    }

    fn note_emptiness(&mut self, now: Instant) {
        if self.session.state() == SessionState::Empty {
            self.empty_since.get_or_insert(now);
        } else {
            self.empty_since = None;
        }
    }

    /// Whether nothing has been current for at least `window`.
    pub fn is_empty_for(&mut self, now: Instant, window: Duration) -> bool {
        self.note_emptiness(now);
        self.empty_since
            .is_some_and(|since| now.saturating_duration_since(since) >= window)
    }

    /// One step of the display task.
    ///
    /// Events redraw immediately and re-arm controls that went idle. Interval
    /// ticks keep the elapsed time fresh; once the controls have been idle for
    /// the configured timeout they are disabled, and the message is deleted
    /// after the grace delay.
    pub async fn display_tick(&mut self, now: Instant, trigger: RefreshTrigger) -> MusicResult<()> {
        self.note_emptiness(now);

        match trigger {
            RefreshTrigger::Event => {
                if self.retire_at.take().is_some() || !self.controller.is_enabled() {
                    self.controller.rearm(now);
                }
                self.refresh_display().await
            }
            RefreshTrigger::Interval => {
                if let Some(retire_at) = self.retire_at {
                    if now >= retire_at {
                        info!("Removing idle player message in guild {}", self.guild_id);
                        self.delete_display().await?;
                    }
                    return Ok(());
                }
                if self.message.is_none() || !self.controller.is_enabled() {
                    return Ok(());
                }
                if self.controller.is_idle(now) {
                    debug!("Player controls idle in guild {}, disabling", self.guild_id);
                    self.controller.disable();
                    self.retire_at = Some(now + self.config.delete_grace);
                    let view = self.controller.view();
                    return self.push_view(&view).await;
                }
                self.refresh_display().await
            }
        }
    }

    /// Stop everything and leave voice. Errors are logged.
    pub async fn close(&mut self) {
        self.session.clear();
        self.live = false;
        if let Err(err) = self.playback.stop().await {
            warn!("Failed to stop playback in guild {}: {}", self.guild_id, err);
        }
        if let Err(err) = self.playback.disconnect().await {
            warn!("Failed to leave voice in guild {}: {}", self.guild_id, err);
        }
        if let Err(err) = self.delete_display().await {
            warn!(
                "Failed to delete player message in guild {}: {}",
                self.guild_id, err
            );
        }
        self.publish(SessionEvent::Closed {
            guild_id: self.guild_id,
        });
    }
}

/// Keep the player message in step with the session: redraw on every event and
/// on a fixed interval.
pub fn spawn_display_task(
    player: Arc<Mutex<GuildPlayer>>,
    mut events: broadcast::Receiver<SessionEvent>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let trigger = tokio::select! {
                _ = interval.tick() => RefreshTrigger::Interval,
                event = events.recv() => match event {
                    Ok(SessionEvent::Closed { .. }) | Err(RecvError::Closed) => break,
                    Ok(_) | Err(RecvError::Lagged(_)) => RefreshTrigger::Event,
                },
            };

            let mut player = player.lock().await;
            if let Err(err) = player.display_tick(Instant::now(), trigger).await {
                warn!(
                    "Failed to update player message for guild {}: {}",
                    player.guild_id(),
                    err
                );
            }
        }
        debug!("Display task finished");
    })
}
