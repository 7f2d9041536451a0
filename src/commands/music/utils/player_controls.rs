use super::session::{LoopMode, PlayerSession};

/// A playback button on the player message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackAction {
    Previous,
    PlayPause,
    Next,
    Loop,
    Stop,
}

/// Playback half of the player controller: mirrors what the session allows.
#[derive(Debug, Clone, Default)]
pub struct PlaybackControls {
    paused: bool,
    loop_mode: LoopMode,
    has_current: bool,
    has_previous: bool,
    has_next: bool,
    disabled: bool,
}

impl PlaybackControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh button availability from the session.
    pub fn sync(&mut self, session: &PlayerSession, paused: bool) {
        self.paused = paused;
        self.loop_mode = session.loop_mode();
        self.has_current = session.current_track().is_some();
        self.has_previous = !session.history().is_empty();
        self.has_next = self.has_current || !session.queue().is_empty();
    }

    pub fn is_disabled(&self, action: PlaybackAction) -> bool {
        if self.disabled {
            return true;
        }
        match action {
            PlaybackAction::Previous => !self.has_previous,
            PlaybackAction::PlayPause => !self.has_current,
            PlaybackAction::Next => !self.has_next,
            PlaybackAction::Loop => false,
            PlaybackAction::Stop => !self.has_current && !self.has_next,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::music::utils::track::Track;
    use serenity::model::id::{ChannelId, UserId};
    use std::time::Duration;

    fn track(id: &str) -> Track {
        Track::new(id, id, Duration::from_secs(10))
    }

    #[test]
    fn empty_session_only_allows_loop() {
        let session = PlayerSession::new(UserId::new(1), ChannelId::new(1));
        let mut controls = PlaybackControls::new();
        controls.sync(&session, false);

        assert!(controls.is_disabled(PlaybackAction::Previous));
        assert!(controls.is_disabled(PlaybackAction::PlayPause));
        assert!(controls.is_disabled(PlaybackAction::Next));
        assert!(controls.is_disabled(PlaybackAction::Stop));
        assert!(!controls.is_disabled(PlaybackAction::Loop));
    }

    #[test]
    fn playing_session_enables_transport() {
        let session = PlayerSession::with_timeline(
            UserId::new(1),
            ChannelId::new(1),
            [track("a")].into_iter().collect(),
            Some(track("b")),
            Default::default(),
        );
        let mut controls = PlaybackControls::new();
        controls.sync(&session, true);

        assert!(controls.is_paused());
        assert!(!controls.is_disabled(PlaybackAction::Previous));
        assert!(!controls.is_disabled(PlaybackAction::PlayPause));
        assert!(!controls.is_disabled(PlaybackAction::Next));

        controls.disable();
        assert!(controls.is_disabled(PlaybackAction::Loop));
    }
}
