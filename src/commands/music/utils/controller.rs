//! The player message controller: playback buttons plus page scrolling.
//!
//! [`PlayerController`] composes a [`PlaybackControls`] and a [`PageScroller`]
//! and delegates to them. It produces a [`PlayerView`], a platform-neutral
//! description of the message that the messaging collaborator renders.

use std::time::Duration;
use tokio::time::Instant;

use super::pagination::paginate;
use super::player_controls::{PlaybackAction, PlaybackControls};
use super::scroller::{PageScroller, ScrollAction};
use super::session::{LoopMode, PlayerSession};

/// Prefix shared by every player button id; the interaction router keys on it.
pub const BUTTON_PREFIX: &str = "music_";

/// Every button the player message can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerButton {
    Playback(PlaybackAction),
    Scroll(ScrollAction),
    Delete,
}

impl PlayerButton {
    const ALL: [PlayerButton; 11] = [
        PlayerButton::Playback(PlaybackAction::Previous),
        PlayerButton::Playback(PlaybackAction::PlayPause),
        PlayerButton::Playback(PlaybackAction::Next),
        PlayerButton::Playback(PlaybackAction::Loop),
        PlayerButton::Playback(PlaybackAction::Stop),
        PlayerButton::Scroll(ScrollAction::First),
        PlayerButton::Scroll(ScrollAction::Prev),
        PlayerButton::Scroll(ScrollAction::Home),
        PlayerButton::Scroll(ScrollAction::Next),
        PlayerButton::Scroll(ScrollAction::Last),
        PlayerButton::Delete,
    ];

    pub fn custom_id(self) -> &'static str {
        match self {
            PlayerButton::Playback(PlaybackAction::Previous) => "music_previous",
            PlayerButton::Playback(PlaybackAction::PlayPause) => "music_play_pause",
            PlayerButton::Playback(PlaybackAction::Next) => "music_next",
            PlayerButton::Playback(PlaybackAction::Loop) => "music_loop",
            PlayerButton::Playback(PlaybackAction::Stop) => "music_stop",
            PlayerButton::Scroll(ScrollAction::First) => "music_page_first",
            PlayerButton::Scroll(ScrollAction::Prev) => "music_page_prev",
            PlayerButton::Scroll(ScrollAction::Home) => "music_page_home",
            PlayerButton::Scroll(ScrollAction::Next) => "music_page_next",
            PlayerButton::Scroll(ScrollAction::Last) => "music_page_last",
            PlayerButton::Delete => "music_delete",
        }
    }

    pub fn from_custom_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|button| button.custom_id() == id)
    }
}

/// One button as it should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonView {
    pub button: PlayerButton,
    pub disabled: bool,
}

/// Everything needed to draw the player message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    pub page: String,
    pub paused: bool,
    pub loop_mode: LoopMode,
    pub rows: Vec<Vec<ButtonView>>,
}

#[derive(Debug, Clone)]
pub struct PlayerController {
    controls: PlaybackControls,
    scroller: PageScroller,
}

impl PlayerController {
    pub fn new(idle_timeout: Duration, now: Instant) -> Self {
        Self {
            controls: PlaybackControls::new(),
            scroller: PageScroller::new(idle_timeout, now),
        }
    }

    pub fn controls(&self) -> &PlaybackControls {
        &self.controls
    }

    pub fn scroller(&self) -> &PageScroller {
        &self.scroller
    }

    /// Re-derive buttons and pages from the session.
    pub fn update(&mut self, session: &PlayerSession, paused: bool, elapsed: Option<Duration>) {
        self.controls.sync(session, paused);
        self.scroller.set_pages(paginate(session, elapsed));
    }

    pub fn scroll(&mut self, action: ScrollAction, now: Instant) -> bool {
        self.scroller.scroll(action, now)
    }

    /// Playback button presses count as activity for the idle timeout.
    pub fn touch(&mut self, now: Instant) {
        self.scroller.touch(now);
    }

    pub fn is_idle(&self, now: Instant) -> bool {
        self.scroller.is_idle(now)
    }

    pub fn is_enabled(&self) -> bool {
        self.scroller.is_enabled()
    }

    pub fn disable(&mut self) {
        self.controls.disable();
        self.scroller.disable();
    }

    pub fn rearm(&mut self, now: Instant) {
        self.controls.enable();
        self.scroller.rearm(now);
    }

    fn is_disabled(&self, button: PlayerButton) -> bool {
        match button {
            PlayerButton::Playback(action) => self.controls.is_disabled(action),
            PlayerButton::Scroll(action) => self.scroller.is_disabled(action),
            PlayerButton::Delete => !self.scroller.is_enabled(),
        }
    }

    pub fn view(&self) -> PlayerView {
        let row = |buttons: &[PlayerButton]| {
            buttons
                .iter()
                .map(|&button| ButtonView {
                    button,
                    disabled: self.is_disabled(button),
                })
                .collect::<Vec<_>>()
        };

        let mut rows = vec![row(&PlayerButton::ALL[0..5])];
        if self.scroller.page_count() > 1 {
            rows.push(row(&PlayerButton::ALL[5..10]));
        }
        rows.push(row(&PlayerButton::ALL[10..]));

        PlayerView {
            page: self.scroller.current_page().to_string(),
            paused: self.controls.is_paused(),
            loop_mode: self.controls.loop_mode(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::music::utils::track::Track;
    use serenity::model::id::{ChannelId, UserId};

    fn session_with_queue(len: usize) -> PlayerSession {
        PlayerSession::with_timeline(
            UserId::new(1),
            ChannelId::new(1),
            Default::default(),
            Some(Track::new("now", "Now", Duration::from_secs(60))),
            (0..len)
                .map(|i| Track::new(i.to_string(), format!("Song {}", i), Duration::from_secs(60)))
                .collect(),
        )
    }

    fn button(view: &PlayerView, target: PlayerButton) -> Option<ButtonView> {
        view.rows.iter().flatten().copied().find(|b| b.button == target)
    }

    #[test]
    fn custom_ids_round_trip_and_share_prefix() {
        for button in PlayerButton::ALL {
            assert!(button.custom_id().starts_with(BUTTON_PREFIX));
            assert_eq!(PlayerButton::from_custom_id(button.custom_id()), Some(button));
        }
        assert_eq!(PlayerButton::from_custom_id("music_unknown"), None);
    }

    #[test]
    fn scroll_row_only_appears_with_multiple_pages() {
        let now = Instant::now();
        let mut controller = PlayerController::new(Duration::from_secs(60), now);

        controller.update(&session_with_queue(3), false, None);
        assert_eq!(controller.view().rows.len(), 2);

        controller.update(&session_with_queue(30), false, None);
        let view = controller.view();
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.rows[1].len(), 5);
    }

    #[test]
    fn delegates_scrolling_and_reports_edge_buttons() {
        let now = Instant::now();
        let mut controller = PlayerController::new(Duration::from_secs(60), now);
        controller.update(&session_with_queue(30), false, None);

        assert!(controller.scroll(ScrollAction::Last, now));
        assert!(!controller.scroll(ScrollAction::Next, now));

        let view = controller.view();
        let next = button(&view, PlayerButton::Scroll(ScrollAction::Next)).unwrap();
        let last = button(&view, PlayerButton::Scroll(ScrollAction::Last)).unwrap();
        let home = button(&view, PlayerButton::Scroll(ScrollAction::Home)).unwrap();
        assert!(next.disabled && last.disabled);
        assert!(!home.disabled);
        assert!(view.page.contains("Page 4 / 4"));
    }

    #[test]
    fn disabling_greys_out_every_button() {
        let now = Instant::now();
        let mut controller = PlayerController::new(Duration::from_secs(60), now);
        controller.update(&session_with_queue(30), false, None);
        controller.disable();

        let view = controller.view();
        assert!(view.rows.iter().flatten().all(|b| b.disabled));

        controller.rearm(now);
        assert!(controller.is_enabled());
        assert!(!button(&controller.view(), PlayerButton::Delete).unwrap().disabled);
    }
}
