//! Per-guild playback state machine.
//!
//! [`PlayerSession`] owns the timeline (history, current track, queue) and the
//! loop/skip policy. It performs no I/O: callers act on what it reports, e.g.
//! starting playback of the new current track after an advance.

use serenity::model::id::{ChannelId, UserId};
use tracing::debug;

use super::music_manager::{MusicError, MusicResult};
use super::queue::{History, Queue};
use super::track::Track;

/// Repeat policy for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum LoopMode {
    #[name = "Off"]
    NoLoop,
    #[name = "Queue"]
    LoopQueue,
    #[name = "Song"]
    LoopSong,
}

impl Default for LoopMode {
    fn default() -> Self {
        LoopMode::NoLoop
    }
}

impl LoopMode {
    const ORDER: [LoopMode; 3] = [LoopMode::NoLoop, LoopMode::LoopQueue, LoopMode::LoopSong];

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|mode| *mode == self)
            .unwrap_or_default()
    }

    /// The mode after this one: off → queue → song → off.
    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            LoopMode::NoLoop => "Loop off",
            LoopMode::LoopQueue => "Looping queue",
            LoopMode::LoopSong => "Looping song",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            LoopMode::NoLoop => "➡️",
            LoopMode::LoopQueue => "🔁",
            LoopMode::LoopSong => "🔂",
        }
    }
}

/// How to change the loop mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopChange {
    Set(LoopMode),
    CycleNext,
}

/// Which way along the timeline to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// Coarse session state, derived from the fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No current track and nothing queued.
    Empty,
    /// No current track, but tracks are queued (after going back past the
    /// first track, for instance).
    Waiting,
    /// A current track is set (it may be waiting to start).
    Playing,
    /// A current track is set but was paused on purpose.
    Stopped,
}

/// What an [`PlayerSession::advance`] did to the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The current track changed (possibly to nothing).
    Moved,
    /// The current track stays and should start again from the top.
    Replayed,
    /// Nothing to move to; the session was left untouched.
    Unchanged,
}

/// What the caller must do to carry out a skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipAction {
    /// Nothing was playing; the timeline already moved. Start the current track, if any.
    StartCurrent,
    /// Stop the current track; its end event finishes the skip.
    StopCurrent,
}

#[derive(Debug, Clone)]
pub struct PlayerSession {
    current: Option<Track>,
    queue: Queue,
    history: History,
    loop_mode: LoopMode,
    skip_count: usize,
    pending_direction: Option<Direction>,
    is_stopped: bool,
    generation: u64,
    owner: UserId,
    control_channel: ChannelId,
}

impl PlayerSession {
    pub fn new(owner: UserId, control_channel: ChannelId) -> Self {
        Self {
            current: None,
            queue: Queue::new(),
            history: History::new(),
            loop_mode: LoopMode::NoLoop,
            skip_count: 1,
            pending_direction: None,
            is_stopped: false,
            generation: 0,
            owner,
            control_channel,
        }
    }

    /// Build a session with a pre-arranged timeline.
    pub fn with_timeline(
        owner: UserId,
        control_channel: ChannelId,
        history: History,
        current: Option<Track>,
        queue: Queue,
    ) -> Self {
        Self {
            current,
            queue,
            history,
            ..Self::new(owner, control_channel)
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn skip_count(&self) -> usize {
        self.skip_count
    }

    pub fn is_stopped(&self) -> bool {
        self.is_stopped
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn control_channel(&self) -> ChannelId {
        self.control_channel
    }

    pub fn set_control_channel(&mut self, channel: ChannelId) {
        self.control_channel = channel;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> SessionState {
        match (&self.current, self.is_stopped) {
            (Some(_), true) => SessionState::Stopped,
            (Some(_), false) => SessionState::Playing,
            (None, _) if self.queue.is_empty() => SessionState::Empty,
            (None, _) => SessionState::Waiting,
        }
    }

    pub fn set_stopped(&mut self, stopped: bool) {
        self.is_stopped = stopped;
    }

    /// Move one step along the timeline.
    ///
    /// Forward pushes the current track onto history and pulls the next one
    /// from the queue; reverse is the mirror image. Song looping keeps the
    /// current track in place, queue looping refills an exhausted queue from
    /// history in play order.
    pub fn advance(&mut self, direction: Direction) -> Advance {
        if self.loop_mode == LoopMode::LoopSong && self.current.is_some() {
            return Advance::Replayed;
        }

        match direction {
            Direction::Forward => self.advance_forward(),
            Direction::Reverse => self.advance_reverse(),
        }
    }

    fn advance_forward(&mut self) -> Advance {
        if self.queue.is_empty() && self.loop_mode == LoopMode::LoopQueue {
            if self.history.is_empty() {
                if self.current.is_some() {
                    return Advance::Replayed;
                }
            } else {
                debug!("Refilling queue from {} played tracks", self.history.len());
                let played: Vec<Track> = self.history.drain().collect();
                self.queue.extend(played);
            }
        }

        if self.current.is_none() && self.queue.is_empty() {
            return Advance::Unchanged;
        }

        if let Some(track) = self.current.take() {
            self.history.push(track);
        }
        self.current = self.queue.pop_front();
        Advance::Moved
    }

    fn advance_reverse(&mut self) -> Advance {
        if self.current.is_none() && self.history.is_empty() {
            return Advance::Unchanged;
        }

        if let Some(track) = self.current.take() {
            self.queue.push_front(track);
        }
        self.current = self.history.pop();
        Advance::Moved
    }

    /// Skip `count` tracks in `direction`.
    ///
    /// With nothing current the timeline moves right away. While a track is
    /// playing the direction is recorded and the track-end event that follows
    /// the stop performs a single advance; any extra steps of a multi-track
    /// skip are taken immediately.
    pub fn skip(&mut self, direction: Direction, count: usize) -> MusicResult<SkipAction> {
        if count < 1 {
            return Err(MusicError::InvalidArgument(
                "skip count must be at least 1".to_string(),
            ));
        }
        self.skip_count = count;

        if self.current.is_none() {
            self.step(direction, count)?;
            return Ok(SkipAction::StartCurrent);
        }

        // All but the last step happen now; the track end performs the last one.
        for _ in 1..count {
            self.advance(direction);
        }
        self.pending_direction = Some(direction);
        Ok(SkipAction::StopCurrent)
    }

    /// Advance `count` times right away, dropping any skip still waiting on
    /// a track end.
    pub fn step(&mut self, direction: Direction, count: usize) -> MusicResult<()> {
        if count < 1 {
            return Err(MusicError::InvalidArgument(
                "skip count must be at least 1".to_string(),
            ));
        }
        self.pending_direction = None;
        for _ in 0..count {
            self.advance(direction);
        }
        self.skip_count = 1;
        Ok(())
    }

    /// Claim a new playback generation for the current track.
    ///
    /// Track-end events carry the generation they were registered under, so
    /// events from tracks that were already replaced can be told apart.
    pub fn begin_playback(&mut self) -> u64 {
        self.generation += 1;
        self.is_stopped = false;
        self.generation
    }

    /// Invalidate outstanding track-end events without starting anything.
    pub fn invalidate_playback(&mut self) {
        self.generation += 1;
    }

    /// Consume a track-end event. Returns the direction advanced in, or
    /// `None` when the event is stale and was ignored.
    pub fn on_track_end(&mut self, generation: u64) -> Option<Direction> {
        if generation != self.generation {
            debug!(
                "Ignoring stale track end (event generation {}, session generation {})",
                generation, self.generation
            );
            return None;
        }

        // The event for this generation is spent; a repeat delivery must not advance again.
        self.generation += 1;
        let direction = self.pending_direction.take().unwrap_or_default();
        self.skip_count = 1;
        self.advance(direction);
        Some(direction)
    }

    pub fn change_loop_mode(&mut self, change: LoopChange) -> LoopMode {
        self.loop_mode = match change {
            LoopChange::Set(mode) => mode,
            LoopChange::CycleNext => self.loop_mode.next(),
        };
        self.loop_mode
    }

    pub fn enqueue<I: IntoIterator<Item = Track>>(&mut self, tracks: I) {
        self.queue.extend(tracks);
    }

    /// Queue tracks so they play right after the current one.
    pub fn enqueue_next(&mut self, tracks: Vec<Track>) {
        self.queue.extend_front(tracks);
    }

    pub fn remove_from_queue(&mut self, index: usize) -> MusicResult<Track> {
        self.queue.remove(index)
    }

    pub fn shuffle_queue<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.queue.shuffle(rng);
    }

    /// Drop the whole timeline and any outstanding track-end events.
    pub fn clear(&mut self) {
        self.current = None;
        self.queue.clear();
        self.history.clear();
        self.pending_direction = None;
        self.skip_count = 1;
        self.is_stopped = false;
        self.invalidate_playback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::time::Duration;

    fn track(id: &str) -> Track {
        Track::new(id, format!("Title {}", id), Duration::from_secs(120))
    }

    fn session(history: &[&str], current: Option<&str>, queue: &[&str]) -> PlayerSession {
        PlayerSession::with_timeline(
            UserId::new(1),
            ChannelId::new(2),
            history.iter().map(|id| track(id)).collect(),
            current.map(track),
            queue.iter().map(|id| track(id)).collect(),
        )
    }

    /// (history, current, queue) as ids.
    fn timeline(session: &PlayerSession) -> (Vec<String>, Option<String>, Vec<String>) {
        (
            session.history().iter().map(|t| t.id.clone()).collect(),
            session.current_track().map(|t| t.id.clone()),
            session.queue().iter().map(|t| t.id.clone()).collect(),
        )
    }

    #[test]
    fn loop_mode_cycles_back_to_off_after_three_steps() {
        let mut mode = LoopMode::NoLoop;
        for _ in 0..3 {
            mode = mode.next();
        }
        assert_eq!(mode, LoopMode::NoLoop);
        assert_eq!(LoopMode::NoLoop.next(), LoopMode::LoopQueue);
        assert_eq!(LoopMode::LoopQueue.next(), LoopMode::LoopSong);
        assert_eq!(LoopMode::NoLoop.prev(), LoopMode::LoopSong);
    }

    #[rstest]
    #[case(LoopMode::NoLoop)]
    #[case(LoopMode::LoopQueue)]
    #[case(LoopMode::LoopSong)]
    fn prev_undoes_next(#[case] mode: LoopMode) {
        assert_eq!(mode.next().prev(), mode);
    }

    #[test]
    fn change_loop_mode_sets_or_cycles() {
        let mut s = session(&[], None, &[]);
        assert_eq!(s.change_loop_mode(LoopChange::CycleNext), LoopMode::LoopQueue);
        assert_eq!(s.change_loop_mode(LoopChange::Set(LoopMode::LoopSong)), LoopMode::LoopSong);
        assert_eq!(s.change_loop_mode(LoopChange::CycleNext), LoopMode::NoLoop);
    }

    #[test]
    fn forward_moves_current_to_history() {
        let mut s = session(&["a"], Some("b"), &["c", "d"]);
        assert_eq!(s.advance(Direction::Forward), Advance::Moved);
        assert_eq!(
            timeline(&s),
            (vec!["a".into(), "b".into()], Some("c".into()), vec!["d".into()])
        );
    }

    #[test]
    fn forward_off_the_end_leaves_nothing_current() {
        let mut s = session(&[], Some("a"), &[]);
        assert_eq!(s.advance(Direction::Forward), Advance::Moved);
        assert_eq!(timeline(&s), (vec!["a".into()], None, vec![]));
        assert_eq!(s.state(), SessionState::Empty);
    }

    #[test]
    fn reverse_moves_current_to_queue_front() {
        let mut s = session(&["a", "b"], Some("c"), &["d"]);
        assert_eq!(s.advance(Direction::Reverse), Advance::Moved);
        assert_eq!(
            timeline(&s),
            (vec!["a".into()], Some("b".into()), vec!["c".into(), "d".into()])
        );
    }

    #[test]
    fn advance_on_empty_session_is_a_no_op() {
        let mut s = session(&[], None, &[]);
        assert_eq!(s.advance(Direction::Forward), Advance::Unchanged);
        assert_eq!(s.advance(Direction::Reverse), Advance::Unchanged);
        assert_eq!(s.state(), SessionState::Empty);
    }

    #[rstest]
    #[case(&[], "x", &[])]
    #[case(&["a"], "x", &[])]
    #[case(&[], "x", &["b"])]
    #[case(&["a", "b", "c"], "x", &["d", "e"])]
    fn forward_then_reverse_round_trips(
        #[case] history: &[&str],
        #[case] current: &str,
        #[case] queue: &[&str],
    ) {
        let mut s = session(history, Some(current), queue);
        let before = timeline(&s);
        s.advance(Direction::Forward);
        s.advance(Direction::Reverse);
        assert_eq!(timeline(&s), before);
    }

    #[test]
    fn loop_song_replays_in_both_directions() {
        let mut s = session(&["a"], Some("b"), &["c"]);
        s.change_loop_mode(LoopChange::Set(LoopMode::LoopSong));
        let before = timeline(&s);

        assert_eq!(s.advance(Direction::Forward), Advance::Replayed);
        assert_eq!(s.advance(Direction::Reverse), Advance::Replayed);
        assert_eq!(timeline(&s), before);
    }

    #[test]
    fn loop_song_without_current_pulls_from_queue() {
        let mut s = session(&[], None, &["c"]);
        s.change_loop_mode(LoopChange::Set(LoopMode::LoopSong));
        assert_eq!(s.advance(Direction::Forward), Advance::Moved);
        assert_eq!(s.current_track().map(|t| t.id.as_str()), Some("c"));
    }

    #[test]
    fn loop_queue_refills_from_history_in_play_order() {
        let mut s = session(&["p", "q", "r"], Some("s"), &[]);
        s.change_loop_mode(LoopChange::Set(LoopMode::LoopQueue));

        assert_eq!(s.advance(Direction::Forward), Advance::Moved);
        assert_eq!(
            timeline(&s),
            (vec!["s".into()], Some("p".into()), vec!["q".into(), "r".into()])
        );
    }

    #[test]
    fn loop_queue_with_a_single_track_replays_it() {
        let mut s = session(&[], Some("solo"), &[]);
        s.change_loop_mode(LoopChange::Set(LoopMode::LoopQueue));
        assert_eq!(s.advance(Direction::Forward), Advance::Replayed);
        assert_eq!(s.current_track().map(|t| t.id.as_str()), Some("solo"));
    }

    #[test]
    fn skip_rejects_zero_count() {
        let mut s = session(&[], Some("a"), &["b"]);
        assert_matches!(
            s.skip(Direction::Forward, 0),
            Err(MusicError::InvalidArgument(_))
        );
    }

    #[test]
    fn forward_skip_with_nothing_current_never_reads_history() {
        let mut s = session(&["x"], None, &[]);
        assert_eq!(s.skip_count(), 1);
        assert_eq!(s.skip(Direction::Forward, 1).unwrap(), SkipAction::StartCurrent);
        assert_eq!(timeline(&s), (vec!["x".into()], None, vec![]));
    }

    #[test]
    fn skip_with_nothing_current_advances_count_times() {
        let mut s = session(&[], None, &["a", "b", "c", "d"]);
        assert_eq!(s.skip(Direction::Forward, 3).unwrap(), SkipAction::StartCurrent);
        assert_eq!(
            timeline(&s),
            (vec!["a".into(), "b".into()], Some("c".into()), vec!["d".into()])
        );
    }

    #[test]
    fn skip_while_playing_defers_to_track_end() {
        let mut s = session(&["a"], Some("b"), &["c"]);
        let generation = s.begin_playback();

        assert_eq!(s.skip(Direction::Reverse, 1).unwrap(), SkipAction::StopCurrent);
        // Nothing moves until the stopped track reports its end.
        assert_eq!(s.current_track().map(|t| t.id.as_str()), Some("b"));

        assert_eq!(s.on_track_end(generation), Some(Direction::Reverse));
        assert_eq!(
            timeline(&s),
            (vec![], Some("a".into()), vec!["b".into(), "c".into()])
        );
    }

    #[test]
    fn multi_skip_while_playing_lands_count_tracks_ahead() {
        let mut s = session(&[], Some("a"), &["b", "c", "d"]);
        let generation = s.begin_playback();

        assert_eq!(s.skip(Direction::Forward, 3).unwrap(), SkipAction::StopCurrent);
        assert_eq!(s.on_track_end(generation), Some(Direction::Forward));
        assert_eq!(
            timeline(&s),
            (vec!["a".into(), "b".into(), "c".into()], Some("d".into()), vec![])
        );
    }

    #[test]
    fn duplicate_track_end_advances_once() {
        let mut s = session(&[], Some("a"), &["b", "c"]);
        let generation = s.begin_playback();

        assert_eq!(s.on_track_end(generation), Some(Direction::Forward));
        assert_eq!(s.on_track_end(generation), None);
        assert_eq!(s.current_track().map(|t| t.id.as_str()), Some("b"));
    }

    #[test]
    fn track_end_from_replaced_track_is_ignored() {
        let mut s = session(&[], Some("a"), &["b"]);
        let old = s.begin_playback();
        let _new = s.begin_playback();
        assert_eq!(s.on_track_end(old), None);
        assert_eq!(s.current_track().map(|t| t.id.as_str()), Some("a"));
    }

    #[test]
    fn stopped_state_requires_a_current_track() {
        let mut s = session(&[], Some("a"), &[]);
        s.set_stopped(true);
        assert_eq!(s.state(), SessionState::Stopped);
        s.begin_playback();
        assert_eq!(s.state(), SessionState::Playing);

        s.clear();
        s.set_stopped(true);
        assert_eq!(s.state(), SessionState::Empty);
    }

    #[test]
    fn nothing_current_with_a_queue_is_waiting_not_empty() {
        let mut s = session(&[], Some("a"), &["b"]);
        s.advance(Direction::Reverse);

        assert_eq!(s.current_track(), None);
        assert_eq!(s.queue().len(), 2);
        assert_eq!(s.state(), SessionState::Waiting);

        s.clear();
        assert_eq!(s.state(), SessionState::Empty);
    }

    #[test]
    fn step_moves_now_and_cancels_a_pending_skip() {
        let mut s = session(&["z"], Some("a"), &["b", "c"]);
        assert_eq!(s.skip(Direction::Reverse, 1).unwrap(), SkipAction::StopCurrent);

        s.step(Direction::Forward, 2).unwrap();
        assert_eq!(s.current_track().map(|t| t.id.as_str()), Some("c"));

        // The reverse skip was dropped, so the next end moves forward.
        let generation = s.begin_playback();
        assert_eq!(s.on_track_end(generation), Some(Direction::Forward));
        assert_eq!(s.current_track(), None);
        assert_matches!(s.step(Direction::Reverse, 0), Err(MusicError::InvalidArgument(_)));
    }

    #[test]
    fn enqueue_next_goes_ahead_of_queue() {
        let mut s = session(&[], Some("a"), &["z"]);
        s.enqueue_next(vec![track("b"), track("c")]);
        s.enqueue([track("d")]);
        assert_eq!(
            timeline(&s).2,
            vec!["b".to_string(), "c".into(), "z".into(), "d".into()]
        );
    }
}
