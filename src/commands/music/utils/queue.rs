//! The two halves of the playback timeline: upcoming tracks and played tracks.

use rand::seq::SliceRandom;
use std::collections::VecDeque;

use super::music_manager::{MusicError, MusicResult};
use super::track::Track;

/// Upcoming tracks, played from the front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Queue {
    tracks: VecDeque<Track>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, track: Track) {
        self.tracks.push_back(track);
    }

    /// Put a track back at the head of the queue (used when stepping backwards).
    pub fn push_front(&mut self, track: Track) {
        self.tracks.push_front(track);
    }

    pub fn pop_front(&mut self) -> Option<Track> {
        self.tracks.pop_front()
    }

    /// Remove the track at `index` (0-based).
    pub fn remove(&mut self, index: usize) -> MusicResult<Track> {
        let len = self.tracks.len();
        self.tracks
            .remove(index)
            .ok_or(MusicError::IndexOutOfRange { index, len })
    }

    pub fn extend<I: IntoIterator<Item = Track>>(&mut self, tracks: I) {
        self.tracks.extend(tracks);
    }

    /// Insert tracks ahead of everything already queued, keeping their order.
    pub fn extend_front(&mut self, tracks: Vec<Track>) {
        for track in tracks.into_iter().rev() {
            self.tracks.push_front(track);
        }
    }

    pub fn shuffle<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.tracks.make_contiguous().shuffle(rng);
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Track> + ExactSizeIterator {
        self.tracks.iter()
    }
}

impl FromIterator<Track> for Queue {
    fn from_iter<I: IntoIterator<Item = Track>>(iter: I) -> Self {
        Self {
            tracks: iter.into_iter().collect(),
        }
    }
}

/// Played tracks, stored oldest first; the most recent track is on top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    tracks: Vec<Track>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Take the most recently played track.
    pub fn pop(&mut self) -> Option<Track> {
        self.tracks.pop()
    }

    /// Empty the history, yielding tracks in the order they were played.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Track> {
        self.tracks.drain(..)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Track> + ExactSizeIterator {
        self.tracks.iter()
    }

    pub fn as_slice(&self) -> &[Track] {
        &self.tracks
    }
}

impl FromIterator<Track> for History {
    fn from_iter<I: IntoIterator<Item = Track>>(iter: I) -> Self {
        Self {
            tracks: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    fn track(id: &str) -> Track {
        Track::new(id, id.to_uppercase(), Duration::from_secs(60))
    }

    fn ids<'a>(tracks: impl Iterator<Item = &'a Track>) -> Vec<&'a str> {
        tracks.map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn queue_is_fifo_with_front_insertion() {
        let mut queue: Queue = ["a", "b"].into_iter().map(track).collect();
        queue.push_front(track("z"));
        queue.push_back(track("c"));

        assert_eq!(ids(queue.iter()), ["z", "a", "b", "c"]);
        assert_eq!(queue.pop_front().map(|t| t.id), Some("z".to_string()));
    }

    #[test]
    fn extend_front_keeps_order() {
        let mut queue: Queue = ["c"].into_iter().map(track).collect();
        queue.extend_front(vec![track("a"), track("b")]);
        assert_eq!(ids(queue.iter()), ["a", "b", "c"]);
    }

    #[test]
    fn remove_out_of_range_reports_length() {
        let mut queue: Queue = ["a"].into_iter().map(track).collect();
        assert_matches!(
            queue.remove(3),
            Err(MusicError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert_eq!(queue.remove(0).unwrap().id, "a");
    }

    #[test]
    fn shuffle_keeps_every_track() {
        let mut queue: Queue = (0..20).map(|i| track(&i.to_string())).collect();
        let mut rng = StdRng::seed_from_u64(7);
        queue.shuffle(&mut rng);

        let mut seen = ids(queue.iter());
        seen.sort_unstable();
        let mut expected: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[test]
    fn history_is_a_stack_that_drains_in_play_order() {
        let mut history = History::new();
        history.push(track("a"));
        history.push(track("b"));
        history.push(track("c"));

        assert_eq!(history.pop().map(|t| t.id), Some("c".to_string()));
        let drained: Vec<_> = history.drain().map(|t| t.id).collect();
        assert_eq!(drained, ["a", "b"]);
        assert!(history.is_empty());
    }
}
