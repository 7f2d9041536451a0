//! The `Track` type: one playable item as seen by the queue engine.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// A playable media item.
///
/// `id` is the source URL handed to the audio backend; two tracks are the
/// same track when their ids match, regardless of title or requester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    /// Display name of the user who queued the track.
    #[serde(default)]
    pub requested_by: Option<String>,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>, duration: Duration) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration,
            requested_by: None,
        }
    }

    pub fn requested_by(mut self, name: impl Into<String>) -> Self {
        self.requested_by = Some(name.into());
        self
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identity_is_by_id() {
        let a = Track::new("yt:1", "Song", Duration::from_secs(100));
        let b = Track::new("yt:1", "Song (Remastered)", Duration::from_secs(101)).requested_by("bob");
        let c = Track::new("yt:2", "Song", Duration::from_secs(100));

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serializes_duration_as_humantime() {
        let track = Track::new("yt:1", "Song", Duration::from_secs(225));
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["duration"], "3m 45s");

        let back: Track = serde_json::from_value(json).unwrap();
        assert_eq!(back.duration, Duration::from_secs(225));
        assert_eq!(back.requested_by, None);
    }
}
