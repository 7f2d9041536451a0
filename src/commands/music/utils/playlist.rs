//! Named, saved track lists and the storage seam they persist through.

use async_trait::async_trait;
use serenity::model::id::GuildId;
use std::collections::HashSet;

#[cfg(test)]
use mockall::automock;

use super::music_manager::{MusicError, MusicResult};
use super::track::Track;

/// An ordered, named collection of tracks. Names are unique per guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    name: String,
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    pub fn with_tracks(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            name: name.into(),
            tracks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track_ids(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|t| t.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Remove the first entry whose id matches `track_id`.
    pub fn remove_track(&mut self, track_id: &str) -> MusicResult<Track> {
        let position = self
            .tracks
            .iter()
            .position(|t| t.id == track_id)
            .ok_or_else(|| {
                MusicError::NotFound(format!("track {} in playlist {}", track_id, self.name))
            })?;
        Ok(self.tracks.remove(position))
    }

    pub fn remove_at(&mut self, index: usize) -> MusicResult<Track> {
        if index >= self.tracks.len() {
            return Err(MusicError::IndexOutOfRange {
                index,
                len: self.tracks.len(),
            });
        }
        Ok(self.tracks.remove(index))
    }

    /// Merge `new_tracks` into the playlist.
    ///
    /// Existing entries come first, then the new ones; only the first
    /// occurrence of each id survives. This is a sync, not an overwrite.
    pub fn replace_all<I: IntoIterator<Item = Track>>(&mut self, new_tracks: I) {
        let mut seen = HashSet::new();
        let merged: Vec<Track> = std::mem::take(&mut self.tracks)
            .into_iter()
            .chain(new_tracks)
            .filter(|track| seen.insert(track.id.clone()))
            .collect();
        self.tracks = merged;
    }
}

/// Persistence for playlists, keyed by guild and name.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Insert or overwrite the playlist with this name.
    async fn save(&self, guild_id: GuildId, playlist: &Playlist) -> MusicResult<()>;

    /// Fails with [`MusicError::NotFound`] when no playlist has this name.
    async fn load(&self, guild_id: GuildId, name: &str) -> MusicResult<Playlist>;

    /// Fails with [`MusicError::NotFound`] when no playlist has this name.
    async fn delete(&self, guild_id: GuildId, name: &str) -> MusicResult<()>;

    /// Names of every playlist saved for the guild, alphabetically.
    async fn list(&self, guild_id: GuildId) -> MusicResult<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn track(id: &str) -> Track {
        Track::new(id, id, Duration::from_secs(30))
    }

    fn playlist(ids: &[&str]) -> Playlist {
        Playlist::with_tracks("mix", ids.iter().map(|id| track(id)).collect())
    }

    fn ids(playlist: &Playlist) -> Vec<&str> {
        playlist.track_ids().collect()
    }

    #[test]
    fn replace_all_merges_and_keeps_first_occurrences() {
        let mut list = playlist(&["a", "b", "a", "c"]);
        list.replace_all(["d", "b", "e", "d"].into_iter().map(track));
        assert_eq!(ids(&list), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn replace_all_with_itself_is_idempotent() {
        let mut list = playlist(&["a", "b", "c"]);
        let snapshot = list.tracks().to_vec();
        list.replace_all(snapshot);
        assert_eq!(ids(&list), ["a", "b", "c"]);

        let again = list.tracks().to_vec();
        list.replace_all(again);
        assert_eq!(ids(&list), ["a", "b", "c"]);
    }

    #[test]
    fn remove_track_takes_first_match() {
        let mut list = playlist(&["a", "b", "a"]);
        list.remove_track("a").unwrap();
        assert_eq!(ids(&list), ["b", "a"]);
    }

    #[test]
    fn remove_missing_track_is_not_found() {
        let mut list = playlist(&["a"]);
        assert_matches!(list.remove_track("zzz"), Err(MusicError::NotFound(_)));
    }

    #[test]
    fn remove_at_checks_bounds() {
        let mut list = playlist(&["a", "b"]);
        assert_matches!(
            list.remove_at(2),
            Err(MusicError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(list.remove_at(0).unwrap().id, "a");
        assert_eq!(ids(&list), ["b"]);
    }

    #[test]
    fn add_track_appends_duplicates() {
        let mut list = Playlist::new("mix");
        list.add_track(track("a"));
        list.add_track(track("a"));
        assert_eq!(list.len(), 2);
    }
}
