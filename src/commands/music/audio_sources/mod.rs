//! Turns what a user typed into playable [`Track`]s.

/// yt-dlp backed resolver for YouTube links, playlists and searches.
pub(crate) mod youtube;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use url::Url;

use crate::commands::music::utils::music_manager::MusicResult;
use crate::commands::music::utils::track::Track;

pub use youtube::YoutubeResolver;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait TrackResolver: Send + Sync {
    /// Resolve a URL or free-text search into one or more tracks, tagged with
    /// the requesting user's name.
    async fn resolve(&self, query: &str, requested_by: &str) -> MusicResult<Vec<Track>>;
}

/// A utility struct providing general helper functions related to audio sources.
pub struct AudioSource;

impl AudioSource {
    /// Performs a basic check if the input string can be parsed as a URL.
    /// Does not validate if the URL is actually reachable or supported.
    pub fn is_url(input: &str) -> bool {
        Url::parse(input).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("https://www.youtube.com/watch?v=dQw4w9WgXcQ" => true; "youtube link")]
    #[test_case("never gonna give you up" => false; "search terms")]
    #[test_case("youtube.com/watch" => false; "missing scheme")]
    fn detects_urls(input: &str) -> bool {
        AudioSource::is_url(input)
    }
}
