//! Resolves YouTube links, playlists and searches with the `yt-dlp` command-line tool.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};
use url::Url;

use super::{AudioSource, TrackResolver};
use crate::commands::music::utils::music_manager::{MusicError, MusicResult};
use crate::commands::music::utils::track::Track;

/// What a query asks yt-dlp for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    Video(String),
    Playlist(String),
    Search(String),
}

impl Lookup {
    fn from_query(query: &str) -> Self {
        let query = query.trim();
        if !AudioSource::is_url(query) {
            return Lookup::Search(query.to_string());
        }
        match Url::parse(query) {
            Ok(url) if url.path() == "/playlist" && url.query_pairs().any(|(k, _)| k == "list") => {
                Lookup::Playlist(query.to_string())
            }
            _ => Lookup::Video(query.to_string()),
        }
    }

    fn args(&self) -> Vec<String> {
        match self {
            Lookup::Video(url) => vec!["-j".into(), "--no-playlist".into(), url.clone()],
            Lookup::Playlist(url) => vec!["-j".into(), "--flat-playlist".into(), url.clone()],
            Lookup::Search(terms) => vec![
                "-j".into(),
                "--no-playlist".into(),
                format!("ytsearch1:{}", terms),
            ],
        }
    }
}

/// Build a track from one line of `yt-dlp -j` output.
fn parse_track(json: &Value) -> MusicResult<Track> {
    let url = json["webpage_url"]
        .as_str()
        .or_else(|| json["url"].as_str())
        .map(str::to_string)
        .or_else(|| {
            json["id"]
                .as_str()
                .map(|id| format!("https://www.youtube.com/watch?v={}", id))
        })
        .ok_or_else(|| MusicError::AudioSourceError("yt-dlp returned no URL".to_string()))?;

    let title = json["title"].as_str().unwrap_or("Unknown Title").to_string();
    let duration = json["duration"]
        .as_f64()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
        .unwrap_or_default();

    Ok(Track::new(url, title, duration))
}

/// Parse newline-delimited JSON, one entry per line.
fn parse_output(stdout: &str) -> MusicResult<Vec<Track>> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let json: Value = serde_json::from_str(line).map_err(|e| {
                MusicError::AudioSourceError(format!("Failed to parse video metadata: {}", e))
            })?;
            parse_track(&json)
        })
        .collect()
}

/// Resolver backed by `yt-dlp`. Single-video lookups are cached by URL.
#[derive(Default)]
pub struct YoutubeResolver {
    cache: DashMap<String, Track>,
}

impl YoutubeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    async fn run(&self, lookup: &Lookup) -> MusicResult<Vec<Track>> {
        info!("Running yt-dlp for {:?}", lookup);
        let output = Command::new("yt-dlp")
            .args(lookup.args())
            .output()
            .await
            .map_err(|e| MusicError::AudioSourceError(format!("Failed to run yt-dlp: {}", e)))?;

        if !output.status.success() {
            return Err(MusicError::AudioSourceError(format!(
                "yt-dlp failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

#[async_trait]
impl TrackResolver for YoutubeResolver {
    async fn resolve(&self, query: &str, requested_by: &str) -> MusicResult<Vec<Track>> {
        let lookup = Lookup::from_query(query);

        if let Lookup::Video(url) = &lookup {
            if let Some(track) = self.cache.get(url) {
                debug!("Using cached metadata for {}", url);
                return Ok(vec![track.clone().requested_by(requested_by)]);
            }
        }

        let tracks = self.run(&lookup).await?;
        if tracks.is_empty() {
            return Err(MusicError::NotFound(format!("nothing matched '{}'", query)));
        }

        if let Lookup::Video(url) = &lookup {
            if let Some(track) = tracks.first() {
                self.cache.insert(url.clone(), track.clone());
            }
        }

        Ok(tracks
            .into_iter()
            .map(|track| track.requested_by(requested_by))
            .collect())
    }
}
