use poise::{CreateReply, serenity_prelude as serenity};
use serenity::all::CreateEmbed;
use std::time::Duration;

use super::controller::PlayerView;
use super::format_duration;
use super::music_manager::MusicError;
use super::playlist::Playlist;
use super::session::{Direction, LoopMode};
use super::track::Track;

const SUCCESS: u32 = 0x00ff00;
const FAILURE: u32 = 0xff0000;

/// Embed descriptions cap out at 4096 characters.
const PLAYLIST_LISTING: usize = 25;

fn track_link(track: &Track) -> String {
    format!("[{}]({})", track.title, track.id)
}

/// The persistent player message.
pub fn player(view: &PlayerView) -> CreateEmbed {
    let title = if view.paused {
        "⏸️ Music Player (paused)"
    } else {
        "🎵 Music Player"
    };

    CreateEmbed::new()
        .title(title)
        .description(&view.page)
        .field(
            "Loop",
            format!("{} {}", view.loop_mode.emoji(), view.loop_mode.label()),
            true,
        )
        .color(SUCCESS)
}

fn success(title: &str, description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title(title)
            .description(description)
            .color(SUCCESS),
    )
}

/// Red embed describing a failed music operation.
pub fn error_embed(err: &MusicError) -> CreateEmbed {
    let description = match err {
        MusicError::UserNotInVoiceChannel => "You need to be in a voice channel".to_string(),
        MusicError::NothingPlaying => "No track is currently playing".to_string(),
        MusicError::IndexOutOfRange { len, .. } => {
            format!("Invalid position. The queue has {} tracks", len)
        }
        MusicError::NotOwner => "Only the person who started the player can do that".to_string(),
        other => other.to_string(),
    };
    CreateEmbed::new()
        .title("❌ Error")
        .description(description)
        .color(FAILURE)
}

/// User-facing reply for a failed music operation.
pub fn error(err: &MusicError) -> CreateReply {
    CreateReply::default().embed(error_embed(err)).ephemeral(true)
}

fn queue_position(position: usize) -> String {
    match position {
        0 => "Now playing".to_string(),
        n => format!("#{}", n),
    }
}

/// Create an embed for when tracks are added to the queue
pub fn added_to_queue(tracks: &[Track], position: usize) -> CreateReply {
    let position = queue_position(position);
    let embed = match tracks {
        [track] => CreateEmbed::new()
            .title("🎵 Added to Queue")
            .description(track_link(track))
            .field("Duration", format!("`{}`", format_duration(track.duration)), true)
            .field("Position", format!("`{}`", position), true),
        _ => {
            let total: Duration = tracks.iter().map(|track| track.duration).sum();
            CreateEmbed::new()
                .title("🎵 Added to Queue")
                .description(format!("Queued {} tracks", tracks.len()))
                .field("Duration", format!("`{}`", format_duration(total)), true)
                .field("Starting at", format!("`{}`", position), true)
        }
    };
    CreateReply::default().embed(embed.color(SUCCESS))
}

pub fn paused(track: &Track) -> CreateReply {
    success("⏸️ Paused", format!("Paused {}", track_link(track)))
}

pub fn resumed(track: &Track) -> CreateReply {
    success("▶️ Resumed", format!("Resumed {}", track_link(track)))
}

pub fn skipped(direction: Direction, count: usize) -> CreateReply {
    let (title, verb) = match direction {
        Direction::Forward => ("⏭️ Skipped", "Skipped"),
        Direction::Reverse => ("⏮️ Went Back", "Went back"),
    };
    let noun = if count == 1 { "track" } else { "tracks" };
    success(title, format!("{} {} {}", verb, count, noun))
}

pub fn loop_mode(mode: LoopMode) -> CreateReply {
    success(
        &format!("{} Loop", mode.emoji()),
        format!("Loop mode set to **{}**", mode.label()),
    )
}

pub fn shuffled(queue_len: usize) -> CreateReply {
    success("🔀 Shuffled", format!("Shuffled {} queued tracks", queue_len))
}

pub fn seeked(position: Duration) -> CreateReply {
    success("⏩ Seeked", format!("Jumped to `{}`", format_duration(position)))
}

pub fn track_removed(track: &Track, position: usize) -> CreateReply {
    success(
        "🗑️ Track Removed",
        format!("Removed {} from position #{}", track_link(track), position),
    )
}

pub fn stopped() -> CreateReply {
    success("⏹️ Stopped", "Playback stopped and queue cleared")
}

pub fn left_voice_channel() -> CreateReply {
    success(
        "👋 Left Voice Channel",
        "Successfully disconnected and cleared the queue",
    )
}

pub fn player_moved() -> CreateReply {
    CreateReply::default()
        .content("Player moved to this channel")
        .ephemeral(true)
}

pub fn playlist_saved(playlist: &Playlist) -> CreateReply {
    success(
        "💾 Playlist Saved",
        format!(
            "**{}** now has {} tracks",
            playlist.name(),
            playlist.len()
        ),
    )
}

pub fn playlist_deleted(name: &str) -> CreateReply {
    success("🗑️ Playlist Deleted", format!("Deleted **{}**", name))
}

pub fn playlist_loaded(playlist: &Playlist, position: usize) -> CreateReply {
    success(
        "📂 Playlist Loaded",
        format!(
            "Queued {} tracks from **{}** starting at `{}`",
            playlist.len(),
            playlist.name(),
            queue_position(position)
        ),
    )
}

/// Track listing for a saved playlist.
pub fn playlist(playlist: &Playlist) -> CreateReply {
    let mut description = String::new();
    if playlist.is_empty() {
        description.push_str("**📭 Playlist is empty**");
    }
    for (index, track) in playlist.tracks().iter().enumerate().take(PLAYLIST_LISTING) {
        description.push_str(&format!(
            "`{:>3}.` {} `{}`\n",
            index + 1,
            track_link(track),
            format_duration(track.duration)
        ));
    }
    if playlist.len() > PLAYLIST_LISTING {
        description.push_str(&format!("…and {} more", playlist.len() - PLAYLIST_LISTING));
    }

    let total: Duration = playlist.tracks().iter().map(|track| track.duration).sum();
    CreateReply::default().embed(
        CreateEmbed::new()
            .title(format!("📋 {}", playlist.name()))
            .description(description)
            .field("Total Duration", format!("`{}`", format_duration(total)), true)
            .color(SUCCESS),
    )
}

pub fn playlists(names: &[String]) -> CreateReply {
    let description = if names.is_empty() {
        "No playlists saved in this server".to_string()
    } else {
        names
            .iter()
            .map(|name| format!("• {}", name))
            .collect::<Vec<_>>()
            .join("\n")
    };
    success("📚 Playlists", description)
}
