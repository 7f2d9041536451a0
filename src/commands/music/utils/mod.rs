use std::time::Duration;

// Export music utilities
pub mod button_controls;
pub mod component_handlers;
pub mod controller;
pub mod embedded_messages;
pub mod event_handlers;
pub mod guild_player;
pub mod messaging;
pub mod music_manager;
pub mod pagination;
pub mod playback;
pub mod player_controls;
pub mod playlist;
pub mod queue;
pub mod scroller;
pub mod session;
pub mod track;

/// Format a duration as `MM:SS`, or `H:MM:SS` once it reaches an hour.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Parse a user-supplied timestamp such as `90`, `1:30` or `1:02:03`.
pub fn parse_timestamp(input: &str) -> Option<Duration> {
    let mut total = 0u64;
    let mut parts = 0;
    for part in input.trim().split(':') {
        parts += 1;
        if parts > 3 || part.is_empty() {
            return None;
        }
        total = total * 60 + part.parse::<u64>().ok()?;
    }
    Some(Duration::from_secs(total))
}
