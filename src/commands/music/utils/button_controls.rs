use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, ReactionType};

use super::controller::{ButtonView, PlayerButton, PlayerView};
use super::player_controls::PlaybackAction;
use super::scroller::ScrollAction;

/// Emoji, label and style for a button in the given view.
fn appearance(button: PlayerButton, view: &PlayerView) -> (String, Option<&'static str>, ButtonStyle) {
    match button {
        PlayerButton::Playback(PlaybackAction::Previous) => {
            ("⏮️".into(), None, ButtonStyle::Secondary)
        }
        PlayerButton::Playback(PlaybackAction::PlayPause) => {
            if view.paused {
                ("▶️".into(), Some("Play"), ButtonStyle::Success)
            } else {
                ("⏸️".into(), Some("Pause"), ButtonStyle::Primary)
            }
        }
        PlayerButton::Playback(PlaybackAction::Next) => ("⏭️".into(), None, ButtonStyle::Secondary),
        PlayerButton::Playback(PlaybackAction::Loop) => (
            view.loop_mode.emoji().into(),
            Some(view.loop_mode.label()),
            ButtonStyle::Secondary,
        ),
        PlayerButton::Playback(PlaybackAction::Stop) => ("⏹️".into(), None, ButtonStyle::Danger),
        PlayerButton::Scroll(ScrollAction::First) => ("⏫".into(), None, ButtonStyle::Secondary),
        PlayerButton::Scroll(ScrollAction::Prev) => ("🔼".into(), None, ButtonStyle::Secondary),
        PlayerButton::Scroll(ScrollAction::Home) => ("🏠".into(), None, ButtonStyle::Primary),
        PlayerButton::Scroll(ScrollAction::Next) => ("🔽".into(), None, ButtonStyle::Secondary),
        PlayerButton::Scroll(ScrollAction::Last) => ("⏬".into(), None, ButtonStyle::Secondary),
        PlayerButton::Delete => ("🗑️".into(), Some("Close"), ButtonStyle::Danger),
    }
}

fn create_button(button: &ButtonView, view: &PlayerView) -> CreateButton {
    let (emoji, label, style) = appearance(button.button, view);
    let created = CreateButton::new(button.button.custom_id())
        .emoji(ReactionType::Unicode(emoji))
        .style(style)
        .disabled(button.disabled);
    match label {
        Some(label) => created.label(label),
        None => created,
    }
}

/// Creates the action rows for the player message
pub fn create_player_buttons(view: &PlayerView) -> Vec<CreateActionRow> {
    view.rows
        .iter()
        .map(|row| {
            CreateActionRow::Buttons(row.iter().map(|button| create_button(button, view)).collect())
        })
        .collect()
}
