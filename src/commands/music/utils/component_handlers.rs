//! Routes presses on the player message's buttons to the guild's player.

use poise::serenity_prelude as serenity;
use serenity::{ComponentInteraction, Context, CreateInteractionResponseFollowup};
use tokio::time::Instant;
use tracing::{debug, error, warn};

use super::controller::PlayerButton;
use super::embedded_messages;
use super::music_manager::{MusicError, MusicResult};
use crate::Data;

type ButtonInteractionResult = Result<(), serenity::Error>;

/// Handle a button interaction on a player message.
pub async fn handle_interaction(
    ctx: &Context,
    data: &Data,
    interaction: &ComponentInteraction,
) -> ButtonInteractionResult {
    let Some(button) = PlayerButton::from_custom_id(&interaction.data.custom_id) else {
        error!("Unknown button ID: {}", interaction.data.custom_id);
        return Ok(());
    };

    // Acknowledge first, the player lock may be held by a slow command
    interaction.defer(&ctx.http).await?;

    if let Err(err) = apply(data, interaction, button).await {
        warn!(
            "Button {:?} failed in guild {:?}: {}",
            button, interaction.guild_id, err
        );
        error_followup(ctx, interaction, &err).await?;
    }
    Ok(())
}

async fn apply(
    data: &Data,
    interaction: &ComponentInteraction,
    button: PlayerButton,
) -> MusicResult<()> {
    let guild_id = interaction.guild_id.ok_or(MusicError::NotInGuild)?;
    let player = data.players.get(guild_id).ok_or(MusicError::NotConnected)?;
    let mut player = player.lock().await;
    let now = Instant::now();

    debug!("Guild {}: {:?} pressed by {}", guild_id, button, interaction.user.id);
    match button {
        PlayerButton::Playback(action) => player.press(action, now).await,
        PlayerButton::Scroll(action) => player.scroll(action, now).await.map(|_| ()),
        PlayerButton::Delete => {
            if interaction.user.id != player.owner() {
                return Err(MusicError::NotOwner);
            }
            player.delete_display().await
        }
    }
}

async fn error_followup(
    ctx: &Context,
    interaction: &ComponentInteraction,
    err: &MusicError,
) -> ButtonInteractionResult {
    interaction
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new()
                .embed(embedded_messages::error_embed(err))
                .ephemeral(true),
        )
        .await?;
    Ok(())
}
