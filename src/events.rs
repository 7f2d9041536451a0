//! Gateway events the framework forwards to us: player button presses and the
//! bot's own voice state.

use poise::serenity_prelude as serenity;
use serenity::{FullEvent, Interaction, VoiceState};
use tracing::{error, info};

use crate::commands::music::utils::component_handlers;
use crate::commands::music::utils::controller::BUTTON_PREFIX;
use crate::{Data, Error};

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::InteractionCreate {
            interaction: Interaction::Component(component),
        } if component.data.custom_id.starts_with(BUTTON_PREFIX) => {
            if let Err(e) = component_handlers::handle_interaction(ctx, data, component).await {
                error!("Error handling component interaction: {}", e);
            }
        }
        FullEvent::VoiceStateUpdate { new, .. } => {
            voice_state_update(data, framework.bot_id, new).await;
        }
        _ => (),
    }
    Ok(())
}

/// Tear the player down once the bot is no longer in a voice channel, whether
/// it was kicked, moved out, or the call dropped.
async fn voice_state_update(data: &Data, bot_id: serenity::UserId, state: &VoiceState) {
    if state.user_id != bot_id || state.channel_id.is_some() {
        return;
    }
    let Some(guild_id) = state.guild_id else {
        return;
    };
    if data.players.evict(guild_id).await {
        info!("Left voice in guild {}, player closed", guild_id);
    }
}
