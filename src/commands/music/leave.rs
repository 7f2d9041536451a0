use super::*;

/// Leave the voice channel and discard the player
#[poise::command(slash_command, category = "Music")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let guild_id = guild_id(ctx)?;
        if !ctx.data().players.evict(guild_id).await {
            return Err(MusicError::NotConnected);
        }
        Ok(embedded_messages::left_voice_channel())
    }
    .await;

    respond(ctx, reply).await
}
