use super::*;

/// Show the player and queue in this channel
#[poise::command(slash_command, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let player = active_player(ctx)?;
        player
            .lock()
            .await
            .show_in(ctx.channel_id(), Instant::now())
            .await?;
        Ok(embedded_messages::player_moved())
    }
    .await;

    respond(ctx, reply).await
}
