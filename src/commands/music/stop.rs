use super::*;

/// Stop the music and clear the queue
#[poise::command(slash_command, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let player = active_player(ctx)?;
        player.lock().await.stop().await?;
        Ok(embedded_messages::stopped())
    }
    .await;

    respond(ctx, reply).await
}
