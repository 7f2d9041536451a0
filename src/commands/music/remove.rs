use super::*;

/// Remove a track from the queue by its position
#[poise::command(slash_command, category = "Music")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Position of the track to remove (1-based)"]
    #[min = 1]
    position: usize,
) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let index = position
            .checked_sub(1)
            .ok_or_else(|| MusicError::InvalidArgument("positions start at 1".to_string()))?;
        let player = active_player(ctx)?;
        let removed = player.lock().await.remove(index)?;
        Ok(embedded_messages::track_removed(&removed, position))
    }
    .await;

    respond(ctx, reply).await
}
