use super::*;

/// Pause or resume the current track
#[poise::command(slash_command, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let player = active_player(ctx)?;
        let mut player = player.lock().await;
        let paused = player.toggle_pause().await?;
        let track = player
            .session()
            .current_track()
            .cloned()
            .ok_or(MusicError::NothingPlaying)?;

        Ok(if paused {
            embedded_messages::paused(&track)
        } else {
            embedded_messages::resumed(&track)
        })
    }
    .await;

    respond(ctx, reply).await
}
