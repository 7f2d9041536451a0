use super::*;
use super::utils::parse_timestamp;

/// Jump to a position in the current track
#[poise::command(slash_command, category = "Music")]
pub async fn seek(
    ctx: Context<'_>,
    #[description = "Timestamp such as 1:30 or 1:02:03"] timestamp: String,
) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let position = parse_timestamp(&timestamp).ok_or_else(|| {
            MusicError::InvalidArgument(format!("'{}' is not a timestamp", timestamp))
        })?;
        let player = active_player(ctx)?;
        player.lock().await.seek(position).await?;
        Ok(embedded_messages::seeked(position))
    }
    .await;

    respond(ctx, reply).await
}
