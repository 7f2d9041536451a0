use super::*;
use super::utils::session::Direction;

/// Move `count` tracks through the timeline in `direction`.
pub(super) async fn step(
    ctx: Context<'_>,
    direction: Direction,
    count: Option<usize>,
) -> CommandResult {
    let count = count.unwrap_or(1);
    let reply: MusicResult<CreateReply> = async {
        let player = active_player(ctx)?;
        player.lock().await.skip(direction, count).await?;
        Ok(embedded_messages::skipped(direction, count))
    }
    .await;

    respond(ctx, reply).await
}

/// Skip ahead in the queue
#[poise::command(slash_command, category = "Music")]
pub async fn skip(
    ctx: Context<'_>,
    #[description = "How many tracks to skip (default 1)"]
    #[min = 1]
    count: Option<usize>,
) -> CommandResult {
    step(ctx, Direction::Forward, count).await
}
