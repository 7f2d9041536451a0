use super::*;
use super::utils::session::Direction;

/// Go back to previously played tracks
#[poise::command(slash_command, category = "Music")]
pub async fn back(
    ctx: Context<'_>,
    #[description = "How many tracks to go back (default 1)"]
    #[min = 1]
    count: Option<usize>,
) -> CommandResult {
    super::skip::step(ctx, Direction::Reverse, count).await
}
