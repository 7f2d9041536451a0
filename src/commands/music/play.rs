use super::*;
use tracing::info;

/// Play a song from YouTube, a playlist link or a search query
#[poise::command(slash_command, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "URL or search query"] query: String,
    #[description = "Play right after the current track instead of at the end"] next: Option<bool>,
) -> CommandResult {
    info!("Received play command with query: {}", query);

    // Resolving through yt-dlp can take a few seconds
    ctx.defer().await?;

    let reply: MusicResult<CreateReply> = async {
        let player = connect_player(ctx).await?;
        let tracks = ctx
            .data()
            .resolver
            .resolve(&query, &ctx.author().name)
            .await?;

        let mut player = player.lock().await;
        let position = if next.unwrap_or(false) {
            player.enqueue_next(tracks.clone()).await?
        } else {
            player.enqueue(tracks.clone()).await?
        };
        Ok(embedded_messages::added_to_queue(&tracks, position))
    }
    .await;

    respond(ctx, reply).await
}
