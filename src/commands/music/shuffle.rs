use super::*;

/// Shuffle the upcoming tracks
#[poise::command(slash_command, category = "Music")]
pub async fn shuffle(ctx: Context<'_>) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let player = active_player(ctx)?;
        let mut player = player.lock().await;
        // ThreadRng is not Send; it must not live across an await.
        let shuffled = player.shuffle(&mut rand::rng());
        Ok(embedded_messages::shuffled(shuffled))
    }
    .await;

    respond(ctx, reply).await
}
