use super::*;
use super::utils::session::{LoopChange, LoopMode};

/// Set the loop mode, or cycle to the next one
#[poise::command(slash_command, rename = "loop", category = "Music")]
pub async fn loop_mode(
    ctx: Context<'_>,
    #[description = "Off, Queue or Song (cycles when omitted)"] mode: Option<LoopMode>,
) -> CommandResult {
    let reply: MusicResult<CreateReply> = async {
        let player = active_player(ctx)?;
        let change = mode.map_or(LoopChange::CycleNext, LoopChange::Set);
        let mode = player.lock().await.change_loop_mode(change);
        Ok(embedded_messages::loop_mode(mode))
    }
    .await;

    respond(ctx, reply).await
}
