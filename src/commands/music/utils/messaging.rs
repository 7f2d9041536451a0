//! Messaging collaborator: sends, edits and deletes the player message.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serenity::all::{CreateMessage, EditMessage};
use serenity::http::{Http, HttpError};
use serenity::model::id::{ChannelId, MessageId};
use std::sync::Arc;

use super::button_controls::create_player_buttons;
use super::controller::PlayerView;
use super::embedded_messages;
use super::music_manager::{MusicError, MusicResult};

/// Where a sent player message lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(
        &self,
        channel_id: ChannelId,
        view: &PlayerView,
    ) -> MusicResult<MessageHandle>;

    /// Fails with [`MusicError::StaleReference`] when the message is gone.
    async fn edit_message(&self, handle: MessageHandle, view: &PlayerView) -> MusicResult<()>;

    async fn delete_message(&self, handle: MessageHandle) -> MusicResult<()>;
}

/// A 404 means the message (or its channel) was deleted out from under us.
fn classify(err: serenity::Error) -> MusicError {
    match &err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404 =>
        {
            MusicError::StaleReference(err.to_string())
        }
        _ => MusicError::UpstreamUnavailable(err.to_string()),
    }
}

pub struct SerenityMessenger {
    http: Arc<Http>,
}

impl SerenityMessenger {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Messenger for SerenityMessenger {
    async fn send_message(&self, channel_id: ChannelId, view: &PlayerView) -> MusicResult<MessageHandle> {
        let message = CreateMessage::new()
            .embed(embedded_messages::player(view))
            .components(create_player_buttons(view));
        let sent = channel_id
            .send_message(&self.http, message)
            .await
            .map_err(classify)?;

        Ok(MessageHandle {
            channel_id,
            message_id: sent.id,
        })
    }

    async fn edit_message(&self, handle: MessageHandle, view: &PlayerView) -> MusicResult<()> {
        let edit = EditMessage::new()
            .embed(embedded_messages::player(view))
            .components(create_player_buttons(view));
        handle
            .channel_id
            .edit_message(&self.http, handle.message_id, edit)
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn delete_message(&self, handle: MessageHandle) -> MusicResult<()> {
        handle
            .channel_id
            .delete_message(&self.http, handle.message_id)
            .await
            .map_err(classify)
    }
}
