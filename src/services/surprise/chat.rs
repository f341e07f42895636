use std::sync::Arc;

use serenity::all::{
    ChannelId, ChannelType, CreateChannel, CreateMessage, GuildId, Http, MessageId,
    PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId,
};

use crate::bot::error::Error;

/// The slice of the messaging platform the surprise day lifecycle needs.
///
/// Kept behind a trait so the lifecycle and rollover paths can run against a
/// recording fake in tests; the bot itself always uses [`DiscordChat`].
pub(crate) trait ChatApi {
    /// Create a text channel under `category`, hidden from `@everyone`.
    async fn create_hidden_channel(
        &self,
        guild_id: GuildId,
        category_id: ChannelId,
        name: &str,
    ) -> Result<ChannelId, Error>;

    async fn delete_channel(&self, channel_id: ChannelId) -> Result<(), Error>;

    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<MessageId, Error>;

    async fn pin_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<(), Error>;

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<(), Error>;
}

/// Production implementation over serenity's HTTP client. Discord 404
/// responses surface as [`Error::RemoteNotFound`] so callers can treat
/// already-deleted entities as benign where the lifecycle allows it.
pub struct DiscordChat {
    http: Arc<Http>,
}

impl DiscordChat {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

impl ChatApi for DiscordChat {
    async fn create_hidden_channel(
        &self,
        guild_id: GuildId,
        category_id: ChannelId,
        name: &str,
    ) -> Result<ChannelId, Error> {
        let channel = guild_id
            .create_channel(
                &*self.http,
                CreateChannel::new(name)
                    .kind(ChannelType::Text)
                    .category(category_id)
                    .permissions(vec![PermissionOverwrite {
                        allow: Permissions::empty(),
                        deny: Permissions::VIEW_CHANNEL,
                        // The @everyone role shares the guild's id
                        kind: PermissionOverwriteType::Role(RoleId::new(guild_id.get())),
                    }]),
            )
            .await
            .map_err(Error::from_discord)?;

        Ok(channel.id)
    }

    async fn delete_channel(&self, channel_id: ChannelId) -> Result<(), Error> {
        channel_id
            .delete(&*self.http)
            .await
            .map(|_| ())
            .map_err(Error::from_discord)
    }

    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<MessageId, Error> {
        let message = channel_id
            .send_message(&*self.http, CreateMessage::new().content(content))
            .await
            .map_err(Error::from_discord)?;

        Ok(message.id)
    }

    async fn pin_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<(), Error> {
        channel_id
            .pin(&*self.http, message_id)
            .await
            .map_err(Error::from_discord)
    }

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) -> Result<(), Error> {
        channel_id
            .delete_message(&*self.http, message_id)
            .await
            .map_err(Error::from_discord)
    }
}
