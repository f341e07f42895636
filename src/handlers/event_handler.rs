use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, FullEvent};
use tracing::{error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::services::surprise::chat::DiscordChat;
use crate::services::surprise::{channel_creator, channel_deleter};

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Arc<Data>, Error>,
    data: &Arc<Data>,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot, .. } => {
            info!("Bot ready as {}", data_about_bot.user.name);
        }

        FullEvent::GuildMemberAddition { new_member } => {
            let chat = DiscordChat::new(ctx.http.clone());
            if let Err(e) = channel_creator::handle_member_join(
                &chat,
                data,
                new_member.guild_id,
                new_member.user.id,
                &new_member.user.name,
            )
            .await
            {
                error!("Member join handler error: {:?}", e);
            }
        }

        FullEvent::GuildMemberRemoval { user, .. } => {
            let chat = DiscordChat::new(ctx.http.clone());
            if let Err(e) = channel_deleter::handle_member_leave(&chat, data, user.id).await {
                error!("Member leave handler error: {:?}", e);
            }
        }

        FullEvent::ChannelDelete { channel, .. } => {
            if let Err(e) = channel_deleter::handle_channel_deleted(data, channel.id).await {
                error!("Channel delete handler error: {:?}", e);
            }
        }

        _ => {}
    }

    Ok(())
}
