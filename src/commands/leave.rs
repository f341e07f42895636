use serenity::all::PermissionOverwriteType;

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::db::queries::surprise_day as queries;

/// Leave someone else's channel ;(
#[poise::command(slash_command, guild_only)]
pub async fn leave(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let channel_id = ctx.channel_id();
    let day = queries::fetch_by_channel(&ctx.data().pool, &channel_id.to_string()).await?;

    if day.is_none() {
        ctx.say("You are not in a celebratory channel!").await?;
        return Ok(());
    }

    channel_id
        .delete_permission(
            ctx.serenity_context(),
            PermissionOverwriteType::Member(ctx.author().id),
        )
        .await?;

    ctx.say("Successfully left channel!").await?;

    Ok(())
}
