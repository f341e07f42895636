use poise::serenity_prelude::{
    ChannelId, PermissionOverwrite, PermissionOverwriteType, Permissions, User, UserId,
};

use crate::bot::data::Context;
use crate::bot::error::Error;
use crate::db::models::SurpriseDay;
use crate::db::queries::surprise_day as queries;
use crate::utils::formatting;

/// Decide which channel a join request should be granted access to, or why
/// it must be refused. Pure so the refusal rules are unit-testable.
fn target_channel(
    requester: UserId,
    target: UserId,
    day: Option<&SurpriseDay>,
) -> Result<ChannelId, &'static str> {
    if requester == target {
        return Err("You can't join your own channel!");
    }

    day.and_then(|d| d.channel_id()).ok_or(
        "This user does not have a celebratory channel, or they are not a member of this server!",
    )
}

/// Join someone else's surprise day!
#[poise::command(slash_command, guild_only)]
pub async fn join(
    ctx: Context<'_>,
    #[description = "User whose surprise day channel you want to see"] user: User,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;

    let day = queries::fetch_by_user(&ctx.data().pool, &user.id.to_string()).await?;

    let channel_id = match target_channel(ctx.author().id, user.id, day.as_ref()) {
        Ok(channel_id) => channel_id,
        Err(reason) => {
            ctx.say(reason).await?;
            return Ok(());
        }
    };

    channel_id
        .create_permission(
            ctx.serenity_context(),
            PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(ctx.author().id),
            },
        )
        .await?;

    ctx.say(format!(
        "Joined {}'s surprise channel!",
        formatting::mention_user(user.id)
    ))
    .await?;

    Ok(())
}
