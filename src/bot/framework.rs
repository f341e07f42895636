use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, GatewayIntents, GuildId};
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::commands;
use crate::config::Settings;
use crate::db::queries::surprise_day as queries;
use crate::handlers::event_handler::event_handler;
use crate::services::surprise::rollover;

pub async fn run(settings: Settings, pool: SqlitePool) -> Result<(), Error> {
    let data = Arc::new(Data::new(pool, settings.clone()));

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::join::join(), commands::leave::leave()],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: None, // Slash commands only
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Command error: {:?}", error);
                            let _ = ctx.say("Something went wrong, please try again later.").await;
                        }
                        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
                            let _ = ctx.say(format!("Invalid argument: {}", error)).await;
                        }
                        err => {
                            error!("Framework error: {:?}", err);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as {}", ready.user.name);

                // Repopulate the channel cache from the store so gateway
                // events can recognize our channels from the first tick
                match queries::list_with_channel(&data.pool).await {
                    Ok(days) => {
                        let mut restored = 0;
                        for day in days {
                            if let (Some(channel), Some(user)) = (day.channel_id(), day.user_id()) {
                                data.track_channel(channel.get(), user.get());
                                restored += 1;
                            }
                        }
                        if restored > 0 {
                            info!("Restored {} surprise channel(s) to cache", restored);
                        }
                    }
                    Err(e) => {
                        warn!("Failed to restore surprise channels to cache: {:?}", e);
                    }
                }

                rollover::spawn_daily_rollover(ctx.http.clone(), data.clone());
                info!("Started daily surprise day rollover task");

                match data.settings.guild_id {
                    Some(guild_id) => {
                        let guild_id = GuildId::new(guild_id);
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            guild_id,
                        )
                        .await
                        .map_err(Error::Serenity)?;
                        info!(
                            "Registered {} commands in guild {}",
                            framework.options().commands.len(),
                            guild_id
                        );
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await
                            .map_err(Error::Serenity)?;
                        info!(
                            "Registered {} commands globally (may take up to an hour to appear)",
                            framework.options().commands.len()
                        );
                    }
                }

                Ok(data)
            })
        })
        .build();

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(&settings.discord_token, intents)
        .framework(framework)
        .await
        .map_err(Error::Serenity)?;

    info!("Starting Discord client...");
    client.start().await.map_err(Error::Serenity)
}
