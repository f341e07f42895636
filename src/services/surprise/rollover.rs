use std::sync::Arc;

use chrono::{DateTime, Utc};
use serenity::all::Http;
use sqlx::SqlitePool;
use tracing::{debug, error, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::db::models::SurpriseDay;
use crate::db::queries::surprise_day as queries;
use crate::services::surprise::announcement;
use crate::services::surprise::chat::{ChatApi, DiscordChat};
use crate::utils::dates;

/// Start the background task that rolls expired surprise days forward once a
/// day at UTC midnight.
pub fn spawn_daily_rollover(http: Arc<Http>, data: Arc<Data>) {
    tokio::spawn(async move {
        let chat = DiscordChat::new(http);

        loop {
            let wait = dates::until_next_midnight(Utc::now());
            debug!("Next surprise day rollover in {:?}", wait);
            tokio::time::sleep(wait).await;

            match run_rollover(&chat, &data.pool, Utc::now()).await {
                Ok(0) => {}
                Ok(n) => info!("Processed {} expired surprise day(s)", n),
                Err(e) => error!("Surprise day rollover failed: {:?}", e),
            }
        }
    });
}

/// Roll every record whose reset day has passed. Returns how many expired
/// records were picked up; failures are per-record and never abort the batch.
pub(crate) async fn run_rollover<C: ChatApi>(
    chat: &C,
    pool: &SqlitePool,
    now: DateTime<Utc>,
) -> Result<usize, Error> {
    let expired = queries::fetch_expired(pool, now).await?;
    let total = expired.len();

    if total > 0 {
        info!("Resetting {} expired surprise day(s)", total);
    }

    for day in expired {
        let user = day.discord.clone();
        if let Err(e) = roll_record(chat, pool, day, now).await {
            error!("Failed to roll over surprise day for user {}: {:?}", user, e);
        }
    }

    Ok(total)
}

async fn roll_record<C: ChatApi>(
    chat: &C,
    pool: &SqlitePool,
    mut day: SurpriseDay,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    let Some(channel_id) = day.channel_id() else {
        // The user left before the reset came due. Drop the orphan so it is
        // not rescanned every day; a rejoin recreates the row from scratch.
        queries::delete(pool, &day).await?;
        debug!("Deleted orphaned surprise day record for user {}", day.discord);
        return Ok(());
    };

    let user_id = day
        .user_id()
        .ok_or_else(|| Error::custom(format!("unparseable user id {:?} on record {}", day.discord, day.id)))?;

    // New dates go to the store first, so a failure announcing never leaves
    // the record eligible for another pass tomorrow.
    let (surprise_day, reset_day) = dates::generate_random_days(now);
    day.surprise_day = surprise_day;
    day.reset_day = reset_day;
    queries::update(pool, &day).await?;

    if let Some(message_id) = day.message_id() {
        announcement::delete_stale(chat, channel_id, message_id).await;
    }

    let text = announcement::announcement_text(user_id, day.surprise_day);
    let message_id = chat.send_message(channel_id, &text).await?;
    chat.pin_message(channel_id, message_id).await?;

    day.message = Some(message_id.to_string());
    queries::update(pool, &day).await?;

    info!(
        "Rolled surprise day for user {} forward to {}",
        day.discord, day.surprise_day
    );
    Ok(())
}
