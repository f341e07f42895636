use std::sync::Arc;

use serenity::all::{ChannelId, UserId};
use tracing::{debug, info};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::db::queries::surprise_day as queries;
use crate::services::surprise::chat::ChatApi;

/// Tear down a member's surprise channel when they leave the guild. The
/// record itself survives with both ids nulled, so a rejoin picks the same
/// surprise day back up.
pub(crate) async fn handle_member_leave<C: ChatApi>(
    chat: &C,
    data: &Arc<Data>,
    user_id: UserId,
) -> Result<(), Error> {
    let pool = &data.pool;

    let Some(mut day) = queries::fetch_by_user(pool, &user_id.to_string()).await? else {
        return Ok(());
    };
    let Some(channel_id) = day.channel_id() else {
        debug!("User {} left with no surprise channel on record", user_id);
        return Ok(());
    };

    match chat.delete_channel(channel_id).await {
        Ok(()) => {}
        // Already gone is as good as deleted
        Err(e) if e.is_remote_not_found() => {
            debug!("Surprise channel {} was already deleted", channel_id);
        }
        Err(e) => return Err(e),
    }

    day.channel = None;
    day.message = None;
    queries::update(pool, &day).await?;
    data.untrack_channel(channel_id.get());

    info!("Cleaned up surprise day channel for user {}", user_id);
    Ok(())
}

/// A surprise channel was deleted out from under us (moderator action or
/// manual cleanup). Clear the stored ids so the next join rebuilds cleanly.
pub async fn handle_channel_deleted(data: &Arc<Data>, channel_id: ChannelId) -> Result<(), Error> {
    if data.untrack_channel(channel_id.get()).is_none() {
        return Ok(());
    }

    if let Some(mut day) = queries::fetch_by_channel(&data.pool, &channel_id.to_string()).await? {
        day.channel = None;
        day.message = None;
        queries::update(&data.pool, &day).await?;
        info!(
            "Surprise channel {} removed externally, cleared record for user {}",
            channel_id, day.discord
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::db::pool::test_pool;
    use crate::services::surprise::chat::test_support::RecordingChat;
    use chrono::{TimeZone, Utc};

    async fn test_data() -> Arc<Data> {
        let settings = Settings {
            discord_token: String::new(),
            database_url: String::new(),
            category_id: 555,
            guild_id: None,
        };
        Arc::new(Data::new(test_pool().await, settings))
    }

    async fn seed_record(data: &Arc<Data>) {
        let day = Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap();
        let reset = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        queries::create(&data.pool, "42", Some("900"), Some("700"), day, reset)
            .await
            .unwrap();
        data.track_channel(700, 42);
    }

    #[tokio::test]
    async fn test_leave_deletes_channel_and_nulls_record() {
        let data = test_data().await;
        let chat = RecordingChat::new();
        seed_record(&data).await;

        handle_member_leave(&chat, &data, UserId::new(42)).await.unwrap();

        assert_eq!(
            chat.deleted_channels.lock().unwrap().as_slice(),
            &[ChannelId::new(700)]
        );

        let day = queries::fetch_by_user(&data.pool, "42").await.unwrap().unwrap();
        assert_eq!(day.channel, None);
        assert_eq!(day.message, None);
        assert!(!data.is_surprise_channel(700));
    }

    #[tokio::test]
    async fn test_leave_tolerates_channel_already_gone() {
        let data = test_data().await;
        let chat = RecordingChat::new();
        seed_record(&data).await;
        chat.missing_channels.lock().unwrap().insert(700);

        handle_member_leave(&chat, &data, UserId::new(42)).await.unwrap();

        let day = queries::fetch_by_user(&data.pool, "42").await.unwrap().unwrap();
        assert_eq!(day.channel, None);
        assert_eq!(day.message, None);
    }

    #[tokio::test]
    async fn test_leave_without_record_is_a_noop() {
        let data = test_data().await;
        let chat = RecordingChat::new();

        handle_member_leave(&chat, &data, UserId::new(42)).await.unwrap();

        assert!(chat.deleted_channels.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_external_channel_delete_clears_record() {
        let data = test_data().await;
        seed_record(&data).await;

        handle_channel_deleted(&data, ChannelId::new(700)).await.unwrap();

        let day = queries::fetch_by_user(&data.pool, "42").await.unwrap().unwrap();
        assert_eq!(day.channel, None);
        assert_eq!(day.message, None);

        // Channels we never tracked are ignored
        handle_channel_deleted(&data, ChannelId::new(9999)).await.unwrap();
    }
}
