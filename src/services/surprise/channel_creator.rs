use std::sync::Arc;

use chrono::Utc;
use serenity::all::{ChannelId, GuildId, UserId};
use tracing::{info, warn};

use crate::bot::data::Data;
use crate::bot::error::Error;
use crate::db::queries::surprise_day as queries;
use crate::services::surprise::announcement;
use crate::services::surprise::chat::ChatApi;

/// Set up a member's surprise day on guild join: ensure a record exists,
/// create the hidden channel, and pin the announcement.
///
/// The three collaborator calls run in sequence with no rollback; a failure
/// part-way leaves the record with whatever ids were already persisted, and a
/// later leave/join cycle rebuilds the rest.
pub(crate) async fn handle_member_join<C: ChatApi>(
    chat: &C,
    data: &Arc<Data>,
    guild_id: GuildId,
    user_id: UserId,
    username: &str,
) -> Result<(), Error> {
    let pool = &data.pool;
    let mut day = queries::fetch_or_create(pool, &user_id.to_string(), Utc::now()).await?;

    let channel_id = match day.channel_id() {
        Some(existing) => {
            // Stale state from an unclean leave. Reuse the channel rather
            // than stacking a second one; the announcement is refreshed below.
            warn!(
                "User {} joined but already has surprise channel {}",
                user_id, existing
            );
            if let Some(message_id) = day.message_id() {
                announcement::delete_stale(chat, existing, message_id).await;
            }
            existing
        }
        None => {
            let category_id = ChannelId::new(data.settings.category_id);
            let created = chat
                .create_hidden_channel(guild_id, category_id, username)
                .await?;

            day.channel = Some(created.to_string());
            queries::update(pool, &day).await?;
            created
        }
    };

    data.track_channel(channel_id.get(), user_id.get());

    let text = announcement::announcement_text(user_id, day.surprise_day);
    let message_id = chat.send_message(channel_id, &text).await?;
    day.message = Some(message_id.to_string());
    queries::update(pool, &day).await?;

    chat.pin_message(channel_id, message_id).await?;

    info!("Generated surprise day for user {}", user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::db::pool::test_pool;
    use crate::services::surprise::chat::test_support::RecordingChat;
    use chrono::{Duration, TimeZone};

    async fn test_data() -> Arc<Data> {
        let settings = Settings {
            discord_token: String::new(),
            database_url: String::new(),
            category_id: 555,
            guild_id: None,
        };
        Arc::new(Data::new(test_pool().await, settings))
    }

    #[tokio::test]
    async fn test_join_creates_channel_and_pinned_announcement() {
        let data = test_data().await;
        let chat = RecordingChat::new();

        handle_member_join(&chat, &data, GuildId::new(1), UserId::new(42), "alice")
            .await
            .unwrap();

        let day = queries::fetch_by_user(&data.pool, "42").await.unwrap().unwrap();
        assert!(day.channel.is_some());
        assert!(day.message.is_some());

        let created = chat.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].1, ChannelId::new(555));
        assert_eq!(created[0].2, "alice");

        assert_eq!(chat.sent_count(), 1);
        assert_eq!(chat.pinned_count(), 1);
        assert!(data.is_surprise_channel(day.channel_id().unwrap().get()));

        // The announcement carries the stored surprise day verbatim
        let sent = chat.sent.lock().unwrap();
        assert!(sent[0].1.contains(&format!("<t:{}>", day.surprise_day.timestamp())));
    }

    #[tokio::test]
    async fn test_rejoin_with_stale_channel_reuses_it() {
        let data = test_data().await;
        let chat = RecordingChat::new();

        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        queries::create(
            &data.pool,
            "42",
            Some("900"),
            Some("700"),
            now + Duration::days(30),
            now + Duration::days(365),
        )
        .await
        .unwrap();

        handle_member_join(&chat, &data, GuildId::new(1), UserId::new(42), "alice")
            .await
            .unwrap();

        // No second channel; the stale pinned announcement is replaced
        assert!(chat.created.lock().unwrap().is_empty());
        assert_eq!(
            chat.deleted_messages.lock().unwrap().as_slice(),
            &[(ChannelId::new(700), serenity::all::MessageId::new(900))]
        );
        assert_eq!(chat.sent_count(), 1);
        assert_eq!(chat.pinned_count(), 1);

        let day = queries::fetch_by_user(&data.pool, "42").await.unwrap().unwrap();
        assert_eq!(day.channel.as_deref(), Some("700"));
        assert_ne!(day.message.as_deref(), Some("900"));
    }
}
