use chrono::{DateTime, Utc};
use serenity::all::{ChannelId, MessageId, UserId};
use tracing::{debug, warn};

use crate::services::surprise::chat::ChatApi;
use crate::utils::formatting;

/// The pinned announcement text. The two `<t:...>` tokens are rendered by
/// Discord clients from the embedded unix timestamp; the value is passed
/// through verbatim, never parsed back.
pub fn announcement_text(user_id: UserId, surprise_day: DateTime<Utc>) -> String {
    let unix = surprise_day.timestamp();
    format!(
        "{}'s Surprise Day is on {}, {}",
        formatting::mention_user(user_id),
        formatting::timestamp_absolute(unix),
        formatting::timestamp_relative(unix),
    )
}

/// Delete a superseded announcement. The message being gone already is the
/// normal case after manual unpinning or moderation; anything else is logged
/// and otherwise ignored so the fresh announcement still goes out.
pub(crate) async fn delete_stale<C: ChatApi>(chat: &C, channel_id: ChannelId, message_id: MessageId) {
    match chat.delete_message(channel_id, message_id).await {
        Ok(()) => {}
        Err(e) if e.is_remote_not_found() => {
            debug!("Old announcement {} in {} already gone", message_id, channel_id);
        }
        Err(e) => {
            warn!(
                "Failed to delete old announcement {} in {}: {:?}",
                message_id, channel_id, e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_announcement_text_tokens() {
        let day = Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap();
        let unix = day.timestamp();
        assert_eq!(
            announcement_text(UserId::new(42), day),
            format!("<@42>'s Surprise Day is on <t:{0}>, <t:{0}:R>", unix)
        );
    }
}
