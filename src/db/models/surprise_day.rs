use chrono::{DateTime, Utc};
use serenity::all::{ChannelId, MessageId, UserId};

/// One row per guild member, tracking their surprise day, the hidden channel
/// it is celebrated in, and the pinned announcement message.
///
/// `channel` and `message` go null together when the member leaves; ids are
/// stored as decimal strings, the way Discord hands them over the wire.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SurpriseDay {
    pub id: i64,
    pub discord: String,
    pub message: Option<String>,
    pub channel: Option<String>,
    pub surprise_day: DateTime<Utc>,
    pub reset_day: DateTime<Utc>,
}

impl SurpriseDay {
    pub fn user_id(&self) -> Option<UserId> {
        self.discord.parse::<u64>().ok().map(UserId::new)
    }

    pub fn channel_id(&self) -> Option<ChannelId> {
        self.channel
            .as_deref()
            .and_then(|s| s.parse::<u64>().ok())
            .map(ChannelId::new)
    }

    pub fn message_id(&self) -> Option<MessageId> {
        self.message
            .as_deref()
            .and_then(|s| s.parse::<u64>().ok())
            .map(MessageId::new)
    }
}
