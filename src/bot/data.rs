use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use sqlx::SqlitePool;

use crate::config::Settings;

/// Shared data available to all commands and handlers
pub struct Data {
    pub pool: SqlitePool,
    pub settings: Settings,
    /// Cache of channel_id -> user_id for the surprise channels we manage,
    /// so gateway events can tell ours apart without a database round trip
    pub surprise_channels: DashMap<u64, u64>,
}

impl Data {
    pub fn new(pool: SqlitePool, settings: Settings) -> Self {
        Self {
            pool,
            settings,
            surprise_channels: DashMap::new(),
        }
    }

    /// Record a surprise channel in cache
    pub fn track_channel(&self, channel_id: u64, user_id: u64) {
        self.surprise_channels.insert(channel_id, user_id);
    }

    /// Remove a channel from the cache, returning its user if it was ours
    pub fn untrack_channel(&self, channel_id: u64) -> Option<u64> {
        self.surprise_channels.remove(&channel_id).map(|(_, user)| user)
    }

    /// Check if a channel is one of the surprise channels we manage
    pub fn is_surprise_channel(&self, channel_id: u64) -> bool {
        self.surprise_channels.contains_key(&channel_id)
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("surprise_channels_count", &self.surprise_channels.len())
            .finish_non_exhaustive()
    }
}

pub type Context<'a> = poise::Context<'a, Arc<Data>, crate::bot::error::Error>;
