use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub discord_token: String,
    pub database_url: String,
    /// Category the surprise day channels are created under
    pub category_id: u64,
    pub guild_id: Option<u64>,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| "DISCORD_TOKEN environment variable not set")?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable not set")?;

        let category_id = env::var("CATEGORY_ID")
            .map_err(|_| "CATEGORY_ID environment variable not set")?
            .parse::<u64>()
            .map_err(|_| "CATEGORY_ID is not a valid channel id")?;

        let guild_id = env::var("GUILD_ID")
            .ok()
            .and_then(|s| s.parse::<u64>().ok());

        Ok(Self {
            discord_token,
            database_url,
            category_id,
            guild_id,
        })
    }
}
