use serenity::all::UserId;

/// Format a user mention
pub fn mention_user(user_id: UserId) -> String {
    format!("<@{}>", user_id)
}

/// Discord timestamp token rendered as an absolute date in the viewer's locale
pub fn timestamp_absolute(unix: i64) -> String {
    format!("<t:{}>", unix)
}

/// Discord timestamp token rendered relative to now ("in 3 months")
pub fn timestamp_relative(unix: i64) -> String {
    format!("<t:{}:R>", unix)
}
