use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::bot::error::Error;
use crate::db::models::SurpriseDay;
use crate::utils::dates;

pub async fn create(
    pool: &SqlitePool,
    discord: &str,
    message: Option<&str>,
    channel: Option<&str>,
    surprise_day: DateTime<Utc>,
    reset_day: DateTime<Utc>,
) -> Result<SurpriseDay, Error> {
    sqlx::query_as::<_, SurpriseDay>(
        r#"
        INSERT INTO surprise_days (discord, message, channel, surprise_day, reset_day)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(discord)
    .bind(message)
    .bind(channel)
    .bind(surprise_day.timestamp())
    .bind(reset_day.timestamp())
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::DuplicateRecord(discord.to_string())
        }
        _ => Error::Database(e),
    })
}

pub async fn fetch_by_user(
    pool: &SqlitePool,
    discord: &str,
) -> Result<Option<SurpriseDay>, sqlx::Error> {
    sqlx::query_as::<_, SurpriseDay>("SELECT * FROM surprise_days WHERE discord = ?")
        .bind(discord)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_by_channel(
    pool: &SqlitePool,
    channel: &str,
) -> Result<Option<SurpriseDay>, sqlx::Error> {
    sqlx::query_as::<_, SurpriseDay>("SELECT * FROM surprise_days WHERE channel = ?")
        .bind(channel)
        .fetch_optional(pool)
        .await
}

/// All records whose reset day is strictly before `as_of`.
pub async fn fetch_expired(
    pool: &SqlitePool,
    as_of: DateTime<Utc>,
) -> Result<Vec<SurpriseDay>, sqlx::Error> {
    sqlx::query_as::<_, SurpriseDay>("SELECT * FROM surprise_days WHERE reset_day < ?")
        .bind(as_of.timestamp())
        .fetch_all(pool)
        .await
}

/// All records that currently have a live channel (for cache restore on startup)
pub async fn list_with_channel(pool: &SqlitePool) -> Result<Vec<SurpriseDay>, sqlx::Error> {
    sqlx::query_as::<_, SurpriseDay>("SELECT * FROM surprise_days WHERE channel IS NOT NULL")
        .fetch_all(pool)
        .await
}

/// Overwrite the mutable fields of a record. The user id never changes.
pub async fn update(pool: &SqlitePool, day: &SurpriseDay) -> Result<(), Error> {
    let result = sqlx::query(
        r#"
        UPDATE surprise_days
        SET message = ?, channel = ?, surprise_day = ?, reset_day = ?
        WHERE id = ?
        "#,
    )
    .bind(day.message.as_deref())
    .bind(day.channel.as_deref())
    .bind(day.surprise_day.timestamp())
    .bind(day.reset_day.timestamp())
    .bind(day.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::RecordNotFound(day.id));
    }

    Ok(())
}

pub async fn delete(pool: &SqlitePool, day: &SurpriseDay) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM surprise_days WHERE id = ?")
        .bind(day.id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Fetch a user's record, creating one with fresh dates and no channel if
/// they have never been seen before.
///
/// `INSERT OR IGNORE` against the unique `discord` column means a caller that
/// loses a race for the same user reads the winner's row instead of inserting
/// a duplicate.
pub async fn fetch_or_create(
    pool: &SqlitePool,
    discord: &str,
    now: DateTime<Utc>,
) -> Result<SurpriseDay, Error> {
    if let Some(day) = fetch_by_user(pool, discord).await? {
        return Ok(day);
    }

    let (surprise_day, reset_day) = dates::generate_random_days(now);

    sqlx::query("INSERT OR IGNORE INTO surprise_days (discord, surprise_day, reset_day) VALUES (?, ?, ?)")
        .bind(discord)
        .bind(surprise_day.timestamp())
        .bind(reset_day.timestamp())
        .execute(pool)
        .await?;

    fetch_by_user(pool, discord)
        .await?
        .ok_or_else(|| Error::custom(format!("surprise day row for {} missing after insert", discord)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::test_pool;
    use chrono::TimeZone;

    fn day_at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    async fn count(pool: &SqlitePool) -> i64 {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM surprise_days")
            .fetch_one(pool)
            .await
            .unwrap();
        row.0
    }

    #[tokio::test]
    async fn test_create_and_fetch_round_trip() {
        let pool = test_pool().await;

        let created = create(
            &pool,
            "1001",
            None,
            None,
            day_at(2024, 3, 9),
            day_at(2024, 12, 1),
        )
        .await
        .unwrap();

        assert_eq!(created.discord, "1001");
        assert_eq!(created.message, None);
        assert_eq!(created.channel, None);
        assert_eq!(created.surprise_day, day_at(2024, 3, 9));
        assert_eq!(created.reset_day, day_at(2024, 12, 1));

        let fetched = fetch_by_user(&pool, "1001").await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_fetch_by_channel() {
        let pool = test_pool().await;

        let created = create(
            &pool,
            "1001",
            Some("2002"),
            Some("3003"),
            day_at(2024, 3, 9),
            day_at(2024, 12, 1),
        )
        .await
        .unwrap();

        let fetched = fetch_by_channel(&pool, "3003").await.unwrap().unwrap();
        assert_eq!(fetched, created);

        assert!(fetch_by_channel(&pool, "9999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_user_rejected() {
        let pool = test_pool().await;

        create(&pool, "1001", None, None, day_at(2024, 3, 9), day_at(2024, 12, 1))
            .await
            .unwrap();

        let err = create(&pool, "1001", None, None, day_at(2024, 4, 1), day_at(2025, 1, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateRecord(ref user) if user == "1001"));
        assert_eq!(count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_fetch_or_create_is_idempotent() {
        let pool = test_pool().await;
        let now = day_at(2024, 3, 1);

        let first = fetch_or_create(&pool, "1001", now).await.unwrap();
        assert_eq!(first.channel, None);
        assert_eq!(first.message, None);

        let second = fetch_or_create(&pool, "1001", now).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(count(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_fetch_expired_is_strict() {
        let pool = test_pool().await;
        let as_of = day_at(2024, 6, 1);

        create(&pool, "1", None, None, day_at(2024, 1, 1), day_at(2024, 5, 31))
            .await
            .unwrap();
        create(&pool, "2", None, None, day_at(2024, 1, 1), as_of)
            .await
            .unwrap();
        create(&pool, "3", None, None, day_at(2024, 1, 1), day_at(2024, 6, 2))
            .await
            .unwrap();

        let expired = fetch_expired(&pool, as_of).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].discord, "1");
    }

    #[tokio::test]
    async fn test_update_round_trip() {
        let pool = test_pool().await;

        let mut day = create(&pool, "1001", None, None, day_at(2024, 3, 9), day_at(2024, 12, 1))
            .await
            .unwrap();

        day.channel = Some("3003".to_string());
        day.message = Some("2002".to_string());
        day.surprise_day = day_at(2024, 8, 8);
        day.reset_day = day_at(2025, 12, 1);
        update(&pool, &day).await.unwrap();

        let fetched = fetch_by_user(&pool, "1001").await.unwrap().unwrap();
        assert_eq!(fetched, day);
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let pool = test_pool().await;

        let ghost = SurpriseDay {
            id: 42,
            discord: "1001".to_string(),
            message: None,
            channel: None,
            surprise_day: day_at(2024, 3, 9),
            reset_day: day_at(2024, 12, 1),
        };

        let err = update(&pool, &ghost).await.unwrap_err();
        assert!(matches!(err, Error::RecordNotFound(42)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let pool = test_pool().await;

        let day = create(&pool, "1001", None, None, day_at(2024, 3, 9), day_at(2024, 12, 1))
            .await
            .unwrap();

        assert!(delete(&pool, &day).await.unwrap());
        assert!(!delete(&pool, &day).await.unwrap());
        assert_eq!(count(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_list_with_channel() {
        let pool = test_pool().await;

        create(&pool, "1", None, Some("100"), day_at(2024, 3, 9), day_at(2024, 12, 1))
            .await
            .unwrap();
        create(&pool, "2", None, None, day_at(2024, 3, 9), day_at(2024, 12, 1))
            .await
            .unwrap();

        let tracked = list_with_channel(&pool).await.unwrap();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].discord, "1");
    }
}
