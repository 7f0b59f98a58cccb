use sqlx::PgPool;
use std::collections::HashSet;

/// Flip the caller's like on a video. Returns whether the video is liked
/// afterwards.
pub async fn toggle_like(pool: &PgPool, user_id: i64, video_id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query(
        r#"
        DELETE FROM likes
        WHERE user_id = $1 AND video_id = $2
        "#,
    )
    .bind(user_id)
    .bind(video_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if removed == 0 {
        sqlx::query(
            r#"
            INSERT INTO likes (user_id, video_id, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(removed == 0)
}

pub async fn is_liked(pool: &PgPool, user_id: i64, video_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = $1 AND video_id = $2)",
    )
    .bind(user_id)
    .bind(video_id)
    .fetch_one(pool)
    .await
}

/// Count total likes for a video
pub async fn count_likes(pool: &PgPool, video_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE video_id = $1")
        .bind(video_id)
        .fetch_one(pool)
        .await
}

/// Which of `video_ids` the user has liked.
pub async fn liked_video_ids(
    pool: &PgPool,
    user_id: i64,
    video_ids: &[i64],
) -> Result<HashSet<i64>, sqlx::Error> {
    if video_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let ids = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT DISTINCT video_id
        FROM likes
        WHERE user_id = $1 AND video_id = ANY($2)
        "#,
    )
    .bind(user_id)
    .bind(video_ids)
    .fetch_all(pool)
    .await?;

    Ok(ids.into_iter().collect())
}
