use crate::models::PodcastRow;
use sqlx::PgPool;

const PODCAST_COLUMNS: &str = r#"
    p.id, p.user_id, p.title, p.audio_url, p.thumbnail_url, p.category, p.description,
    p.is_active, COALESCE(p.plays_count, 0)::BIGINT AS plays_count, p.created_at, p.updated_at,
    u.name AS user_name
"#;

/// One page of active podcasts, newest first, plus the total matching count.
pub async fn list_active(
    pool: &PgPool,
    category: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<PodcastRow>, i64), sqlx::Error> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM podcasts p
        WHERE p.is_active = TRUE AND ($1::TEXT IS NULL OR p.category = $1)
        "#,
    )
    .bind(category)
    .fetch_one(pool)
    .await?;

    let sql = format!(
        r#"
        SELECT {PODCAST_COLUMNS}
        FROM podcasts p
        LEFT JOIN users u ON u.id = p.user_id
        WHERE p.is_active = TRUE AND ($1::TEXT IS NULL OR p.category = $1)
        ORDER BY p.created_at DESC NULLS LAST, p.id DESC
        LIMIT $2 OFFSET $3
        "#
    );

    let rows = sqlx::query_as::<_, PodcastRow>(&sql)
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}

pub async fn find_podcast(pool: &PgPool, podcast_id: i64) -> Result<Option<PodcastRow>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {PODCAST_COLUMNS}
        FROM podcasts p
        LEFT JOIN users u ON u.id = p.user_id
        WHERE p.id = $1
        "#
    );

    sqlx::query_as::<_, PodcastRow>(&sql)
        .bind(podcast_id)
        .fetch_optional(pool)
        .await
}

/// Atomically bump the play counter of an active podcast.
pub async fn increment_plays(pool: &PgPool, podcast_id: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE podcasts
        SET plays_count = COALESCE(plays_count, 0) + 1
        WHERE id = $1 AND is_active = TRUE
        RETURNING plays_count::BIGINT
        "#,
    )
    .bind(podcast_id)
    .fetch_optional(pool)
    .await
}
