use crate::models::{Video, VideoDetailRow, VideoFeedRow};
use crate::services::feed_ranking::{FeedMode, SortDirection, SortField};
use sqlx::PgPool;

const VIDEO_COLUMNS: &str = r#"
    v.id, v.user_id, v.title, v.description, v.video_url, v.thumbnail_url, v.is_active,
    COALESCE(v.views_count, 0)::BIGINT AS views_count, v.created_at, v.updated_at
"#;

const COUNTER_COLUMNS: &str = r#"
    (SELECT COUNT(*) FROM likes l WHERE l.video_id = v.id) AS likes_count,
    (SELECT COUNT(*) FROM comments c WHERE c.video_id = v.id) AS comments_count
"#;

const FEED_FROM: &str = r#"
        FROM videos v
        LEFT JOIN users u ON u.id = v.user_id
        LEFT JOIN LATERAL (
            SELECT c.id, c.content, c.created_at, c.user_id
            FROM comments c
            WHERE c.video_id = v.id AND c.is_active = TRUE
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT 1
        ) lc ON TRUE
        LEFT JOIN users lu ON lu.id = lc.user_id
        WHERE v.is_active = TRUE
          AND ($1::TEXT IS NULL OR v.title ILIKE $1 OR v.description ILIKE $1)
"#;

fn feed_select(order_by: &str) -> String {
    format!(
        r#"
        SELECT {VIDEO_COLUMNS},
               u.name AS user_name,
               {COUNTER_COLUMNS},
               lc.id AS last_comment_id,
               lc.content AS last_comment_content,
               lc.created_at AS last_comment_created_at,
               lc.user_id AS last_comment_user_id,
               lu.name AS last_comment_user_name
        {FEED_FROM}
        ORDER BY {order_by}
        LIMIT $2 OFFSET $3
        "#
    )
}

/// `ORDER BY` clause for the modes that sort on stored columns.
///
/// Ranked mode returns `None`: its score depends on the seed and the clock,
/// so it is computed in memory over a capped candidate set instead.
pub fn feed_order_by(mode: &FeedMode) -> Option<String> {
    match mode {
        FeedMode::Ranked { .. } => None,
        FeedMode::Chronological { direction } => Some(format!(
            "v.created_at {}, v.id {}",
            with_nulls(*direction),
            keyword(*direction)
        )),
        FeedMode::Field { field, direction } => {
            let primary = match field {
                SortField::CreatedAt => format!("v.created_at {}", with_nulls(*direction)),
                SortField::ViewsCount => {
                    format!("COALESCE(v.views_count, 0) {}", keyword(*direction))
                }
                SortField::LikesCount => format!("likes_count {}", keyword(*direction)),
                SortField::CommentsCount => format!("comments_count {}", keyword(*direction)),
            };
            Some(format!("{primary}, {NEWEST_FIRST}"))
        }
    }
}

const NEWEST_FIRST: &str = "v.created_at DESC NULLS LAST, v.id DESC";

fn keyword(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    }
}

// A missing timestamp sorts as the oldest value in either direction
fn with_nulls(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC NULLS FIRST",
        SortDirection::Desc => "DESC NULLS LAST",
    }
}

/// Number of active videos matching `pattern`, ignoring any candidate cap.
pub async fn count_feed_videos(pool: &PgPool, pattern: Option<&str>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM videos v
        WHERE v.is_active = TRUE
          AND ($1::TEXT IS NULL OR v.title ILIKE $1 OR v.description ILIKE $1)
        "#,
    )
    .bind(pattern)
    .fetch_one(pool)
    .await
}

/// One page of active videos sorted in SQL by `order_by` (see
/// [`feed_order_by`]).
pub async fn list_feed_page(
    pool: &PgPool,
    pattern: Option<&str>,
    order_by: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<VideoFeedRow>, sqlx::Error> {
    sqlx::query_as::<_, VideoFeedRow>(&feed_select(order_by))
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// Load up to `limit` active candidates for ranked mode, newest first, with
/// author, counters and the latest active comment.
///
/// `pattern` is an `ILIKE` pattern matched against title and description.
pub async fn list_feed_candidates(
    pool: &PgPool,
    pattern: Option<&str>,
    limit: i64,
) -> Result<Vec<VideoFeedRow>, sqlx::Error> {
    list_feed_page(pool, pattern, NEWEST_FIRST, limit, 0).await
}

/// Find a video with author and counters regardless of its active flag.
pub async fn find_video_detail(
    pool: &PgPool,
    video_id: i64,
) -> Result<Option<VideoDetailRow>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {VIDEO_COLUMNS},
               u.name AS user_name,
               {COUNTER_COLUMNS}
        FROM videos v
        LEFT JOIN users u ON u.id = v.user_id
        WHERE v.id = $1
        "#
    );

    sqlx::query_as::<_, VideoDetailRow>(&sql)
        .bind(video_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_video(pool: &PgPool, video_id: i64) -> Result<Option<Video>, sqlx::Error> {
    let sql = format!("SELECT {VIDEO_COLUMNS} FROM videos v WHERE v.id = $1");

    sqlx::query_as::<_, Video>(&sql)
        .bind(video_id)
        .fetch_optional(pool)
        .await
}

/// Atomically bump the view counter, returning the new value.
pub async fn increment_views(pool: &PgPool, video_id: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE videos
        SET views_count = COALESCE(views_count, 0) + 1
        WHERE id = $1
        RETURNING views_count::BIGINT
        "#,
    )
    .bind(video_id)
    .fetch_optional(pool)
    .await
}

/// Videos uploaded by `user_id`, active or not, newest first.
pub async fn list_by_owner(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<VideoDetailRow>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {VIDEO_COLUMNS},
               u.name AS user_name,
               {COUNTER_COLUMNS}
        FROM videos v
        LEFT JOIN users u ON u.id = v.user_id
        WHERE v.user_id = $1
        ORDER BY v.created_at DESC NULLS LAST, v.id DESC
        "#
    );

    sqlx::query_as::<_, VideoDetailRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn find_owned(
    pool: &PgPool,
    user_id: i64,
    video_id: i64,
) -> Result<Option<VideoDetailRow>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {VIDEO_COLUMNS},
               u.name AS user_name,
               {COUNTER_COLUMNS}
        FROM videos v
        LEFT JOIN users u ON u.id = v.user_id
        WHERE v.id = $1 AND v.user_id = $2
        "#
    );

    sqlx::query_as::<_, VideoDetailRow>(&sql)
        .bind(video_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
