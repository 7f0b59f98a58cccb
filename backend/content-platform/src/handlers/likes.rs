use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use tracing::info;

use crate::db::{like_repo, video_repo};
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::LikeStatus;

async fn ensure_active_video(pool: &PgPool, video_id: i64) -> Result<()> {
    video_repo::find_video(pool, video_id)
        .await?
        .filter(|v| v.is_active)
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
}

/// Like the video, or remove an existing like.
pub async fn toggle_like(
    user: UserId,
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    ensure_active_video(pool.get_ref(), video_id).await?;

    let liked = like_repo::toggle_like(pool.get_ref(), user.0, video_id).await?;
    let likes_count = like_repo::count_likes(pool.get_ref(), video_id).await?;

    info!(user_id = user.0, video_id, liked, "like toggled");

    Ok(HttpResponse::Ok().json(LikeStatus { liked, likes_count }))
}

pub async fn like_status(
    user: UserId,
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();
    ensure_active_video(pool.get_ref(), video_id).await?;

    let liked = like_repo::is_liked(pool.get_ref(), user.0, video_id).await?;
    let likes_count = like_repo::count_likes(pool.get_ref(), video_id).await?;

    Ok(HttpResponse::Ok().json(LikeStatus { liked, likes_count }))
}
