use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::debug;

use crate::config::StorageConfig;
use crate::db::podcast_repo;
use crate::error::{AppError, Result};
use crate::models::{Paginated, PlayCount, PodcastDetail, PodcastRow};
use crate::services::MediaService;

pub const PODCASTS_PER_PAGE: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct PodcastQueryParams {
    pub category: Option<String>,
    pub page: Option<i64>,
}

fn detail(row: PodcastRow, storage: &StorageConfig) -> PodcastDetail {
    let user = row.author();
    let podcast = row.podcast;
    PodcastDetail {
        user,
        audio_public_url: storage.public_url_for(&podcast.audio_url),
        thumbnail_public_url: storage.thumbnail_url(&podcast),
        podcast,
    }
}

async fn active_podcast(pool: &PgPool, podcast_id: i64) -> Result<PodcastRow> {
    podcast_repo::find_podcast(pool, podcast_id)
        .await?
        .filter(|row| row.podcast.is_active)
        .ok_or_else(|| AppError::NotFound("Podcast not found".to_string()))
}

/// Active podcasts, newest first, optionally filtered by category.
pub async fn list_podcasts(
    query: web::Query<PodcastQueryParams>,
    pool: web::Data<PgPool>,
    storage: web::Data<StorageConfig>,
) -> Result<HttpResponse> {
    let page = query.page.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32;
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let offset = i64::from(page - 1) * i64::from(PODCASTS_PER_PAGE);

    debug!(page, category = ?category, "podcast list request");

    let (rows, total) = podcast_repo::list_active(
        pool.get_ref(),
        category,
        i64::from(PODCASTS_PER_PAGE),
        offset,
    )
    .await?;

    let data = rows
        .into_iter()
        .map(|row| detail(row, storage.get_ref()))
        .collect();
    let response = Paginated::new(data, page, PODCASTS_PER_PAGE, total.max(0) as u64);

    Ok(HttpResponse::Ok().json(response))
}

pub async fn get_podcast(
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
    storage: web::Data<StorageConfig>,
) -> Result<HttpResponse> {
    let row = active_podcast(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail(row, storage.get_ref())))
}

/// Record one play.
pub async fn play_podcast(path: web::Path<i64>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let plays_count = podcast_repo::increment_plays(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Podcast not found".to_string()))?;

    Ok(HttpResponse::Ok().json(PlayCount { plays_count }))
}

pub async fn stream_podcast(
    path: web::Path<i64>,
    http_req: HttpRequest,
    pool: web::Data<PgPool>,
    media: web::Data<MediaService>,
) -> Result<HttpResponse> {
    let row = active_podcast(pool.get_ref(), path.into_inner()).await?;
    media.stream(&http_req, &row.podcast).await
}

pub async fn download_podcast(
    path: web::Path<i64>,
    http_req: HttpRequest,
    pool: web::Data<PgPool>,
    media: web::Data<MediaService>,
) -> Result<HttpResponse> {
    let row = active_podcast(pool.get_ref(), path.into_inner()).await?;
    let filename = row.podcast.download_filename();
    media.download(&http_req, &row.podcast, filename).await
}
