use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::FeedConfig;
use crate::db::{contains_pattern, like_repo, video_repo};
use crate::error::{AppError, Result};
use crate::metrics::feed::{FEED_CANDIDATE_COUNT, FEED_ORDERING_DURATION_SECONDS, FEED_REQUEST_TOTAL};
use crate::middleware::UserId;
use crate::models::{FeedVideo, OwnedVideo, Paginated, VideoDetail};
use crate::services::feed_ranking::{self, fallback_seed, round_score, FeedMode};
use crate::services::MediaService;

#[derive(Debug, Default, Deserialize)]
pub struct FeedQueryParams {
    pub seed: Option<String>,
    pub mode: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub per_page: Option<i64>,
    pub page: Option<i64>,
    pub search: Option<String>,
}

impl FeedQueryParams {
    pub(crate) fn per_page(&self, config: &FeedConfig) -> u32 {
        self.per_page
            .unwrap_or_else(|| i64::from(config.default_per_page))
            .clamp(1, i64::from(config.max_per_page)) as u32
    }

    pub(crate) fn page(&self) -> u32 {
        self.page.unwrap_or(1).clamp(1, i64::from(u32::MAX)) as u32
    }

    pub(crate) fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern)
    }

    /// Resolve the ordering mode, seeding ranked mode from the caller's
    /// identity when no seed was supplied.
    pub(crate) fn mode(&self, viewer: Option<UserId>, client_ip: Option<&str>) -> FeedMode {
        let seed = self
            .seed
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| fallback_seed(viewer.map(|u| u.0), client_ip));

        FeedMode::from_query(
            self.mode.as_deref(),
            self.sort.as_deref(),
            self.order.as_deref(),
            seed,
        )
    }
}

/// Row offset of `page` for SQL paging.
fn page_offset(page: u32, per_page: u32) -> i64 {
    i64::from(page.saturating_sub(1)) * i64::from(per_page)
}

pub struct FeedHandlerState {
    pub feed: FeedConfig,
}

/// List active videos for the feed.
pub async fn list_videos(
    query: web::Query<FeedQueryParams>,
    http_req: HttpRequest,
    viewer: Option<UserId>,
    pool: web::Data<PgPool>,
    state: web::Data<FeedHandlerState>,
) -> Result<HttpResponse> {
    let client_ip = http_req
        .connection_info()
        .realip_remote_addr()
        .map(str::to_string);
    let mode = query.mode(viewer, client_ip.as_deref());
    let per_page = query.per_page(&state.feed);
    let page = query.page();
    let pattern = query.search_pattern();

    debug!(%mode, page, per_page, search = pattern.is_some(), "feed request");

    let total = video_repo::count_feed_videos(pool.get_ref(), pattern.as_deref()).await?;
    let label = mode.label();
    FEED_REQUEST_TOTAL.with_label_values(&[label]).inc();

    let page = match video_repo::feed_order_by(&mode) {
        Some(order_by) => {
            let rows = video_repo::list_feed_page(
                pool.get_ref(),
                pattern.as_deref(),
                &order_by,
                i64::from(per_page),
                page_offset(page, per_page),
            )
            .await?;
            FEED_CANDIDATE_COUNT
                .with_label_values(&[label])
                .observe(rows.len() as f64);
            Paginated::new(feed_ranking::unscored(rows), page, per_page, total.max(0) as u64)
        }
        None => {
            let candidates = video_repo::list_feed_candidates(
                pool.get_ref(),
                pattern.as_deref(),
                state.feed.max_candidates,
            )
            .await?;
            FEED_CANDIDATE_COUNT
                .with_label_values(&[label])
                .observe(candidates.len() as f64);

            let start = Instant::now();
            let ordered = feed_ranking::order(candidates, &mode, Utc::now(), &state.feed.weights());
            FEED_ORDERING_DURATION_SECONDS
                .with_label_values(&[label])
                .observe(start.elapsed().as_secs_f64());

            Paginated::from_ordered_with_total(ordered, page, per_page, total.max(0) as u64)
        }
    };

    let liked: HashSet<i64> = match viewer {
        Some(UserId(user_id)) => {
            let ids: Vec<i64> = page.data.iter().map(|r| r.item.video.id).collect();
            like_repo::liked_video_ids(pool.get_ref(), user_id, &ids).await?
        }
        None => HashSet::new(),
    };

    let response = page.map(|ranked| {
        let liked = liked.contains(&ranked.item.video.id);
        FeedVideo::from_row(ranked.item, ranked.ranking_score.map(round_score), liked)
    });

    Ok(HttpResponse::Ok().json(response))
}

/// Show one active video and count the view.
pub async fn get_video(
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();

    let mut row = video_repo::find_video_detail(pool.get_ref(), video_id)
        .await?
        .filter(|row| row.video.is_active)
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    if let Some(views) = video_repo::increment_views(pool.get_ref(), video_id).await? {
        row.video.views_count = views;
    }

    Ok(HttpResponse::Ok().json(VideoDetail::from(row)))
}

pub async fn stream_video(
    path: web::Path<i64>,
    http_req: HttpRequest,
    pool: web::Data<PgPool>,
    media: web::Data<MediaService>,
) -> Result<HttpResponse> {
    let video_id = path.into_inner();

    let video = video_repo::find_video(pool.get_ref(), video_id)
        .await?
        .filter(|v| v.is_active)
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    media.stream(&http_req, &video).await
}

/// The caller's own uploads, including those still awaiting review.
pub async fn my_videos(user: UserId, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let videos: Vec<OwnedVideo> = video_repo::list_by_owner(pool.get_ref(), user.0)
        .await?
        .into_iter()
        .map(OwnedVideo::from)
        .collect();

    info!(user_id = user.0, count = videos.len(), "listed own videos");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": videos })))
}

pub async fn my_video(
    user: UserId,
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let row = video_repo::find_owned(pool.get_ref(), user.0, path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    Ok(HttpResponse::Ok().json(OwnedVideo::from(row)))
}
