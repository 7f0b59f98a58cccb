use actix_web::{web, HttpRequest, HttpResponse};
use sqlx::PgPool;

use crate::config::StorageConfig;
use crate::db::lesson_repo;
use crate::error::{AppError, Result};
use crate::models::{LessonDetail, LessonRow, SubjectDetail, SubjectRef};
use crate::services::MediaService;

pub async fn list_subjects(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let subjects = lesson_repo::list_active_subjects(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": subjects })))
}

/// An active subject with its active lessons in order.
pub async fn get_subject(path: web::Path<i64>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let subject_id = path.into_inner();

    let subject = lesson_repo::find_active_subject(pool.get_ref(), subject_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Subject not found".to_string()))?;
    let lessons = lesson_repo::list_active_lessons(pool.get_ref(), subject_id).await?;

    Ok(HttpResponse::Ok().json(SubjectDetail { subject, lessons }))
}

async fn visible_lesson(pool: &PgPool, lesson_id: i64) -> Result<LessonRow> {
    lesson_repo::find_lesson(pool, lesson_id)
        .await?
        .filter(LessonRow::is_visible)
        .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))
}

pub async fn get_lesson(
    path: web::Path<i64>,
    pool: web::Data<PgPool>,
    storage: web::Data<StorageConfig>,
) -> Result<HttpResponse> {
    let lesson_id = path.into_inner();
    let mut row = visible_lesson(pool.get_ref(), lesson_id).await?;

    if let Some(views) = lesson_repo::increment_views(pool.get_ref(), lesson_id).await? {
        row.lesson.views_count = views;
    }

    let lesson = row.lesson;
    let video_url = storage.media_url(&lesson);
    let thumbnail_url = storage.thumbnail_url(&lesson);
    Ok(HttpResponse::Ok().json(LessonDetail {
        id: lesson.id,
        title: lesson.title,
        description: lesson.description,
        video_url,
        thumbnail_url,
        duration: lesson.duration,
        views_count: lesson.views_count,
        order: lesson.order,
        subject: SubjectRef {
            id: lesson.subject_id,
            name: row.subject_name,
        },
        created_at: lesson.created_at,
    }))
}

pub async fn stream_lesson(
    path: web::Path<i64>,
    http_req: HttpRequest,
    pool: web::Data<PgPool>,
    media: web::Data<MediaService>,
) -> Result<HttpResponse> {
    let row = visible_lesson(pool.get_ref(), path.into_inner()).await?;
    media.stream(&http_req, &row.lesson).await
}
