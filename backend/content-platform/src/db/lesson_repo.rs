use crate::models::{Lesson, LessonRow, Subject};
use sqlx::PgPool;

const SUBJECT_COLUMNS: &str = r#"
    s.id, s.name, s.description, s.thumbnail, s.is_active,
    (SELECT COUNT(*) FROM lessons cl WHERE cl.subject_id = s.id) AS lessons_count,
    s.created_at, s.updated_at
"#;

const LESSON_COLUMNS: &str = r#"
    l.id, l.subject_id, l.title, l.description, l.video_path, l.thumbnail,
    l.duration::BIGINT AS duration, COALESCE(l."order", 0)::BIGINT AS "order", l.is_active,
    COALESCE(l.views_count, 0)::BIGINT AS views_count, l.created_at, l.updated_at
"#;

/// Active subjects with their lesson counts, by name.
pub async fn list_active_subjects(pool: &PgPool) -> Result<Vec<Subject>, sqlx::Error> {
    let sql = format!(
        "SELECT {SUBJECT_COLUMNS} FROM subjects s WHERE s.is_active = TRUE ORDER BY s.name, s.id"
    );

    sqlx::query_as::<_, Subject>(&sql).fetch_all(pool).await
}

pub async fn find_active_subject(
    pool: &PgPool,
    subject_id: i64,
) -> Result<Option<Subject>, sqlx::Error> {
    let sql = format!(
        "SELECT {SUBJECT_COLUMNS} FROM subjects s WHERE s.id = $1 AND s.is_active = TRUE"
    );

    sqlx::query_as::<_, Subject>(&sql)
        .bind(subject_id)
        .fetch_optional(pool)
        .await
}

/// Active lessons of a subject in their configured order.
pub async fn list_active_lessons(
    pool: &PgPool,
    subject_id: i64,
) -> Result<Vec<Lesson>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {LESSON_COLUMNS}
        FROM lessons l
        WHERE l.subject_id = $1 AND l.is_active = TRUE
        ORDER BY l."order" ASC, l.id ASC
        "#
    );

    sqlx::query_as::<_, Lesson>(&sql)
        .bind(subject_id)
        .fetch_all(pool)
        .await
}

/// A lesson with its subject's name and activity flag.
pub async fn find_lesson(pool: &PgPool, lesson_id: i64) -> Result<Option<LessonRow>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {LESSON_COLUMNS},
               s.name AS subject_name,
               s.is_active AS subject_is_active
        FROM lessons l
        JOIN subjects s ON s.id = l.subject_id
        WHERE l.id = $1
        "#
    );

    sqlx::query_as::<_, LessonRow>(&sql)
        .bind(lesson_id)
        .fetch_optional(pool)
        .await
}

pub async fn increment_views(pool: &PgPool, lesson_id: i64) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE lessons
        SET views_count = COALESCE(views_count, 0) + 1
        WHERE id = $1
        RETURNING views_count::BIGINT
        "#,
    )
    .bind(lesson_id)
    .fetch_optional(pool)
    .await
}
