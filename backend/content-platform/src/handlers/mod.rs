/// HTTP handlers
///
/// - Videos: feed, detail, streaming and the caller's own uploads
/// - Likes: toggle and status per video
/// - Lessons: subjects, lesson detail and streaming
/// - Podcasts: listing, detail, plays, streaming and download
pub mod lessons;
pub mod likes;
pub mod podcasts;
pub mod videos;

use actix_web::web;

use crate::error::AppError;

pub use videos::{FeedHandlerState, FeedQueryParams};

/// Query strings that fail to deserialize render as JSON 400s.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Non-numeric ids in the path render as JSON 400s.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Register every content route. Mounted under `/api/v1` by the binary.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .app_data(path_config());

    cfg.service(
        web::scope("/videos")
            .route("", web::get().to(videos::list_videos))
            .route("/mine", web::get().to(videos::my_videos))
            .route("/mine/{video_id}", web::get().to(videos::my_video))
            .route("/{video_id}", web::get().to(videos::get_video))
            .route("/{video_id}/stream", web::get().to(videos::stream_video))
            .route("/{video_id}/toggle-like", web::post().to(likes::toggle_like))
            .route("/{video_id}/like-status", web::get().to(likes::like_status)),
    )
    .service(
        web::scope("/subjects")
            .route("", web::get().to(lessons::list_subjects))
            .route("/{subject_id}", web::get().to(lessons::get_subject)),
    )
    .service(
        web::scope("/lessons")
            .route("/{lesson_id}", web::get().to(lessons::get_lesson))
            .route("/{lesson_id}/stream", web::get().to(lessons::stream_lesson)),
    )
    .service(
        web::scope("/podcasts")
            .route("", web::get().to(podcasts::list_podcasts))
            .route("/{podcast_id}", web::get().to(podcasts::get_podcast))
            .route("/{podcast_id}/play", web::post().to(podcasts::play_podcast))
            .route("/{podcast_id}/stream", web::get().to(podcasts::stream_podcast))
            .route(
                "/{podcast_id}/download",
                web::get().to(podcasts::download_podcast),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App, HttpResponse};

    async fn echo_page(query: web::Query<FeedQueryParams>) -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({ "page": query.page }))
    }

    async fn echo_id(path: web::Path<i64>) -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({ "id": path.into_inner() }))
    }

    #[actix_web::test]
    async fn test_malformed_query_is_json_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(query_config())
                .route("/videos", web::get().to(echo_page)),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/videos?per_page=lots")
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], 400);
        assert!(body["error"].as_str().unwrap().starts_with("Bad request"));

        let ok = test::call_service(
            &app,
            test::TestRequest::get().uri("/videos?page=2").to_request(),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_non_numeric_id_is_json_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(path_config())
                .route("/videos/{video_id}", web::get().to(echo_id)),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/videos/abc").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], 400);
    }
}
