/// OpenAPI documentation for the content platform
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::models::{
    CommentSummary, EngagementOverview, FeedVideo, Lesson, LessonDetail, LikeStatus, OwnedVideo,
    PlayCount, Podcast, PodcastDetail, ReviewStatus, Subject, SubjectDetail, SubjectRef,
    UserSummary, Video, VideoDetail,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Content Platform API",
        version = "1.0.0",
        description = "Videos, lessons and podcasts. Serves a seeded, engagement-ranked video feed and range-aware streaming of stored media.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    components(schemas(
        Video,
        VideoDetail,
        FeedVideo,
        OwnedVideo,
        ReviewStatus,
        EngagementOverview,
        CommentSummary,
        UserSummary,
        LikeStatus,
        Subject,
        SubjectDetail,
        SubjectRef,
        Lesson,
        LessonDetail,
        Podcast,
        PodcastDetail,
        PlayCount,
    )),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "videos", description = "Video feed, detail, likes and streaming"),
        (name = "lessons", description = "Subjects, lessons and lesson streaming"),
        (name = "podcasts", description = "Podcast listing, plays, streaming and download"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("HS256 bearer token; optional except for own videos and likes"))
                        .build(),
                ),
            )
        }
    }
}

impl ApiDoc {
    pub fn openapi_json_path() -> &'static str {
        "/api/v1/openapi.json"
    }
}
