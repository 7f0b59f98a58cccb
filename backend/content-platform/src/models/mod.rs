/// Data models for the content platform
///
/// Row types map one-to-one onto query results (`sqlx::FromRow`); the
/// response types are what handlers serialize.
use chrono::{DateTime, Utc};
use media_core::{MediaKind, MediaPaths};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::feed_ranking::Rankable;

// =====================================================================
// Videos
// =====================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Video {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub is_active: bool,
    pub views_count: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MediaPaths for Video {
    fn media_kind(&self) -> MediaKind {
        MediaKind::Video
    }

    fn primary_media_path(&self) -> Option<&str> {
        Some(self.video_url.as_str()).filter(|p| !p.trim().is_empty())
    }

    fn thumbnail_path(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }
}

/// A feed candidate: the video, its author, counters and latest comment.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoFeedRow {
    #[sqlx(flatten)]
    pub video: Video,
    pub user_name: Option<String>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub last_comment_id: Option<i64>,
    pub last_comment_content: Option<String>,
    pub last_comment_created_at: Option<DateTime<Utc>>,
    pub last_comment_user_id: Option<i64>,
    pub last_comment_user_name: Option<String>,
}

impl Rankable for VideoFeedRow {
    fn rank_id(&self) -> i64 {
        self.video.id
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.video.created_at
    }

    fn views_count(&self) -> i64 {
        self.video.views_count
    }

    fn likes_count(&self) -> Option<i64> {
        Some(self.likes_count)
    }

    fn comments_count(&self) -> Option<i64> {
        Some(self.comments_count)
    }
}

impl VideoFeedRow {
    pub fn author(&self) -> Option<UserSummary> {
        author_summary(self.video.user_id, self.user_name.as_deref())
    }

    pub fn last_comment(&self) -> Option<CommentSummary> {
        let id = self.last_comment_id?;
        Some(CommentSummary {
            id,
            content: self.last_comment_content.clone().unwrap_or_default(),
            created_at: self.last_comment_created_at,
            user: author_summary(
                self.last_comment_user_id,
                self.last_comment_user_name.as_deref(),
            ),
        })
    }
}

/// A single video with its author and counters.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoDetailRow {
    #[sqlx(flatten)]
    pub video: Video,
    pub user_name: Option<String>,
    pub likes_count: i64,
    pub comments_count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
}

fn author_summary(id: Option<i64>, name: Option<&str>) -> Option<UserSummary> {
    id.map(|id| UserSummary {
        id,
        name: name.unwrap_or_default().to_string(),
    })
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentSummary {
    pub id: i64,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EngagementOverview {
    pub likes: i64,
    pub comments: i64,
    pub views: i64,
    pub ranking_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedVideo {
    #[serde(flatten)]
    pub video: Video,
    pub user: Option<UserSummary>,
    pub likes_count: i64,
    pub comments_count: i64,
    pub ranking_score: Option<f64>,
    pub is_liked_by_viewer: bool,
    pub engagement_overview: EngagementOverview,
    pub last_comment: Option<CommentSummary>,
}

impl FeedVideo {
    pub fn from_row(row: VideoFeedRow, ranking_score: Option<f64>, liked: bool) -> Self {
        let user = row.author();
        let last_comment = row.last_comment();

        Self {
            user,
            likes_count: row.likes_count,
            comments_count: row.comments_count,
            ranking_score,
            is_liked_by_viewer: liked,
            engagement_overview: EngagementOverview {
                likes: row.likes_count,
                comments: row.comments_count,
                views: row.video.views_count,
                ranking_score,
            },
            last_comment,
            video: row.video,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VideoDetail {
    #[serde(flatten)]
    pub video: Video,
    pub user: Option<UserSummary>,
    pub likes_count: i64,
    pub comments_count: i64,
}

impl From<VideoDetailRow> for VideoDetail {
    fn from(row: VideoDetailRow) -> Self {
        Self {
            user: author_summary(row.video.user_id, row.user_name.as_deref()),
            likes_count: row.likes_count,
            comments_count: row.comments_count,
            video: row.video,
        }
    }
}

/// Review state of an uploaded video as seen by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Accepted,
    Pending,
}

impl ReviewStatus {
    pub fn from_active(is_active: bool) -> Self {
        if is_active {
            ReviewStatus::Accepted
        } else {
            ReviewStatus::Pending
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OwnedVideo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub views_count: i64,
    pub likes_count: i64,
    pub comments_count: i64,
    pub status: ReviewStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<VideoDetailRow> for OwnedVideo {
    fn from(row: VideoDetailRow) -> Self {
        let video = row.video;
        Self {
            id: video.id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            views_count: video.views_count,
            likes_count: row.likes_count,
            comments_count: row.comments_count,
            status: ReviewStatus::from_active(video.is_active),
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LikeStatus {
    pub liked: bool,
    pub likes_count: i64,
}

// =====================================================================
// Subjects and lessons
// =====================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub is_active: bool,
    pub lessons_count: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Lesson {
    pub id: i64,
    pub subject_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub video_path: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: Option<i64>,
    pub order: i64,
    pub is_active: bool,
    pub views_count: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MediaPaths for Lesson {
    fn media_kind(&self) -> MediaKind {
        MediaKind::Lesson
    }

    fn primary_media_path(&self) -> Option<&str> {
        self.video_path.as_deref().filter(|p| !p.trim().is_empty())
    }

    fn thumbnail_path(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }
}

/// A lesson joined with the fields of its subject needed for access checks.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LessonRow {
    #[sqlx(flatten)]
    pub lesson: Lesson,
    pub subject_name: String,
    pub subject_is_active: bool,
}

impl LessonRow {
    /// Lessons are only visible while both they and their subject are active.
    pub fn is_visible(&self) -> bool {
        self.lesson.is_active && self.subject_is_active
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubjectRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LessonDetail {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration: Option<i64>,
    pub views_count: i64,
    pub order: i64,
    pub subject: SubjectRef,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubjectDetail {
    #[serde(flatten)]
    pub subject: Subject,
    pub lessons: Vec<Lesson>,
}

// =====================================================================
// Podcasts
// =====================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Podcast {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: String,
    pub audio_url: String,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub plays_count: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MediaPaths for Podcast {
    fn media_kind(&self) -> MediaKind {
        MediaKind::Podcast
    }

    fn primary_media_path(&self) -> Option<&str> {
        Some(self.audio_url.as_str()).filter(|p| !p.trim().is_empty())
    }

    fn thumbnail_path(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }
}

impl Podcast {
    /// Filename offered to clients downloading the episode.
    pub fn download_filename(&self) -> String {
        let extension = std::path::Path::new(&self.audio_url)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp3");
        let stem: String = self
            .title
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let stem = stem.trim_matches('_');
        let stem = if stem.is_empty() { "podcast" } else { stem };
        format!("{}.{}", stem, extension)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PodcastRow {
    #[sqlx(flatten)]
    pub podcast: Podcast,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PodcastDetail {
    #[serde(flatten)]
    pub podcast: Podcast,
    pub user: Option<UserSummary>,
    /// Public URL of the audio file
    pub audio_public_url: String,
    pub thumbnail_public_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayCount {
    pub plays_count: i64,
}

impl PodcastRow {
    pub fn author(&self) -> Option<UserSummary> {
        author_summary(self.podcast.user_id, self.user_name.as_deref())
    }
}

// =====================================================================
// Pagination
// =====================================================================

/// Page envelope shared by every list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub current_page: u32,
    pub data: Vec<T>,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl<T> Paginated<T> {
    /// Wrap one already-fetched page.
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let page = page.max(1);
        let last_page = total.div_ceil(u64::from(per_page)).max(1) as u32;
        let offset = u64::from(page - 1) * u64::from(per_page);
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            (Some(offset + 1), Some(offset + data.len() as u64))
        };

        Self {
            current_page: page,
            data,
            per_page,
            total,
            last_page,
            from,
            to,
        }
    }

    /// Cut page `page` out of the full, already ordered result set.
    pub fn from_ordered(all: Vec<T>, page: u32, per_page: u32) -> Self {
        let total = all.len() as u64;
        Self::from_ordered_with_total(all, page, per_page, total)
    }

    /// Like [`from_ordered`](Self::from_ordered) when `ordered` is a capped
    /// prefix of a larger set of `total` rows. Pages past the prefix are empty.
    pub fn from_ordered_with_total(ordered: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let page = page.max(1);
        let offset = (u64::from(page - 1) * u64::from(per_page)).min(ordered.len() as u64) as usize;
        let data: Vec<T> = ordered
            .into_iter()
            .skip(offset)
            .take(per_page as usize)
            .collect();
        Self::new(data, page, per_page, total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            current_page: self.current_page,
            data: self.data.into_iter().map(f).collect(),
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
            from: self.from,
            to: self.to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn podcast(title: &str, audio_url: &str) -> Podcast {
        Podcast {
            id: 1,
            user_id: None,
            title: title.to_string(),
            audio_url: audio_url.to_string(),
            thumbnail_url: None,
            category: None,
            description: None,
            is_active: true,
            plays_count: 0,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_pagination_slices() {
        let page = Paginated::from_ordered((1..=45).collect::<Vec<i32>>(), 3, 20);
        assert_eq!(page.data, vec![41, 42, 43, 44, 45]);
        assert_eq!(page.total, 45);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.from, Some(41));
        assert_eq!(page.to, Some(45));
    }

    #[test]
    fn test_pagination_past_end() {
        let page = Paginated::from_ordered(vec![1, 2, 3], 9, 2);
        assert!(page.data.is_empty());
        assert_eq!(page.current_page, 9);
        assert_eq!(page.last_page, 2);
        assert_eq!(page.from, None);
    }

    #[test]
    fn test_capped_prefix_reports_full_total() {
        let page = Paginated::from_ordered_with_total((1..=30).collect::<Vec<i32>>(), 2, 20, 2_500);
        assert_eq!(page.data, (21..=30).collect::<Vec<i32>>());
        assert_eq!(page.total, 2_500);
        assert_eq!(page.last_page, 125);
        assert_eq!(page.from, Some(21));
        assert_eq!(page.to, Some(30));

        let beyond = Paginated::from_ordered_with_total((1..=30).collect::<Vec<i32>>(), 3, 20, 2_500);
        assert!(beyond.data.is_empty());
        assert_eq!(beyond.total, 2_500);
    }

    #[test]
    fn test_pagination_empty() {
        let page: Paginated<i32> = Paginated::from_ordered(Vec::new(), 1, 20);
        assert_eq!(page.total, 0);
        assert_eq!(page.last_page, 1);
        assert_eq!(page.to, None);
    }

    #[test]
    fn test_review_status() {
        assert_eq!(ReviewStatus::from_active(true), ReviewStatus::Accepted);
        assert_eq!(
            serde_json::to_value(ReviewStatus::from_active(false)).unwrap(),
            "pending"
        );
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(
            podcast("Episode 1: Intro", "podcasts/ep1.m4a").download_filename(),
            "Episode_1__Intro.m4a"
        );
        assert_eq!(podcast("???", "podcasts/raw").download_filename(), "podcast.mp3");
    }

    #[test]
    fn test_blank_media_path_is_absent() {
        assert_eq!(podcast("x", "  ").primary_media_path(), None);
        assert_eq!(podcast("x", "a.mp3").media_kind(), MediaKind::Podcast);
    }
}
