use chrono::{DateTime, Duration, Utc};
use content_platform::models::{FeedVideo, Paginated, Video, VideoFeedRow};
use content_platform::services::feed_ranking::{
    order, rank, round_score, FeedMode, RankingWeights, SortDirection,
};

fn row(id: i64, created_at: DateTime<Utc>, views: i64, likes: i64, comments: i64) -> VideoFeedRow {
    VideoFeedRow {
        video: Video {
            id,
            user_id: Some(100 + id),
            title: format!("video {}", id),
            description: None,
            video_url: format!("videos/{}.mp4", id),
            thumbnail_url: None,
            is_active: true,
            views_count: views,
            created_at: Some(created_at),
            updated_at: Some(created_at),
        },
        user_name: Some(format!("author {}", id)),
        likes_count: likes,
        comments_count: comments,
        last_comment_id: None,
        last_comment_content: None,
        last_comment_created_at: None,
        last_comment_user_id: None,
        last_comment_user_name: None,
    }
}

fn ids(page: &[content_platform::services::feed_ranking::Ranked<VideoFeedRow>]) -> Vec<i64> {
    page.iter().map(|r| r.item.video.id).collect()
}

#[test]
fn seeded_feed_is_stable_across_requests_and_pages() {
    let now = Utc::now();
    let weights = RankingWeights::default();
    let rows: Vec<VideoFeedRow> = (1..=57)
        .map(|i| row(i, now - Duration::minutes(i * 37), 100 + i * 3, i % 11, i % 5))
        .collect();

    let first = rank(rows.clone(), "test-seed", now, &weights);
    let second = rank(rows, "test-seed", now, &weights);
    assert_eq!(ids(&first), ids(&second));

    // Pages partition the ordered set without gaps or repeats
    let mut seen = Vec::new();
    for page_no in 1..=3 {
        let page = Paginated::from_ordered(first.clone(), page_no, 20);
        assert_eq!(page.total, 57);
        assert_eq!(page.last_page, 3);
        seen.extend(ids(&page.data));
    }
    assert_eq!(seen, ids(&first));
}

#[test]
fn chronological_mode_lists_fresh_upload_first() {
    let now = Utc::now();
    let engaged = row(1, now - Duration::hours(8), 400, 60, 25);
    let fresh = row(2, now - Duration::minutes(10), 10, 0, 0);

    let ordered = order(
        vec![engaged, fresh],
        &FeedMode::Chronological {
            direction: SortDirection::Desc,
        },
        now,
        &RankingWeights::default(),
    );

    assert_eq!(ids(&ordered), vec![2, 1]);
    assert!(ordered[0].ranking_score.is_none());
}

#[test]
fn ranked_scores_follow_the_weighted_formula() {
    let now = Utc::now();
    let weights = RankingWeights {
        tiebreak: 0.0,
        ..RankingWeights::default()
    };
    let engaged = row(1, now - Duration::hours(8), 400, 60, 25);
    let fresh = row(2, now - Duration::minutes(10), 10, 0, 0);

    let ranked = rank(vec![engaged, fresh], "test-seed", now, &weights);
    let score_of = |id: i64| {
        ranked
            .iter()
            .find(|r| r.item.video.id == id)
            .and_then(|r| r.ranking_score)
            .unwrap()
    };

    // 0.4/9 + 0.4*0.35 + 0.15*0.08
    assert!((score_of(1) - 0.196_444).abs() < 1e-4);
    // 0.4/(1 + 1/6) + 0.15*0.002
    assert!((score_of(2) - 0.343_157).abs() < 1e-4);
}

#[test]
fn feed_item_serializes_engagement_overview_and_last_comment() {
    let now = Utc::now();
    let mut item = row(5, now - Duration::hours(1), 20, 1, 2);
    item.last_comment_id = Some(99);
    item.last_comment_content = Some("This is the freshest remark".to_string());
    item.last_comment_created_at = Some(now);
    item.last_comment_user_id = Some(12);
    item.last_comment_user_name = Some("commenter".to_string());

    let weights = RankingWeights {
        tiebreak: 0.0,
        ..RankingWeights::default()
    };
    let ranked = rank(vec![item], "seed", now, &weights);
    let score = ranked[0].ranking_score.map(round_score);
    let ranked_item = ranked.into_iter().next().unwrap();
    let json =
        serde_json::to_value(FeedVideo::from_row(ranked_item.item, score, true)).unwrap();

    assert_eq!(json["id"], 5);
    assert_eq!(json["is_liked_by_viewer"], true);
    assert_eq!(json["engagement_overview"]["likes"], 1);
    assert_eq!(json["engagement_overview"]["comments"], 2);
    assert_eq!(json["engagement_overview"]["views"], 20);
    assert_eq!(json["last_comment"]["content"], "This is the freshest remark");
    assert_eq!(json["last_comment"]["user"]["id"], 12);
    assert_eq!(json["user"]["name"], "author 5");

    // 0.4/2 + 0.4*(1.5 + 4)/20 + 0.15*20/5000
    let surfaced = json["engagement_overview"]["ranking_score"].as_f64().unwrap();
    assert!((surfaced - 0.3106).abs() < 1e-9);
}

#[test]
fn page_envelope_shape() {
    let page = Paginated::new(vec!["a", "b"], 2, 2, 5);
    let json = serde_json::to_value(&page).unwrap();

    assert_eq!(json["current_page"], 2);
    assert_eq!(json["per_page"], 2);
    assert_eq!(json["total"], 5);
    assert_eq!(json["last_page"], 3);
    assert_eq!(json["from"], 3);
    assert_eq!(json["to"], 4);
}
