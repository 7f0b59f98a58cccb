//! Feed ordering.
//!
//! Ranked mode blends four signals into one score:
//!
//! ```text
//! score = recency * 0.4 + virality * 0.4 + baseline * 0.15 + tiebreak * 0.05
//! ```
//!
//! The tiebreak is a pseudo-random value in `[0, 1)` derived from the
//! caller's seed and the item id, so the same seed always produces the same
//! order while different seeds shuffle items of similar quality.
//! Chronological and field modes are plain sorts and carry no score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Anything the feed can order.
pub trait Rankable {
    fn rank_id(&self) -> i64;
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn views_count(&self) -> i64;

    fn likes_count(&self) -> Option<i64> {
        None
    }

    fn comments_count(&self) -> Option<i64> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingWeights {
    pub recency: f64,
    pub virality: f64,
    pub baseline: f64,
    pub tiebreak: f64,
    pub like_weight: f64,
    pub comment_weight: f64,
    /// Views at which the baseline signal saturates
    pub baseline_cap: i64,
    /// Modulus of the tiebreak hash
    pub prime: u64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            recency: 0.4,
            virality: 0.4,
            baseline: 0.15,
            tiebreak: 0.05,
            like_weight: 1.5,
            comment_weight: 2.0,
            baseline_cap: 5_000,
            prime: 9_973,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    ViewsCount,
    LikesCount,
    CommentsCount,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::ViewsCount => "views_count",
            SortField::LikesCount => "likes_count",
            SortField::CommentsCount => "comments_count",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "created_at" => Ok(SortField::CreatedAt),
            "views_count" => Ok(SortField::ViewsCount),
            "likes_count" => Ok(SortField::LikesCount),
            "comments_count" => Ok(SortField::CommentsCount),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedMode {
    Ranked { seed: String },
    Chronological { direction: SortDirection },
    Field { field: SortField, direction: SortDirection },
}

impl FeedMode {
    /// Resolve caller query parameters into a mode.
    ///
    /// `mode=chronological` wins over everything else, then a recognised
    /// `sort` field. Anything else is ranked with `seed`.
    pub fn from_query(
        mode: Option<&str>,
        sort: Option<&str>,
        order: Option<&str>,
        seed: String,
    ) -> Self {
        let direction = order
            .and_then(|o| o.parse::<SortDirection>().ok())
            .unwrap_or_default();

        if mode.is_some_and(|m| m.trim().eq_ignore_ascii_case("chronological")) {
            return FeedMode::Chronological { direction };
        }

        if let Some(field) = sort.and_then(|s| s.parse::<SortField>().ok()) {
            return FeedMode::Field { field, direction };
        }

        FeedMode::Ranked { seed }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeedMode::Ranked { .. } => "ranked",
            FeedMode::Chronological { .. } => "chronological",
            FeedMode::Field { .. } => "field",
        }
    }
}

impl fmt::Display for FeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedMode::Ranked { seed } => write!(f, "ranked(seed={})", seed),
            FeedMode::Chronological { direction } => write!(f, "chronological({:?})", direction),
            FeedMode::Field { field, direction } => {
                write!(f, "field({} {:?})", field.as_str(), direction)
            }
        }
    }
}

/// Seed used when the caller did not supply one.
pub fn fallback_seed(user_id: Option<i64>, client_ip: Option<&str>) -> String {
    match user_id {
        Some(id) => format!("user-{}", id),
        None => format!("anon-{}", client_ip.unwrap_or("unknown")),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    /// Only present in ranked mode
    pub ranking_score: Option<f64>,
}

/// Per-signal contributions of a ranked score, before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub recency: f64,
    pub virality: f64,
    pub baseline: f64,
    pub tiebreak: f64,
}

impl ScoreBreakdown {
    pub fn total(&self, weights: &RankingWeights) -> f64 {
        self.recency * weights.recency
            + self.virality * weights.virality
            + self.baseline * weights.baseline
            + self.tiebreak * weights.tiebreak
    }
}

/// Map a seed onto `[1, prime]`.
pub fn seed_multiplier(seed: &str, prime: u64) -> u64 {
    let digest = Sha256::digest(seed.as_bytes());
    let hash = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    (u64::from(hash) % prime.max(1)) + 1
}

/// Deterministic value in `[0, 1)` for an item under a seed multiplier.
pub fn tiebreak(multiplier: u64, id: i64, prime: u64) -> f64 {
    let p = i128::from(prime.max(1));
    let product = i128::from(multiplier) * i128::from(id);
    (((product % p) + p) % p) as f64 / p as f64
}

fn hours_since(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    created_at
        .map(|t| (now - t).num_milliseconds() as f64 / 3_600_000.0)
        .unwrap_or(0.0)
        .max(0.0)
}

pub fn score_breakdown<T: Rankable>(
    item: &T,
    multiplier: u64,
    now: DateTime<Utc>,
    weights: &RankingWeights,
) -> ScoreBreakdown {
    let views = item.views_count().max(0);
    let likes = item.likes_count().unwrap_or(0).max(0);
    let comments = item.comments_count().unwrap_or(0).max(0);
    let cap = weights.baseline_cap.max(1);

    ScoreBreakdown {
        recency: 1.0 / (hours_since(item.created_at(), now) + 1.0),
        virality: (likes as f64 * weights.like_weight + comments as f64 * weights.comment_weight)
            / views.max(1) as f64,
        baseline: views.min(cap) as f64 / cap as f64,
        tiebreak: tiebreak(multiplier, item.rank_id(), weights.prime),
    }
}

pub fn score<T: Rankable>(
    item: &T,
    multiplier: u64,
    now: DateTime<Utc>,
    weights: &RankingWeights,
) -> f64 {
    score_breakdown(item, multiplier, now, weights).total(weights)
}

/// Round a score for presentation.
pub fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

fn newest_first<T: Rankable>(a: &T, b: &T) -> Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.rank_id().cmp(&a.rank_id()))
}

/// Score every item under `seed` and sort best first.
///
/// Equal scores fall back to newest first, then highest id.
pub fn rank<T: Rankable>(
    items: Vec<T>,
    seed: &str,
    now: DateTime<Utc>,
    weights: &RankingWeights,
) -> Vec<Ranked<T>> {
    let multiplier = seed_multiplier(seed, weights.prime);

    let mut ranked: Vec<Ranked<T>> = items
        .into_iter()
        .map(|item| {
            let s = score(&item, multiplier, now, weights);
            Ranked {
                item,
                ranking_score: Some(s),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        let sa = a.ranking_score.unwrap_or(0.0);
        let sb = b.ranking_score.unwrap_or(0.0);
        sb.total_cmp(&sa)
            .then_with(|| newest_first(&a.item, &b.item))
    });

    ranked
}

pub fn order<T: Rankable>(
    items: Vec<T>,
    mode: &FeedMode,
    now: DateTime<Utc>,
    weights: &RankingWeights,
) -> Vec<Ranked<T>> {
    match mode {
        FeedMode::Ranked { seed } => rank(items, seed, now, weights),
        FeedMode::Chronological { direction } => {
            let mut items = items;
            items.sort_by(|a, b| {
                direction.apply(
                    a.created_at()
                        .cmp(&b.created_at())
                        .then_with(|| a.rank_id().cmp(&b.rank_id())),
                )
            });
            unscored(items)
        }
        FeedMode::Field { field, direction } => {
            let mut items = items;
            items.sort_by(|a, b| {
                let primary = match field {
                    SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
                    SortField::ViewsCount => a.views_count().cmp(&b.views_count()),
                    SortField::LikesCount => a.likes_count().cmp(&b.likes_count()),
                    SortField::CommentsCount => a.comments_count().cmp(&b.comments_count()),
                };
                direction
                    .apply(primary)
                    .then_with(|| newest_first(a, b))
            });
            unscored(items)
        }
    }
}

/// Wrap items that were ordered elsewhere, without a score.
pub fn unscored<T>(items: Vec<T>) -> Vec<Ranked<T>> {
    items
        .into_iter()
        .map(|item| Ranked {
            item,
            ranking_score: None,
        })
        .collect()
}
