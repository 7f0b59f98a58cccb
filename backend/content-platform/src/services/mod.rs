/// Business logic layer
///
/// - `feed_ranking`: pure ordering of feed candidates
/// - `media`: range-aware serving of stored media files
pub mod feed_ranking;
pub mod media;

pub use feed_ranking::{FeedMode, RankingWeights};
pub use media::MediaService;
