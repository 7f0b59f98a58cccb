use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

lazy_static! {
    /// Feed requests served, by mode (ranked, chronological, field).
    pub static ref FEED_REQUEST_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feed_request_total",
        "Total feed requests segmented by ordering mode",
        &["mode"]
    )
    .expect("failed to register feed_request_total");

    /// Time spent ordering candidates in memory.
    pub static ref FEED_ORDERING_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "feed_ordering_duration_seconds",
        "Feed ordering duration segmented by ordering mode",
        &["mode"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]
    )
    .expect("failed to register feed_ordering_duration_seconds");

    pub static ref FEED_CANDIDATE_COUNT: HistogramVec = register_histogram_vec!(
        "feed_candidate_count",
        "Number of feed candidates loaded per request",
        &["mode"],
        vec![0.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 2000.0, 5000.0]
    )
    .expect("failed to register feed_candidate_count");
}
