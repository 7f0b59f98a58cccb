use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Media stream responses by kind and status (200, 206, 404, 416, ...).
    pub static ref MEDIA_STREAM_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "media_stream_requests_total",
        "Media stream requests segmented by media kind and response status",
        &["kind", "status"]
    )
    .expect("failed to register media_stream_requests_total");

    pub static ref MEDIA_BYTES_STREAMED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "media_bytes_streamed_total",
        "Bytes written to clients segmented by media kind",
        &["kind"]
    )
    .expect("failed to register media_bytes_streamed_total");

    /// Streams that ended with an I/O error after headers were sent.
    pub static ref MEDIA_STREAM_ABORTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "media_stream_aborts_total",
        "Media streams aborted mid-body segmented by media kind",
        &["kind"]
    )
    .expect("failed to register media_stream_aborts_total");
}
