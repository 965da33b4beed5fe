//! Prometheus metrics for the activity stream and image views

use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

static ACTIVITY_RECORDS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bookmarks_activity_records_total",
        "Activity record attempts by outcome (recorded/suppressed)",
        &["outcome"]
    )
    .expect("Failed to register activity records metric")
});

static IMAGE_VIEWS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("bookmarks_image_views_total", "Total image detail views")
        .expect("Failed to register image views metric")
});

static FOLLOW_CHANGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bookmarks_follow_changes_total",
        "Follow edges created or removed",
        &["action"]
    )
    .expect("Failed to register follow changes metric")
});

static LIKE_CHANGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bookmarks_like_changes_total",
        "Image likes added or removed",
        &["action"]
    )
    .expect("Failed to register like changes metric")
});

/// Record the outcome of an activity record call
pub fn record_activity(recorded: bool) {
    let outcome = if recorded { "recorded" } else { "suppressed" };
    ACTIVITY_RECORDS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_image_view() {
    IMAGE_VIEWS_TOTAL.inc();
}

/// `action` is "follow" or "unfollow"
pub fn record_follow_change(action: &str) {
    FOLLOW_CHANGES_TOTAL.with_label_values(&[action]).inc();
}

/// `action` is "like" or "unlike"
pub fn record_like_change(action: &str) {
    LIKE_CHANGES_TOTAL.with_label_values(&[action]).inc();
}

/// Render every registered metric in the Prometheus text format
pub fn render() -> Result<String, prometheus::Error> {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
