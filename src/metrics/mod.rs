//! Prometheus metrics for message dispatch.
//!
//! - Message metrics (sent, failed, trapped) labelled by client
//! - Rejections labelled by error kind
//! - Render and delivery latency

mod helpers;

pub use helpers::{encode_metrics, DispatchMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "campaign";

lazy_static! {
    /// Total messages accepted by a client
    pub static ref MESSAGES_SENT_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_messages_sent_total", METRIC_PREFIX),
        "Total messages accepted by a delivery client",
        &["client"]
    ).unwrap();

    /// Total send attempts reported as failed by a client
    pub static ref MESSAGES_FAILED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_messages_failed_total", METRIC_PREFIX),
        "Total delivery failures reported by a client",
        &["client"]
    ).unwrap();

    /// Messages captured by trapping clients
    pub static ref MESSAGES_TRAPPED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_messages_trapped_total", METRIC_PREFIX),
        "Total messages captured in trap mode"
    ).unwrap();

    /// Dispatch calls rejected before reaching a client
    pub static ref DISPATCH_REJECTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_dispatch_rejected_total", METRIC_PREFIX),
        "Total dispatch calls rejected during validation or rendering",
        &["kind"]
    ).unwrap();

    /// Time spent rendering a message
    pub static ref RENDER_DURATION: Histogram = register_histogram!(
        format!("{}_render_duration_seconds", METRIC_PREFIX),
        "Template render duration in seconds",
        vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01]
    ).unwrap();

    /// Time spent inside a transport delivery call
    pub static ref DELIVERY_LATENCY: Histogram = register_histogram!(
        format!("{}_delivery_latency_seconds", METRIC_PREFIX),
        "Transport delivery latency in seconds",
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]
    ).unwrap();
}
