//! Metrics helper for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    DELIVERY_LATENCY, DISPATCH_REJECTED_TOTAL, MESSAGES_FAILED_TOTAL, MESSAGES_SENT_TOTAL,
    MESSAGES_TRAPPED_TOTAL, RENDER_DURATION,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording dispatch metrics
pub struct DispatchMetrics;

impl DispatchMetrics {
    /// Record a message accepted by the named client
    pub fn record_sent(client: &str) {
        MESSAGES_SENT_TOTAL.with_label_values(&[client]).inc();
    }

    /// Record a failed send attempt on the named client
    pub fn record_failed(client: &str) {
        MESSAGES_FAILED_TOTAL.with_label_values(&[client]).inc();
    }

    /// Record a message captured in trap mode
    pub fn record_trapped() {
        MESSAGES_TRAPPED_TOTAL.inc();
    }

    /// Record a call rejected before dispatch
    pub fn record_rejected(kind: &str) {
        DISPATCH_REJECTED_TOTAL.with_label_values(&[kind]).inc();
    }

    pub fn observe_render(secs: f64) {
        RENDER_DURATION.observe(secs);
    }

    pub fn observe_delivery(secs: f64) {
        DELIVERY_LATENCY.observe(secs);
    }
}
