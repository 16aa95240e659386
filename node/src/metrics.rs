//! Prometheus metrics for the Unswachh node.
//!
//! The [`NodeMetrics`] struct owns a dedicated [`Registry`]; [`NodeMetrics::render`]
//! encodes it into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_with_registry, Encoder, Histogram,
    HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Central collection of all node-level Prometheus metrics.
pub struct NodeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Reports accepted into review.
    pub submissions_accepted: IntCounter,
    /// Rejected or failed submissions, by reason.
    pub submissions_rejected: IntCounterVec,
    /// Vote casts, by outcome kind (cast, already_voted, flipped).
    pub votes_cast: IntCounterVec,
    /// Moderation actions, by action (approve, remove, login_failed).
    pub moderation_actions: IntCounterVec,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Reports currently public.
    pub approved_reports: IntGauge,
    /// Reports currently waiting for moderation.
    pub in_review_reports: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// End-to-end submission time, in milliseconds.
    pub submission_time_ms: Histogram,
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let submissions_accepted = register_int_counter_with_registry!(
            Opts::new(
                "unswachh_submissions_accepted_total",
                "Reports accepted into review"
            ),
            registry
        )
        .expect("failed to register submissions_accepted counter");

        let submissions_rejected = register_int_counter_vec_with_registry!(
            Opts::new(
                "unswachh_submissions_rejected_total",
                "Submissions rejected or failed, by reason"
            ),
            &["reason"],
            registry
        )
        .expect("failed to register submissions_rejected counter");

        let votes_cast = register_int_counter_vec_with_registry!(
            Opts::new("unswachh_votes_total", "Vote casts by outcome"),
            &["kind"],
            registry
        )
        .expect("failed to register votes_cast counter");

        let moderation_actions = register_int_counter_vec_with_registry!(
            Opts::new(
                "unswachh_moderation_actions_total",
                "Moderation actions by kind"
            ),
            &["action"],
            registry
        )
        .expect("failed to register moderation_actions counter");

        let approved_reports = register_int_gauge_with_registry!(
            Opts::new("unswachh_approved_reports", "Reports currently public"),
            registry
        )
        .expect("failed to register approved_reports gauge");

        let in_review_reports = register_int_gauge_with_registry!(
            Opts::new(
                "unswachh_in_review_reports",
                "Reports waiting for moderation"
            ),
            registry
        )
        .expect("failed to register in_review_reports gauge");

        // Uploads dominate; buckets cover 1 ms to ~32 s.
        let submission_time_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "unswachh_submission_time_ms",
                "Submission time in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(1.0, 2.0, 16).unwrap()),
            registry
        )
        .expect("failed to register submission_time_ms histogram");

        Self {
            registry,
            submissions_accepted,
            submissions_rejected,
            votes_cast,
            moderation_actions,
            approved_reports,
            in_review_reports,
            submission_time_ms,
        }
    }

    /// Encode every metric in the text exposition format.
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buf) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labelled_counters_render() {
        let metrics = NodeMetrics::new();
        metrics.submissions_accepted.inc();
        metrics
            .submissions_rejected
            .with_label_values(&["duplicate_nearby"])
            .inc();
        metrics.approved_reports.set(3);

        let text = metrics.render();
        assert!(text.contains("unswachh_submissions_accepted_total 1"));
        assert!(text.contains("reason=\"duplicate_nearby\""));
        assert!(text.contains("unswachh_approved_reports 3"));
    }
}
