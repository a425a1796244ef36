//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Acquisition (uploads stored, remote downloads)
//! - Dispatch (conversions by target and outcome, duration, in flight)
//! - Transient store (deletions)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Acquisition Metrics
// =============================================================================

/// Acquisitions by source and result.
pub static ACQUISITIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "mediaconv_acquisitions_total",
            "Total input acquisitions",
        ),
        &["source", "result"], // source: "upload" | "url"; result: "ok" | "failed"
    )
    .unwrap()
});

/// Remote download duration in seconds.
pub static DOWNLOAD_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mediaconv_download_duration_seconds",
            "Duration of remote input downloads",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Dispatch Metrics
// =============================================================================

/// Conversions by converter and outcome.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mediaconv_conversions_total", "Total conversions dispatched"),
        &["converter", "outcome"],
    )
    .unwrap()
});

/// Conversion duration in seconds, measured on the worker.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mediaconv_conversion_duration_seconds",
            "Duration of conversions on the worker pool",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0]),
        &["converter"],
    )
    .unwrap()
});

/// Conversions currently holding a worker slot.
pub static CONVERSIONS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "mediaconv_conversions_in_flight",
        "Number of conversions currently running on the worker pool",
    )
    .unwrap()
});

// =============================================================================
// Store Metrics
// =============================================================================

/// Store deletions by result.
pub static ARTIFACT_DELETIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "mediaconv_artifact_deletions_total",
            "Transient artifact deletions",
        ),
        &["result"], // "deleted" | "absent" | "failed"
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(ACQUISITIONS_TOTAL.clone()),
        Box::new(DOWNLOAD_DURATION.clone()),
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(CONVERSIONS_IN_FLIGHT.clone()),
        Box::new(ARTIFACT_DELETIONS.clone()),
    ]
}
