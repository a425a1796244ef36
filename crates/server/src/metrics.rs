//! Prometheus metrics for the HTTP layer.
//!
//! The registry also carries the conversion metrics defined in
//! `mediaconv_core::metrics`, so a single `/metrics` scrape covers both.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;
use tracing::warn;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mediaconv_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.005, 0.025, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mediaconv_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "mediaconv_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

fn register_metrics(registry: &Registry) {
    let http: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
    ];

    for collector in http.into_iter().chain(mediaconv_core::metrics::all_metrics()) {
        if let Err(e) = registry.register(collector) {
            warn!(error = %e, "Failed to register metric");
        }
    }
}

/// Encodes all registered metrics in the Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Replaces artifact ids in a request path so label cardinality stays bounded.
pub fn normalize_path(path: &str) -> String {
    UUID_PATTERN.replace_all(path, "{id}").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_artifact_path() {
        let path = "/midis/550e8400-e29b-41d4-a716-446655440000.mid";
        assert_eq!(normalize_path(path), "/midis/{id}.mid");
    }

    #[test]
    fn test_normalize_static_path() {
        assert_eq!(normalize_path("/convert/wav"), "/convert/wav");
        assert_eq!(
            normalize_path("/convert/video/last-frame/json"),
            "/convert/video/last-frame/json"
        );
    }

    #[test]
    fn test_encode_includes_core_metrics() {
        HTTP_REQUESTS_IN_FLIGHT.inc();
        HTTP_REQUESTS_IN_FLIGHT.dec();

        let text = encode_metrics().unwrap();
        assert!(text.contains("mediaconv_http_requests_in_flight"));
        assert!(text.contains("mediaconv_conversions_in_flight"));
    }
}
