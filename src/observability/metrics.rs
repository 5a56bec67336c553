//! Metrics for the style studio
//!
//! Recording goes through the `metrics` facade; [`init`] installs a
//! Prometheus recorder whose text rendering is available from [`render`].

use std::fmt;
use std::sync::OnceLock;
use tracing::info;

use crate::error::{Result, StudioError};

/// Every metric name the crate records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Transform metrics
    TransformJobsTotal,
    TransformJobDuration,
    TransformMissingArtifact,

    // Batch metrics
    BatchRunsTotal,
    BatchSize,
    BatchSuccessRatio,
    BatchDuration,

    // Attribution metrics
    AttributionResolvedTotal,
    AttributionMissedTotal,

    // Gallery metrics
    GallerySavesSuccess,
    GallerySavesError,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::TransformJobsTotal => "style_studio_transform_jobs_total",
            MetricName::TransformJobDuration => "style_studio_transform_job_duration_seconds",
            MetricName::TransformMissingArtifact => "style_studio_transform_missing_artifact_total",

            MetricName::BatchRunsTotal => "style_studio_batch_runs_total",
            MetricName::BatchSize => "style_studio_batch_size",
            MetricName::BatchSuccessRatio => "style_studio_batch_success_ratio",
            MetricName::BatchDuration => "style_studio_batch_duration_seconds",

            MetricName::AttributionResolvedTotal => "style_studio_attribution_resolved_total",
            MetricName::AttributionMissedTotal => "style_studio_attribution_missed_total",

            MetricName::GallerySavesSuccess => "style_studio_gallery_saves_success_total",
            MetricName::GallerySavesError => "style_studio_gallery_saves_error_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            TransformJobsTotal,
            TransformJobDuration,
            TransformMissingArtifact,
            BatchRunsTotal,
            BatchSize,
            BatchSuccessRatio,
            BatchDuration,
            AttributionResolvedTotal,
            AttributionMissedTotal,
            GallerySavesSuccess,
            GallerySavesError,
        ]
        .into_iter()
    }
}

static METRICS_HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling it twice is an error.
pub fn init() -> Result<()> {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| StudioError::Metrics(format!("Failed to install Prometheus recorder: {}", e)))?;
    METRICS_HANDLE
        .set(handle)
        .map_err(|_| StudioError::Metrics("metrics already initialized".to_string()))?;
    info!("Metrics system initialized");
    Ok(())
}

/// Prometheus text exposition of everything recorded so far
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

// ============================================================================
// Transform Metrics
// ============================================================================

pub mod transform {
    use super::MetricName;

    /// Record one finished job by category and outcome
    pub fn job_completed(category: &str, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        ::metrics::counter!(
            MetricName::TransformJobsTotal.as_str(),
            "category" => category.to_string(),
            "outcome" => outcome
        )
        .increment(1);
    }

    pub fn job_duration(secs: f64) {
        ::metrics::histogram!(MetricName::TransformJobDuration.as_str()).record(secs);
    }

    /// Service claimed success but returned no artifact
    pub fn missing_artifact() {
        ::metrics::counter!(MetricName::TransformMissingArtifact.as_str()).increment(1);
    }
}

// ============================================================================
// Batch Metrics
// ============================================================================

pub mod batch {
    use super::MetricName;

    pub fn started(size: usize) {
        ::metrics::counter!(MetricName::BatchRunsTotal.as_str()).increment(1);
        ::metrics::histogram!(MetricName::BatchSize.as_str()).record(size as f64);
    }

    pub fn finished(success_count: usize, total: usize, secs: f64) {
        if total > 0 {
            ::metrics::histogram!(MetricName::BatchSuccessRatio.as_str())
                .record(success_count as f64 / total as f64);
        }
        ::metrics::histogram!(MetricName::BatchDuration.as_str()).record(secs);
    }
}

// ============================================================================
// Attribution Metrics
// ============================================================================

pub mod attribution {
    use super::MetricName;

    /// Record which strategy produced a key
    pub fn resolved(category: &str, strategy: &str) {
        ::metrics::counter!(
            MetricName::AttributionResolvedTotal.as_str(),
            "category" => category.to_string(),
            "strategy" => strategy.to_string()
        )
        .increment(1);
    }

    pub fn missed(category: &str) {
        ::metrics::counter!(
            MetricName::AttributionMissedTotal.as_str(),
            "category" => category.to_string()
        )
        .increment(1);
    }
}

// ============================================================================
// Gallery Metrics
// ============================================================================

pub mod gallery {
    use super::MetricName;

    pub fn save_success() {
        ::metrics::counter!(MetricName::GallerySavesSuccess.as_str()).increment(1);
    }

    pub fn save_error() {
        ::metrics::counter!(MetricName::GallerySavesError.as_str()).increment(1);
    }
}
