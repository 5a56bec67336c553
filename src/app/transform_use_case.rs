use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

use crate::app::ports::{ProgressSink, TransformServicePort};
use crate::constants::{MISSING_ARTIFACT_ERROR, UNKNOWN_SERVICE_ERROR};
use crate::observability::metrics;
use crate::types::{Photo, StyleDescriptor, TransformOutcome};

/// Use case for running one photo through the transform service in one style
#[derive(Clone)]
pub struct SingleItemTransformer {
    service: Arc<dyn TransformServicePort>,
}

impl SingleItemTransformer {
    pub fn new(service: Arc<dyn TransformServicePort>) -> Self {
        Self { service }
    }

    /// Calls the service exactly once. Every failure mode, including a
    /// transport fault, comes back as a failed outcome.
    #[instrument(skip_all, fields(style_id = %style.id, category = %style.category))]
    pub async fn transform(
        &self,
        photo: &Photo,
        style: &StyleDescriptor,
        progress: &dyn ProgressSink,
    ) -> TransformOutcome {
        let started = Instant::now();
        let result = self.service.request_transform(photo, style, progress).await;
        let elapsed = started.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;

        let outcome = match result {
            Ok(response) if response.success => {
                match response.result_artifact.filter(|a| !a.trim().is_empty()) {
                    Some(artifact) => TransformOutcome::succeeded(
                        style.clone(),
                        artifact,
                        response.attributed_artist,
                        response.attributed_work,
                        elapsed_ms,
                    ),
                    None => {
                        warn!("Service reported success for '{}' without an artifact", style.id);
                        metrics::transform::missing_artifact();
                        TransformOutcome::failed(style.clone(), MISSING_ARTIFACT_ERROR, elapsed_ms)
                    }
                }
            }
            Ok(response) => {
                let message = response
                    .error_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN_SERVICE_ERROR.to_string());
                warn!("Transform of '{}' failed: {}", style.id, message);
                TransformOutcome::failed(style.clone(), message, elapsed_ms)
            }
            Err(e) => {
                let message = format!("{:#}", e);
                let message = if message.trim().is_empty() {
                    UNKNOWN_SERVICE_ERROR.to_string()
                } else {
                    message
                };
                warn!("Transform of '{}' faulted: {}", style.id, message);
                TransformOutcome::failed(style.clone(), message, elapsed_ms)
            }
        };

        metrics::transform::job_completed(style.category.as_str(), outcome.is_success());
        metrics::transform::job_duration(elapsed.as_secs_f64());
        debug!(
            "Transform of '{}' finished in {}ms (success: {})",
            style.id,
            elapsed_ms,
            outcome.is_success()
        );

        outcome
    }
}
