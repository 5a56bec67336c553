use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::app::ports::TransformServicePort;
use crate::app::transform_use_case::SingleItemTransformer;
use crate::constants::{batch_intro_status, batch_summary_status, job_status};
use crate::error::{Result, StudioError};
use crate::observability::metrics;
use crate::types::{BatchReport, Photo, StyleDescriptor, TransformOutcome};

/// Optional pauses around a batch, for the intro and summary screens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacing {
    pub intro: Duration,
    pub outro: Duration,
}

impl Pacing {
    pub fn from_millis(intro_ms: u64, outro_ms: u64) -> Self {
        Self {
            intro: Duration::from_millis(intro_ms),
            outro: Duration::from_millis(outro_ms),
        }
    }
}

/// Handed to the progress callback after each job is appended
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress<'a> {
    /// Number of outcomes recorded so far, including this one
    pub completed: usize,
    pub total: usize,
    pub outcome: &'a TransformOutcome,
}

/// Use case for running one photo through an ordered list of styles,
/// strictly one job at a time
pub struct BatchOrchestrator {
    transformer: SingleItemTransformer,
    pacing: Pacing,
    status: watch::Sender<String>,
}

impl BatchOrchestrator {
    pub fn new(service: Arc<dyn TransformServicePort>) -> Self {
        let (status, _) = watch::channel(String::new());
        Self {
            transformer: SingleItemTransformer::new(service),
            pacing: Pacing::default(),
            status,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Live status line; every job, progress report and summary replaces it
    pub fn subscribe_status(&self) -> watch::Receiver<String> {
        self.status.subscribe()
    }

    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    fn publish(&self, line: String) {
        self.status.send_replace(line);
    }

    /// Run every style in submission order. A failed job is recorded and the
    /// batch moves on; the only error is a malformed request, raised before
    /// any job starts.
    #[instrument(skip_all, fields(total = styles.len()))]
    pub async fn run_batch<F>(
        &self,
        photo: &Photo,
        styles: &[StyleDescriptor],
        mut on_progress: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(BatchProgress<'_>) + Send,
    {
        check_photo(photo)?;
        if styles.is_empty() {
            return Err(StudioError::MalformedInput("no styles selected".to_string()));
        }

        let batch_id = Uuid::new_v4();
        let total = styles.len();
        let started_at = Utc::now();
        let started = Instant::now();

        info!("🎨 Batch {} starting: {} styles", batch_id, total);
        metrics::batch::started(total);
        self.publish(batch_intro_status(total));
        pause(self.pacing.intro).await;

        let mut outcomes: Vec<TransformOutcome> = Vec::with_capacity(total);
        for (index, style) in styles.iter().enumerate() {
            self.publish(job_status(index, total, &style.name));

            let prefix = format!("[{}/{}] ", index + 1, total);
            let status = &self.status;
            let sink = |message: &str| {
                status.send_replace(format!("{}{}", prefix, message));
            };

            let outcome = self.transformer.transform(photo, style, &sink).await;
            if outcome.is_success() {
                info!("✅ [{}/{}] {} done", index + 1, total, style.name);
            } else {
                warn!(
                    "❌ [{}/{}] {} failed: {}",
                    index + 1,
                    total,
                    style.name,
                    outcome.error_message().unwrap_or_default()
                );
            }

            outcomes.push(outcome);
            if let Some(latest) = outcomes.last() {
                on_progress(BatchProgress {
                    completed: outcomes.len(),
                    total,
                    outcome: latest,
                });
            }
        }

        let success_count = outcomes.iter().filter(|o| o.is_success()).count();
        self.publish(batch_summary_status(success_count, total));
        info!(
            "🏁 Batch {} finished: {}/{} succeeded",
            batch_id, success_count, total
        );
        metrics::batch::finished(success_count, total, started.elapsed().as_secs_f64());
        pause(self.pacing.outro).await;

        Ok(BatchReport {
            batch_id,
            outcomes,
            success_count,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Single-style mode; shares the job path with [`run_batch`](Self::run_batch).
    #[instrument(skip_all, fields(style_id = %style.id))]
    pub async fn run_single(&self, photo: &Photo, style: &StyleDescriptor) -> Result<TransformOutcome> {
        check_photo(photo)?;
        self.publish(job_status(0, 1, &style.name));

        let status = &self.status;
        let sink = |message: &str| {
            status.send_replace(message.to_string());
        };
        let outcome = self.transformer.transform(photo, style, &sink).await;
        self.publish(batch_summary_status(usize::from(outcome.is_success()), 1));
        Ok(outcome)
    }
}

fn check_photo(photo: &Photo) -> Result<()> {
    if photo.is_empty() {
        return Err(StudioError::MalformedInput("photo is empty".to_string()));
    }
    Ok(())
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
