//! One user's batch: the styles picked, the outcomes recorded so far with
//! their attribution and commentary, and the carousel over them.
//!
//! The session is the only writer of its state. During an interactive batch
//! the orchestrator runs on its own task and streams outcomes back over a
//! channel while navigation events are handled in between.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::app::batch_use_case::BatchOrchestrator;
use crate::app::ports::GalleryPort;
use crate::attribution::{AttributionQuery, AttributionResolver, Resolution};
use crate::carousel::{CarouselView, NavEvent, ResultCarousel};
use crate::education::Commentary;
use crate::error::{Result, StudioError};
use crate::types::{BatchReport, Photo, StyleDescriptor, TransformOutcome};

/// An outcome together with what the session derived from it. Failed
/// outcomes carry neither a resolution nor commentary.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedOutcome {
    pub outcome: TransformOutcome,
    pub resolution: Option<Resolution>,
    pub commentary: Option<Commentary>,
}

/// What the carousel is currently showing
#[derive(Debug, Clone, Copy)]
pub enum Slide<'a> {
    Overview {
        styles: &'a [StyleDescriptor],
        completed: usize,
        success_count: usize,
    },
    Result {
        index: usize,
        resolved: &'a ResolvedOutcome,
    },
    Failure {
        index: usize,
        style: &'a StyleDescriptor,
        error_message: &'a str,
    },
}

pub struct StudioSession {
    id: Uuid,
    styles: Vec<StyleDescriptor>,
    completed: Vec<ResolvedOutcome>,
    carousel: ResultCarousel,
    resolver: Arc<AttributionResolver>,
    gallery: Option<Arc<dyn GalleryPort>>,
}

impl StudioSession {
    pub fn begin(
        styles: Vec<StyleDescriptor>,
        resolver: Arc<AttributionResolver>,
        carousel: ResultCarousel,
    ) -> Result<Self> {
        if styles.is_empty() {
            return Err(StudioError::MalformedInput("no styles selected".to_string()));
        }
        let id = Uuid::new_v4();
        debug!("Session {} started with {} styles", id, styles.len());
        Ok(Self {
            id,
            styles,
            completed: Vec::new(),
            carousel,
            resolver,
            gallery: None,
        })
    }

    pub fn with_gallery(mut self, gallery: Arc<dyn GalleryPort>) -> Self {
        self.gallery = Some(gallery);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn styles(&self) -> &[StyleDescriptor] {
        &self.styles
    }

    pub fn completed(&self) -> &[ResolvedOutcome] {
        &self.completed
    }

    pub fn carousel(&self) -> &ResultCarousel {
        &self.carousel
    }

    pub fn success_count(&self) -> usize {
        self.completed.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn is_finished(&self) -> bool {
        self.completed.len() == self.styles.len()
    }

    /// Append one outcome: resolve its attribution, compose commentary and
    /// offer successful artwork to the gallery.
    pub async fn record(&mut self, outcome: TransformOutcome) -> &ResolvedOutcome {
        let (resolution, commentary) = if outcome.is_success() {
            let style = &outcome.style;
            let query = AttributionQuery::new(
                style.category,
                outcome.attributed_artist(),
                outcome.attributed_work(),
                Some(style.id.as_str()),
            );
            let resolution = self.resolver.resolve_query(&query);
            let commentary = Commentary::compose(self.resolver.education(), style, resolution.as_ref());
            (resolution, Some(commentary))
        } else {
            (None, None)
        };

        if let (Some(gallery), Some(artifact)) = (&self.gallery, outcome.artifact_ref()) {
            let saved = gallery
                .save_artifact(
                    artifact,
                    outcome.display_label(),
                    outcome.style.category.display_label(),
                )
                .await;
            if !saved {
                warn!("Gallery did not store result for '{}'", outcome.style.id);
            }
        }

        self.completed.push(ResolvedOutcome {
            outcome,
            resolution,
            commentary,
        });
        self.carousel.set_completed(self.completed.len());

        let index = self.completed.len() - 1;
        &self.completed[index]
    }

    pub fn navigate(&mut self, event: NavEvent) -> bool {
        self.carousel.apply(event)
    }

    pub fn current_slide(&self) -> Slide<'_> {
        let index = match self.carousel.view() {
            CarouselView::Overview => return self.overview_slide(),
            CarouselView::Viewing(index) => index,
        };
        match self.completed.get(index) {
            Some(resolved) => match resolved.outcome.error_message() {
                Some(error_message) => Slide::Failure {
                    index,
                    style: &resolved.outcome.style,
                    error_message,
                },
                None => Slide::Result { index, resolved },
            },
            None => self.overview_slide(),
        }
    }

    fn overview_slide(&self) -> Slide<'_> {
        Slide::Overview {
            styles: &self.styles,
            completed: self.completed.len(),
            success_count: self.success_count(),
        }
    }

    /// Run the whole batch without navigation input.
    pub async fn run_batch(&mut self, orchestrator: Arc<BatchOrchestrator>, photo: Photo) -> Result<BatchReport> {
        let (nav_tx, nav_rx) = mpsc::unbounded_channel();
        drop(nav_tx);
        self.run_interactive(orchestrator, photo, nav_rx, |_| {}).await
    }

    /// Run the batch on its own task while applying navigation events as
    /// they arrive. `on_change` fires after every recorded outcome and every
    /// navigation event that moved the view.
    pub async fn run_interactive<F>(
        &mut self,
        orchestrator: Arc<BatchOrchestrator>,
        photo: Photo,
        mut nav: mpsc::UnboundedReceiver<NavEvent>,
        mut on_change: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(&StudioSession),
    {
        if photo.is_empty() {
            return Err(StudioError::MalformedInput("photo is empty".to_string()));
        }

        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<TransformOutcome>();
        let styles = self.styles.clone();
        let batch = tokio::spawn(async move {
            orchestrator
                .run_batch(&photo, &styles, |progress| {
                    let _ = outcome_tx.send(progress.outcome.clone());
                })
                .await
        });

        let mut nav_open = true;
        loop {
            tokio::select! {
                received = outcome_rx.recv() => match received {
                    Some(outcome) => {
                        self.record(outcome).await;
                        on_change(&*self);
                    }
                    // The sender lives in the batch task; closed means done.
                    None => break,
                },
                event = nav.recv(), if nav_open => match event {
                    Some(event) => {
                        if self.navigate(event) {
                            on_change(&*self);
                        }
                    }
                    None => nav_open = false,
                },
            }
        }

        let report = batch
            .await
            .map_err(|e| StudioError::Service(format!("batch task did not complete: {}", e)))??;
        info!(
            "Session {} finished batch {}: {}",
            self.id,
            report.batch_id,
            report.summary()
        );
        Ok(report)
    }
}
