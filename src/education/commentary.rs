use serde::Serialize;

use super::EducationLookup;
use crate::attribution::{Resolution, Strategy};
use crate::constants::fallback_commentary;
use crate::types::StyleDescriptor;

/// Where a piece of commentary came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentarySource {
    /// A resolved attribution key, and the strategy that found it
    Resolved(Strategy),
    /// The category overview standing in for an unresolved attribution
    Overview,
    /// The generic "converted in <style> style" sentence
    Generic,
}

/// Educational text attached to one successful result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commentary {
    pub title: String,
    pub body: String,
    pub source: CommentarySource,
}

impl Commentary {
    pub fn generic(style: &StyleDescriptor) -> Self {
        Self {
            title: style.name.clone(),
            body: fallback_commentary(&style.name),
            source: CommentarySource::Generic,
        }
    }

    /// Build commentary for a result. A resolution whose key has no passage
    /// degrades the same way as no resolution at all.
    pub fn compose(
        education: &EducationLookup,
        style: &StyleDescriptor,
        resolution: Option<&Resolution>,
    ) -> Self {
        if let Some(resolution) = resolution {
            if let Some(entry) = education.get(&resolution.key) {
                return Self {
                    title: entry.title.clone(),
                    body: entry.body.clone(),
                    source: CommentarySource::Resolved(resolution.strategy),
                };
            }
        }

        let partition = education.partition(style.category);
        if partition.overview_fallback {
            if let Some(overview) = &partition.overview {
                return Self {
                    title: overview.title.clone(),
                    body: overview.body.clone(),
                    source: CommentarySource::Overview,
                };
            }
        }

        Self::generic(style)
    }
}
