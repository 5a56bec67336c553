use crate::error::{Result, StudioError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Top-level style family. Categories partition both the label tables and
/// the education tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Movements,
    Masters,
    Oriental,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Movements, Category::Masters, Category::Oriental];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Movements => "movements",
            Category::Masters => "masters",
            Category::Oriental => "oriental",
        }
    }

    /// Human-readable label handed to the gallery.
    pub fn display_label(&self) -> &'static str {
        match self {
            Category::Movements => "Art Movements",
            Category::Masters => "Masters",
            Category::Oriental => "Oriental Art",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "movements" => Ok(Category::Movements),
            "masters" => Ok(Category::Masters),
            "oriental" => Ok(Category::Oriental),
            other => Err(StudioError::UnknownCategory(other.to_string())),
        }
    }
}

/// A style the user can pick. Supplied by the style catalog, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDescriptor {
    pub id: String,
    pub name: String,
    pub category: Category,
    /// Display glyph for the style card
    #[serde(default)]
    pub icon: Option<String>,
    /// Style-specific parameters forwarded verbatim to the transform service
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl StyleDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            icon: None,
            params: BTreeMap::new(),
        }
    }
}

/// Opaque photo handle. Cloning shares the underlying bytes.
#[derive(Debug, Clone)]
pub struct Photo {
    bytes: Arc<[u8]>,
    pub file_name: Option<String>,
}

impl Photo {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let photo = Self::new(bytes);
        Ok(match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => photo.with_file_name(name),
            None => photo,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Canonical education key. The category travels with the key so it can
/// only ever be looked up in its own partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributionKey {
    pub category: Category,
    pub key: String,
}

impl AttributionKey {
    pub fn new(category: Category, key: impl Into<String>) -> Self {
        Self {
            category,
            key: key.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for AttributionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.key)
    }
}

/// How a single job ended. Success always carries an artifact and failure
/// always carries a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded {
        artifact_ref: String,
        attributed_artist: Option<String>,
        attributed_work: Option<String>,
    },
    Failed {
        error_message: String,
    },
}

/// Result of one completed transformation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOutcome {
    pub style: StyleDescriptor,
    #[serde(flatten)]
    pub status: OutcomeStatus,
    pub completed_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl TransformOutcome {
    pub fn succeeded(
        style: StyleDescriptor,
        artifact_ref: impl Into<String>,
        attributed_artist: Option<String>,
        attributed_work: Option<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            style,
            status: OutcomeStatus::Succeeded {
                artifact_ref: artifact_ref.into(),
                attributed_artist: non_blank(attributed_artist),
                attributed_work: non_blank(attributed_work),
            },
            completed_at: Utc::now(),
            elapsed_ms,
        }
    }

    pub fn failed(style: StyleDescriptor, error_message: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            style,
            status: OutcomeStatus::Failed {
                error_message: error_message.into(),
            },
            completed_at: Utc::now(),
            elapsed_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Succeeded { .. })
    }

    pub fn artifact_ref(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Succeeded { artifact_ref, .. } => Some(artifact_ref),
            OutcomeStatus::Failed { .. } => None,
        }
    }

    pub fn attributed_artist(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Succeeded { attributed_artist, .. } => attributed_artist.as_deref(),
            OutcomeStatus::Failed { .. } => None,
        }
    }

    pub fn attributed_work(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Succeeded { attributed_work, .. } => attributed_work.as_deref(),
            OutcomeStatus::Failed { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Succeeded { .. } => None,
            OutcomeStatus::Failed { error_message } => Some(error_message),
        }
    }

    /// Label used when saving to the gallery: the attributed artist when the
    /// service named one, the style name otherwise.
    pub fn display_label(&self) -> &str {
        self.attributed_artist().unwrap_or(&self.style.name)
    }
}

/// Aggregate handed back to the caller once every job has run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub outcomes: Vec<TransformOutcome>,
    pub success_count: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn total_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.total_count() - self.success_count
    }

    /// `successCount / totalCount` as shown to the user
    pub fn summary(&self) -> String {
        format!("{}/{}", self.success_count, self.total_count())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
