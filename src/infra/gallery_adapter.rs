use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::app::ports::GalleryPort;
use crate::constants::GALLERY_INDEX_FILE;
use crate::error::Result;
use crate::observability::metrics;

/// One saved artwork in the gallery index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
    /// `sha256:<hex>` of the artifact reference
    pub id: String,
    pub label: String,
    pub category_label: String,
    pub artifact_ref: String,
    pub saved_at: DateTime<Utc>,
}

pub fn entry_id(artifact_ref: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(artifact_ref.as_bytes());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// File-backed gallery appending one NDJSON line per saved artwork
pub struct FsGallery {
    index_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FsGallery {
    pub fn new(directory: &Path) -> Result<Self> {
        std::fs::create_dir_all(directory)?;
        let index_path = directory.join(GALLERY_INDEX_FILE);
        info!("Gallery index at {}", index_path.display());
        Ok(Self {
            index_path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    async fn append(&self, entry: &GalleryEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.index_path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Every entry saved so far, oldest first. Unreadable lines are skipped.
    pub async fn entries(&self) -> Result<Vec<GalleryEntry>> {
        let content = match tokio::fs::read_to_string(&self.index_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable gallery line: {}", e);
                    None
                }
            })
            .collect())
    }
}

#[async_trait]
impl GalleryPort for FsGallery {
    async fn save_artifact(&self, artifact_ref: &str, label: &str, category_label: &str) -> bool {
        let entry = GalleryEntry {
            id: entry_id(artifact_ref),
            label: label.to_string(),
            category_label: category_label.to_string(),
            artifact_ref: artifact_ref.to_string(),
            saved_at: Utc::now(),
        };
        match self.append(&entry).await {
            Ok(()) => {
                metrics::gallery::save_success();
                info!("🖼️ Saved '{}' ({}) to gallery as {}", label, category_label, entry.id);
                true
            }
            Err(e) => {
                metrics::gallery::save_error();
                warn!("Failed to save '{}' to gallery: {}", label, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_saves_are_appended_in_order() {
        let dir = TempDir::new().unwrap();
        let gallery = FsGallery::new(dir.path()).unwrap();

        assert!(gallery.save_artifact("https://cdn/a.png", "Claude Monet", "Art Movements").await);
        assert!(gallery.save_artifact("https://cdn/b.png", "Gustav Klimt", "Masters").await);

        let entries = gallery.entries().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "Claude Monet");
        assert_eq!(entries[1].category_label, "Masters");
        assert_eq!(entries[0].id, entry_id("https://cdn/a.png"));
        assert!(entries[0].id.starts_with("sha256:"));
    }

    #[tokio::test]
    async fn test_missing_index_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let gallery = FsGallery::new(&dir.path().join("nested")).unwrap();
        assert!(gallery.entries().await.unwrap().is_empty());
    }

    #[test]
    fn test_entry_id_is_content_addressed() {
        assert_eq!(entry_id("x"), entry_id("x"));
        assert_ne!(entry_id("x"), entry_id("y"));
        assert_eq!(entry_id("x").len(), "sha256:".len() + 64);
    }
}
