//! Read-only store of educational passages, partitioned by category.
//!
//! Loaded once from `tables/education.toml` (embedded as the default) or from
//! an override path named in the configuration. Nothing in the crate mutates
//! a loaded [`EducationLookup`]; it is shared behind an `Arc`.

pub mod commentary;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::error::{Result, StudioError};
use crate::types::{AttributionKey, Category, StyleDescriptor};

pub use commentary::{Commentary, CommentarySource};

const BUILTIN_EDUCATION: &str = include_str!("../../tables/education.toml");

/// One educational passage
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EducationEntry {
    pub title: String,
    pub body: String,
}

/// All passages for one category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EducationPartition {
    /// Whether the overview stands in for an unresolved attribution
    #[serde(default)]
    pub overview_fallback: bool,
    #[serde(default)]
    pub overview: Option<EducationEntry>,
    #[serde(default)]
    pub entries: BTreeMap<String, EducationEntry>,
}

impl EducationPartition {
    pub fn contains(&self, key: &str) -> bool {
        !key.is_empty() && self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&EducationEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct EducationFile {
    version: String,
    #[serde(default)]
    movements: EducationPartition,
    #[serde(default)]
    masters: EducationPartition,
    #[serde(default)]
    oriental: EducationPartition,
}

/// Keyed educational content for every category
#[derive(Debug, Clone)]
pub struct EducationLookup {
    version: String,
    movements: EducationPartition,
    masters: EducationPartition,
    oriental: EducationPartition,
}

impl EducationLookup {
    /// The table shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_EDUCATION)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StudioError::Config(format!(
                "Failed to read education table '{}': {}",
                path.display(),
                e
            ))
        })?;
        let lookup = Self::from_toml_str(&content)?;
        info!(
            "Loaded education table v{} from {}",
            lookup.version,
            path.display()
        );
        Ok(lookup)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: EducationFile = toml::from_str(content)?;
        if file.version.trim().is_empty() {
            return Err(StudioError::Table {
                table: "education".to_string(),
                message: "missing version".to_string(),
            });
        }
        Ok(Self {
            version: file.version,
            movements: file.movements,
            masters: file.masters,
            oriental: file.oriental,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn partition(&self, category: Category) -> &EducationPartition {
        match category {
            Category::Movements => &self.movements,
            Category::Masters => &self.masters,
            Category::Oriental => &self.oriental,
        }
    }

    pub fn contains(&self, category: Category, key: &str) -> bool {
        self.partition(category).contains(key)
    }

    pub fn get(&self, key: &AttributionKey) -> Option<&EducationEntry> {
        self.partition(key.category).get(&key.key)
    }

    pub fn overview(&self, category: Category) -> Option<&EducationEntry> {
        self.partition(category).overview.as_ref()
    }

    /// Passage shown while a single style is being transformed: the entry
    /// keyed by the style id, or the category overview.
    pub fn for_style(&self, style: &StyleDescriptor) -> Option<&EducationEntry> {
        self.partition(style.category)
            .get(&style.id)
            .or_else(|| self.overview(style.category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_loads_every_partition() {
        let lookup = EducationLookup::builtin().unwrap();
        assert!(!lookup.version().is_empty());
        for category in Category::ALL {
            assert!(!lookup.partition(category).is_empty(), "{} is empty", category);
            assert!(lookup.overview(category).is_some());
        }
        assert!(lookup.contains(Category::Movements, "monet"));
        assert!(lookup.contains(Category::Masters, "munch-scream"));
        assert!(lookup.contains(Category::Oriental, "japanese-ukiyoe"));
    }

    #[test]
    fn test_partitions_do_not_share_keys() {
        let lookup = EducationLookup::builtin().unwrap();
        assert!(lookup.contains(Category::Movements, "munch"));
        assert!(!lookup.contains(Category::Masters, "munch"));
        let key = AttributionKey::new(Category::Masters, "monet");
        assert!(lookup.get(&key).is_none());
    }

    #[test]
    fn test_empty_key_is_never_contained() {
        let lookup = EducationLookup::from_toml_str(
            r#"
version = "1"
[oriental.entries.""]
title = "blank"
body = "blank"
"#,
        )
        .unwrap();
        assert!(!lookup.contains(Category::Oriental, ""));
    }

    #[test]
    fn test_missing_version_is_rejected() {
        let result = EducationLookup::from_toml_str("version = \"\"\n");
        assert!(matches!(result, Err(StudioError::Table { .. })));
    }

    #[test]
    fn test_for_style_falls_back_to_overview() {
        let lookup = EducationLookup::builtin().unwrap();
        let style = StyleDescriptor::new("korean", "Korean Traditional Painting", Category::Oriental);
        let entry = lookup.for_style(&style).unwrap();
        assert_eq!(entry, lookup.overview(Category::Oriental).unwrap());
    }
}
