//! Versioned label tables mapping raw service labels to education keys.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

use super::normalize::{fold_case, space_joined, strip_diacritics};
use crate::education::EducationLookup;
use crate::error::{Result, StudioError};
use crate::types::Category;

const BUILTIN_ATTRIBUTION: &str = include_str!("../../tables/attribution.toml");

/// Containment rule for one style id: the first rule whose needle appears in
/// the lower-cased label yields its key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeywordRule {
    pub style_id: String,
    pub contains: Vec<String>,
    pub key: String,
}

impl KeywordRule {
    pub fn matches(&self, folded_label: &str) -> bool {
        self.contains
            .iter()
            .any(|needle| !needle.is_empty() && folded_label.contains(&fold_case(needle)))
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartitionFile {
    #[serde(default)]
    labels: BTreeMap<String, String>,
    #[serde(default)]
    works: Vec<(String, String)>,
    #[serde(default)]
    keywords: Vec<KeywordRule>,
}

#[derive(Debug, Deserialize)]
struct AttributionFile {
    version: String,
    #[serde(default)]
    movements: PartitionFile,
    #[serde(default)]
    masters: PartitionFile,
    #[serde(default)]
    oriental: PartitionFile,
}

/// Lookup indexes for one category
#[derive(Debug, Clone, Default)]
pub struct PartitionTables {
    labels: BTreeMap<String, String>,
    folded: HashMap<String, String>,
    stripped: HashMap<String, String>,
    works: Vec<(String, String)>,
    works_exact: HashMap<String, String>,
    keywords: Vec<KeywordRule>,
}

impl PartitionTables {
    fn build(file: PartitionFile) -> Self {
        let mut folded = HashMap::new();
        let mut stripped = HashMap::new();
        // BTreeMap order makes collisions resolve the same way on every load.
        for (label, key) in &file.labels {
            folded.entry(fold_case(label)).or_insert_with(|| key.clone());
            stripped
                .entry(fold_case(&space_joined(&strip_diacritics(label))))
                .or_insert_with(|| key.clone());
        }

        let mut works_exact = HashMap::new();
        for (title, key) in &file.works {
            works_exact.entry(title.clone()).or_insert_with(|| key.clone());
        }

        Self {
            labels: file.labels,
            folded,
            stripped,
            works: file.works,
            works_exact,
            keywords: file.keywords,
        }
    }

    /// Label as written in the table
    pub fn label_verbatim(&self, label: &str) -> Option<&str> {
        self.labels.get(label).map(String::as_str)
    }

    /// Label compared after case folding
    pub fn label_folded(&self, label: &str) -> Option<&str> {
        self.folded.get(&fold_case(label)).map(String::as_str)
    }

    /// Label compared after diacritic stripping, separator collapsing and
    /// case folding on both sides
    pub fn label_stripped(&self, label: &str) -> Option<&str> {
        self.stripped
            .get(&fold_case(&space_joined(&strip_diacritics(label))))
            .map(String::as_str)
    }

    /// Labels with their keys in sorted label order
    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(label, key)| (label.as_str(), key.as_str()))
    }

    pub fn work_exact(&self, title: &str) -> Option<&str> {
        self.works_exact.get(title).map(String::as_str)
    }

    /// Work titles in declared order
    pub fn works(&self) -> &[(String, String)] {
        &self.works
    }

    /// Keyword rules that apply to `style_id`, in declared order
    pub fn keywords_for<'a>(&'a self, style_id: &'a str) -> impl Iterator<Item = &'a KeywordRule> + 'a {
        self.keywords.iter().filter(move |rule| rule.style_id == style_id)
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.labels
            .values()
            .chain(self.works.iter().map(|(_, key)| key))
            .chain(self.keywords.iter().map(|rule| &rule.key))
            .map(String::as_str)
    }
}

/// All label tables, partitioned by category
#[derive(Debug, Clone)]
pub struct AttributionTables {
    version: String,
    movements: PartitionTables,
    masters: PartitionTables,
    oriental: PartitionTables,
}

impl AttributionTables {
    /// The tables shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_ATTRIBUTION)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StudioError::Config(format!(
                "Failed to read attribution table '{}': {}",
                path.display(),
                e
            ))
        })?;
        let tables = Self::from_toml_str(&content)?;
        info!(
            "Loaded attribution tables v{} from {}",
            tables.version,
            path.display()
        );
        Ok(tables)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: AttributionFile = toml::from_str(content)?;
        if file.version.trim().is_empty() {
            return Err(StudioError::Table {
                table: "attribution".to_string(),
                message: "missing version".to_string(),
            });
        }
        Ok(Self {
            version: file.version,
            movements: PartitionTables::build(file.movements),
            masters: PartitionTables::build(file.masters),
            oriental: PartitionTables::build(file.oriental),
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn partition(&self, category: Category) -> &PartitionTables {
        match category {
            Category::Movements => &self.movements,
            Category::Masters => &self.masters,
            Category::Oriental => &self.oriental,
        }
    }

    /// Keys the tables can produce that have no education entry. Such keys
    /// are never returned by the resolver; the list is for load-time logging.
    pub fn validate_against(&self, education: &EducationLookup) -> Vec<String> {
        let mut dangling = Vec::new();
        for category in Category::ALL {
            let mut seen = HashSet::new();
            for key in self.partition(category).keys() {
                if seen.insert(key) && !education.contains(category, key) {
                    dangling.push(format!("{}:{}", category, key));
                }
            }
        }
        for entry in &dangling {
            warn!("Attribution key {} has no education entry", entry);
        }
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_load() {
        let tables = AttributionTables::builtin().unwrap();
        assert!(!tables.version().is_empty());
        assert!(tables.partition(Category::Movements).label_count() > 50);
        assert_eq!(
            tables.partition(Category::Masters).work_exact("The Starry Night"),
            Some("vangogh-starrynight")
        );
        assert_eq!(
            tables.partition(Category::Oriental).keywords_for("korean").count(),
            3
        );
    }

    #[test]
    fn test_builtin_tables_agree_with_education() {
        let tables = AttributionTables::builtin().unwrap();
        let education = EducationLookup::builtin().unwrap();
        assert!(tables.validate_against(&education).is_empty());
    }

    #[test]
    fn test_label_indexes() {
        let tables = AttributionTables::from_toml_str(
            r#"
version = "test"
[movements.labels]
"Paul Cézanne" = "cezanne"
"Monet" = "monet"
"#,
        )
        .unwrap();
        let movements = tables.partition(Category::Movements);
        assert_eq!(movements.label_verbatim("Monet"), Some("monet"));
        assert_eq!(movements.label_verbatim("MONET"), None);
        assert_eq!(movements.label_folded("MONET"), Some("monet"));
        assert_eq!(movements.label_stripped("paul-cezanne"), Some("cezanne"));
    }

    #[test]
    fn test_folded_collision_is_deterministic() {
        let toml = r#"
version = "test"
[movements.labels]
"DAVID" = "jacques-louis-david"
"David" = "david-hockney"
"#;
        for _ in 0..3 {
            let tables = AttributionTables::from_toml_str(toml).unwrap();
            // "DAVID" sorts first
            assert_eq!(
                tables.partition(Category::Movements).label_folded("david"),
                Some("jacques-louis-david")
            );
        }
    }

    #[test]
    fn test_dangling_keys_are_reported() {
        let tables = AttributionTables::from_toml_str(
            r#"
version = "test"
[oriental.labels]
"Mystery" = "nowhere"
"#,
        )
        .unwrap();
        let education = EducationLookup::builtin().unwrap();
        assert_eq!(tables.validate_against(&education), vec!["oriental:nowhere".to_string()]);
    }
}
