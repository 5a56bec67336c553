use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::error::{Result, StudioError};
use crate::types::{Category, StyleDescriptor};

const BUILTIN_STYLES: &str = include_str!("../tables/styles.toml");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: String,
    #[serde(default)]
    styles: Vec<StyleDescriptor>,
}

/// The styles a user can choose from, in display order
#[derive(Debug, Clone)]
pub struct StyleCatalog {
    version: String,
    styles: Vec<StyleDescriptor>,
}

impl StyleCatalog {
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_STYLES)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StudioError::Config(format!(
                "Failed to read style catalog '{}': {}",
                path.display(),
                e
            ))
        })?;
        let catalog = Self::from_toml_str(&content)?;
        info!(
            "Loaded {} styles (catalog v{}) from {}",
            catalog.styles.len(),
            catalog.version,
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut seen = HashSet::new();
        for style in &file.styles {
            if style.id.trim().is_empty() {
                return Err(StudioError::Table {
                    table: "styles".to_string(),
                    message: format!("style '{}' has an empty id", style.name),
                });
            }
            if !seen.insert(style.id.as_str()) {
                return Err(StudioError::Table {
                    table: "styles".to_string(),
                    message: format!("duplicate style id '{}'", style.id),
                });
            }
        }
        Ok(Self {
            version: file.version,
            styles: file.styles,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn all(&self) -> &[StyleDescriptor] {
        &self.styles
    }

    pub fn by_category(&self, category: Category) -> Vec<StyleDescriptor> {
        self.styles
            .iter()
            .filter(|s| s.category == category)
            .cloned()
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&StyleDescriptor> {
        self.styles.iter().find(|s| s.id == id)
    }

    /// Look up several ids, keeping the order given
    pub fn select(&self, ids: &[String]) -> Result<Vec<StyleDescriptor>> {
        ids.iter()
            .map(|id| {
                self.find(id)
                    .cloned()
                    .ok_or_else(|| StudioError::MalformedInput(format!("unknown style id '{}'", id)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_covers_every_category() {
        let catalog = StyleCatalog::builtin().unwrap();
        assert_eq!(catalog.by_category(Category::Movements).len(), 11);
        assert_eq!(catalog.by_category(Category::Masters).len(), 7);
        assert_eq!(catalog.by_category(Category::Oriental).len(), 3);
        let korean = catalog.find("korean").unwrap();
        assert_eq!(korean.name, "Korean Traditional Painting");
        assert_eq!(korean.category, Category::Oriental);
    }

    #[test]
    fn test_select_keeps_order_and_rejects_unknown() {
        let catalog = StyleCatalog::builtin().unwrap();
        let picked = catalog
            .select(&["klimt".to_string(), "baroque".to_string()])
            .unwrap();
        assert_eq!(picked[0].id, "klimt");
        assert_eq!(picked[1].id, "baroque");
        assert!(catalog.select(&["cubism".to_string()]).is_err());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let toml = r#"
version = "1"
[[styles]]
id = "a"
name = "A"
category = "masters"
[[styles]]
id = "a"
name = "A again"
category = "masters"
"#;
        assert!(matches!(
            StyleCatalog::from_toml_str(toml),
            Err(StudioError::Table { .. })
        ));
    }
}
