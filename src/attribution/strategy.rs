//! The resolution chain as an ordered list of tagged strategies.
//!
//! Each strategy looks at one query against one category partition and
//! either proposes a key or passes. The resolver walks [`Strategy::CHAIN`]
//! and keeps the first proposal that names an existing education entry.

use serde::Serialize;
use std::fmt;

use super::normalize::{fold_case, hyphen_joined, space_joined, strip_diacritics, surname};
use super::tables::PartitionTables;
use super::AttributionQuery;
use crate::education::EducationPartition;
use crate::types::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Work title verbatim in the masters work table
    ExactWorkMatch,
    /// Case-insensitive containment either way against masters work titles
    PartialWorkMatch,
    /// Artist label verbatim, then case-folded
    LabelMapMatch,
    /// Case-insensitive containment either way against masters artist labels
    PartialLabelMatch,
    /// Artist label with combining marks removed
    DiacriticRetry,
    /// Final name token used directly as an education key
    SurnameFallback,
    /// Per-style keyword containment rules
    KeywordMatch,
    /// Style id used directly as an education key
    StyleIdFallback,
}

impl Strategy {
    pub const CHAIN: [Strategy; 8] = [
        Strategy::ExactWorkMatch,
        Strategy::PartialWorkMatch,
        Strategy::LabelMapMatch,
        Strategy::PartialLabelMatch,
        Strategy::DiacriticRetry,
        Strategy::SurnameFallback,
        Strategy::KeywordMatch,
        Strategy::StyleIdFallback,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::ExactWorkMatch => "exact_work_match",
            Strategy::PartialWorkMatch => "partial_work_match",
            Strategy::LabelMapMatch => "label_map_match",
            Strategy::PartialLabelMatch => "partial_label_match",
            Strategy::DiacriticRetry => "diacritic_retry",
            Strategy::SurnameFallback => "surname_fallback",
            Strategy::KeywordMatch => "keyword_match",
            Strategy::StyleIdFallback => "style_id_fallback",
        }
    }

    /// Propose a key for `query`, or `None` to pass to the next strategy.
    pub fn propose(
        &self,
        query: &AttributionQuery,
        tables: &PartitionTables,
        education: &EducationPartition,
    ) -> Option<String> {
        match self {
            Strategy::ExactWorkMatch => exact_work(query, tables),
            Strategy::PartialWorkMatch => partial_work(query, tables),
            Strategy::LabelMapMatch => label_map(query, tables),
            Strategy::PartialLabelMatch => partial_label(query, tables),
            Strategy::DiacriticRetry => diacritic_retry(query, tables, education),
            Strategy::SurnameFallback => surname_fallback(query, education),
            Strategy::KeywordMatch => keyword_match(query, tables),
            Strategy::StyleIdFallback => style_id_fallback(query, education),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn exact_work(query: &AttributionQuery, tables: &PartitionTables) -> Option<String> {
    if query.category != Category::Masters {
        return None;
    }
    let work = query.work.as_deref()?;
    tables.work_exact(work).map(str::to_string)
}

fn partial_work(query: &AttributionQuery, tables: &PartitionTables) -> Option<String> {
    if query.category != Category::Masters {
        return None;
    }
    let work = fold_case(query.work.as_deref()?);
    tables
        .works()
        .iter()
        .find(|(title, _)| {
            let title = fold_case(title);
            !title.is_empty() && (work.contains(&title) || title.contains(&work))
        })
        .map(|(_, key)| key.clone())
}

fn label_map(query: &AttributionQuery, tables: &PartitionTables) -> Option<String> {
    let artist = query.artist.as_deref()?;
    tables
        .label_verbatim(artist)
        .or_else(|| tables.label_folded(artist))
        .map(str::to_string)
}

/// Labels are scanned in sorted order, so the first containing or
/// contained label wins deterministically.
fn partial_label(query: &AttributionQuery, tables: &PartitionTables) -> Option<String> {
    if query.category != Category::Masters {
        return None;
    }
    let artist = fold_case(query.artist.as_deref()?);
    if artist.is_empty() {
        return None;
    }
    tables
        .labels()
        .find(|(label, _)| {
            let label = fold_case(label);
            !label.is_empty() && (artist.contains(&label) || label.contains(&artist))
        })
        .map(|(_, key)| key.to_string())
}

fn diacritic_retry(
    query: &AttributionQuery,
    tables: &PartitionTables,
    education: &EducationPartition,
) -> Option<String> {
    let stripped = strip_diacritics(query.artist.as_deref()?);
    let variants = [space_joined(&stripped), hyphen_joined(&stripped)];

    for variant in variants.iter().filter(|v| !v.is_empty()) {
        let hit = tables
            .label_verbatim(variant)
            .or_else(|| tables.label_folded(variant))
            .or_else(|| tables.label_stripped(variant));
        if let Some(key) = hit {
            return Some(key.to_string());
        }
    }

    let key_shaped = fold_case(&variants[1]);
    education.contains(&key_shaped).then_some(key_shaped)
}

fn surname_fallback(query: &AttributionQuery, education: &EducationPartition) -> Option<String> {
    let token = surname(query.artist.as_deref()?)?;
    education.contains(&token).then_some(token)
}

fn keyword_match(query: &AttributionQuery, tables: &PartitionTables) -> Option<String> {
    let artist = fold_case(query.artist.as_deref()?);
    let style_id = query.style_id.as_deref()?;
    tables
        .keywords_for(style_id)
        .find(|rule| rule.matches(&artist))
        .map(|rule| rule.key.clone())
}

fn style_id_fallback(query: &AttributionQuery, education: &EducationPartition) -> Option<String> {
    let style_id = query.style_id.as_deref()?;
    education.contains(style_id).then(|| style_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::AttributionTables;
    use crate::education::EducationLookup;

    fn propose(strategy: Strategy, query: AttributionQuery) -> Option<String> {
        let tables = AttributionTables::builtin().unwrap();
        let education = EducationLookup::builtin().unwrap();
        strategy.propose(
            &query,
            tables.partition(query.category),
            education.partition(query.category),
        )
    }

    #[test]
    fn test_exact_work_is_masters_only() {
        let masters = AttributionQuery::new(Category::Masters, None, Some("The Kiss"), None);
        assert_eq!(propose(Strategy::ExactWorkMatch, masters).as_deref(), Some("klimt-kiss"));

        let movements = AttributionQuery::new(Category::Movements, None, Some("The Kiss"), None);
        assert_eq!(propose(Strategy::ExactWorkMatch, movements), None);
    }

    #[test]
    fn test_partial_work_matches_either_direction() {
        let longer = AttributionQuery::new(Category::Masters, None, Some("Guernica (1937)"), None);
        assert_eq!(propose(Strategy::PartialWorkMatch, longer).as_deref(), Some("picasso-guernica"));

        let shorter = AttributionQuery::new(Category::Masters, None, Some("starry"), None);
        assert_eq!(
            propose(Strategy::PartialWorkMatch, shorter).as_deref(),
            Some("vangogh-starrynight")
        );
    }

    #[test]
    fn test_partial_work_respects_declared_order() {
        let query = AttributionQuery::new(
            Category::Masters,
            None,
            Some("self-portrait with thorn necklace and hummingbird"),
            None,
        );
        assert_eq!(
            propose(Strategy::PartialWorkMatch, query).as_deref(),
            Some("frida-thornnecklace")
        );
    }

    #[test]
    fn test_label_map_verbatim_and_folded() {
        let verbatim = AttributionQuery::new(Category::Movements, Some("Claude Monet"), None, None);
        assert_eq!(propose(Strategy::LabelMapMatch, verbatim).as_deref(), Some("monet"));

        let folded = AttributionQuery::new(Category::Movements, Some("claude monet"), None, None);
        assert_eq!(propose(Strategy::LabelMapMatch, folded).as_deref(), Some("monet"));
    }

    #[test]
    fn test_partial_label_matches_fuller_and_shorter_names() {
        let surname_only = AttributionQuery::new(Category::Masters, Some("Kahlo"), None, Some("frida"));
        assert_eq!(propose(Strategy::LabelMapMatch, surname_only.clone()), None);
        assert_eq!(propose(Strategy::PartialLabelMatch, surname_only).as_deref(), Some("frida-master"));

        let fuller = AttributionQuery::new(Category::Masters, Some("Vincent Willem van Gogh"), None, Some("vangogh"));
        assert_eq!(propose(Strategy::PartialLabelMatch, fuller).as_deref(), Some("vangogh-master"));

        let middle_name = AttributionQuery::new(Category::Masters, Some("Pablo Ruiz Picasso"), None, Some("picasso"));
        assert_eq!(propose(Strategy::PartialLabelMatch, middle_name).as_deref(), Some("picasso-master"));
    }

    #[test]
    fn test_partial_label_is_masters_only() {
        let movements = AttributionQuery::new(Category::Movements, Some("Oscar-Claude Monet"), None, None);
        assert_eq!(propose(Strategy::PartialLabelMatch, movements), None);

        let nobody = AttributionQuery::new(Category::Masters, Some("Unknown Style XYZ"), None, None);
        assert_eq!(propose(Strategy::PartialLabelMatch, nobody), None);
    }

    #[test]
    fn test_diacritic_retry_matches_stripped_label() {
        let query = AttributionQuery::new(Category::Movements, Some("Keïth  Haring"), None, None);
        assert_eq!(propose(Strategy::LabelMapMatch, query.clone()), None);
        assert_eq!(propose(Strategy::DiacriticRetry, query).as_deref(), Some("keith-haring"));
    }

    #[test]
    fn test_diacritic_retry_probes_education_with_hyphenated_form() {
        let tables = AttributionTables::from_toml_str("version = \"empty\"\n").unwrap();
        let education = EducationLookup::builtin().unwrap();
        let query = AttributionQuery::new(Category::Movements, Some("Jacques Louis Davïd"), None, None);
        let key = Strategy::DiacriticRetry.propose(
            &query,
            tables.partition(Category::Movements),
            education.partition(Category::Movements),
        );
        assert_eq!(key.as_deref(), Some("jacques-louis-david"));
    }

    #[test]
    fn test_surname_fallback() {
        let query = AttributionQuery::new(Category::Movements, Some("Pierre-Auguste Renoir"), None, None);
        assert_eq!(propose(Strategy::SurnameFallback, query).as_deref(), Some("renoir"));

        let missing = AttributionQuery::new(Category::Movements, Some("Nobody Inparticular"), None, None);
        assert_eq!(propose(Strategy::SurnameFallback, missing), None);
    }

    #[test]
    fn test_keyword_match_is_scoped_to_style_id() {
        let korean = AttributionQuery::new(Category::Oriental, Some("Joseon Minhwa Folk Art"), None, Some("korean"));
        assert_eq!(propose(Strategy::KeywordMatch, korean).as_deref(), Some("korean-minhwa"));

        let chinese = AttributionQuery::new(Category::Oriental, Some("Joseon Minhwa Folk Art"), None, Some("chinese"));
        assert_eq!(propose(Strategy::KeywordMatch, chinese), None);
    }

    #[test]
    fn test_style_id_fallback_needs_education_entry() {
        let known = AttributionQuery::new(Category::Movements, None, None, Some("monet"));
        assert_eq!(propose(Strategy::StyleIdFallback, known).as_deref(), Some("monet"));

        let unknown = AttributionQuery::new(Category::Oriental, None, None, Some("korean"));
        assert_eq!(propose(Strategy::StyleIdFallback, unknown), None);
    }
}
