use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Trim a raw label, drop every parenthetical annotation such as
/// `"Van Gogh (Post-Impressionism)"` or `"(1853-1890) Van Gogh"` and
/// collapse runs of whitespace. Returns `None` for blank input.
pub fn clean_label(raw: &str) -> Option<String> {
    static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([^)]*\)").unwrap());

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let stripped = PARENTHETICAL.replace_all(trimmed, " ");
    let stripped = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if stripped.is_empty() {
        // A label that is only an annotation keeps its original text.
        Some(trimmed.to_string())
    } else {
        Some(stripped)
    }
}

/// Remove combining marks (`é` → `e`). Hangul and other precomposed
/// scripts are recomposed afterwards so they survive unchanged.
pub fn strip_diacritics(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .nfc()
        .collect()
}

pub fn fold_case(input: &str) -> String {
    input.to_lowercase()
}

fn tokens(input: &str) -> impl Iterator<Item = &str> {
    static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-]+").unwrap());
    SEPARATORS.split(input).filter(|t| !t.is_empty())
}

/// Tokens joined with single spaces
pub fn space_joined(input: &str) -> String {
    tokens(input).collect::<Vec<_>>().join(" ")
}

/// Tokens joined with hyphens, the shape education keys take
pub fn hyphen_joined(input: &str) -> String {
    tokens(input).collect::<Vec<_>>().join("-")
}

/// Final whitespace- or hyphen-separated token, case-folded
pub fn surname(input: &str) -> Option<String> {
    tokens(input).last().map(fold_case)
}
