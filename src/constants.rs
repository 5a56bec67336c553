/// Shared constants so CLI, session and adapters agree on defaults and wording.

// Config and environment
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const ENV_SERVICE_URL: &str = "STYLE_STUDIO_SERVICE_URL";
pub const ENV_CONFIG_PATH: &str = "STYLE_STUDIO_CONFIG";

// Transform service
pub const DEFAULT_SERVICE_ENDPOINT: &str = "http://127.0.0.1:8787/transform";
pub const DEFAULT_SERVICE_TIMEOUT_SECS: u64 = 120;

// Carousel: horizontal travel (pixels) a touch must exceed to count as a swipe
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 50.0;

// Gallery
pub const DEFAULT_GALLERY_DIR: &str = "gallery";
pub const GALLERY_INDEX_FILE: &str = "gallery.ndjson";

// Failure wording recorded on outcomes
pub const UNKNOWN_SERVICE_ERROR: &str = "unknown transform service error";
pub const MISSING_ARTIFACT_ERROR: &str = "service reported success without a result artifact";

/// Generic commentary used when no educational passage applies.
pub fn fallback_commentary(style_name: &str) -> String {
    format!("This artwork was converted in the {} style.", style_name)
}

/// Status line shown before the first job of a batch starts.
pub fn batch_intro_status(total: usize) -> String {
    format!("Starting {} style transformations...", total)
}

/// Status line shown while job `index` (zero based) is in flight.
pub fn job_status(index: usize, total: usize, style_name: &str) -> String {
    format!("[{}/{}] {} converting...", index + 1, total, style_name)
}

/// Final batch status line.
pub fn batch_summary_status(success_count: usize, total: usize) -> String {
    format!("Done! {}/{} transformations succeeded", success_count, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines_are_one_based() {
        assert_eq!(job_status(0, 3, "Baroque"), "[1/3] Baroque converting...");
        assert_eq!(batch_summary_status(2, 3), "Done! 2/3 transformations succeeded");
    }

    #[test]
    fn test_fallback_commentary_names_style() {
        assert_eq!(
            fallback_commentary("Korean Traditional Painting"),
            "This artwork was converted in the Korean Traditional Painting style."
        );
    }
}
