use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::constants::{
    DEFAULT_GALLERY_DIR, DEFAULT_SERVICE_ENDPOINT, DEFAULT_SERVICE_TIMEOUT_SECS, DEFAULT_SWIPE_THRESHOLD,
    ENV_SERVICE_URL,
};
use crate::error::{Result, StudioError};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub tables: TablesConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Pauses around a batch in milliseconds; zero disables them
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PacingConfig {
    #[serde(default)]
    pub intro_delay_ms: u64,
    #[serde(default)]
    pub outro_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CarouselConfig {
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f32,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: default_swipe_threshold(),
        }
    }
}

/// Optional overrides for the tables embedded in the binary
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TablesConfig {
    pub attribution: Option<PathBuf>,
    pub education: Option<PathBuf>,
    pub styles: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GalleryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_gallery_dir")]
    pub directory: PathBuf,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: default_gallery_dir(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_SERVICE_ENDPOINT.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_SERVICE_TIMEOUT_SECS
}

fn default_swipe_threshold() -> f32 {
    DEFAULT_SWIPE_THRESHOLD
}

fn default_gallery_dir() -> PathBuf {
    PathBuf::from(DEFAULT_GALLERY_DIR)
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            StudioError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let mut config = Self::from_toml_str(&config_content)?;
        config.apply_env_overrides();
        info!("Loaded configuration from {}", config_path.display());
        Ok(config)
    }

    /// Like [`load`](Self::load) but a missing file yields the defaults.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load(config_path);
        }
        info!(
            "No config file at {}, using defaults",
            config_path.display()
        );
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var(ENV_SERVICE_URL) {
            if !endpoint.trim().is_empty() {
                self.service.endpoint = endpoint.trim().to_string();
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.service.endpoint.trim().is_empty() {
            return Err(StudioError::Config("service.endpoint must not be empty".to_string()));
        }
        if self.service.timeout_seconds == 0 {
            return Err(StudioError::Config("service.timeout_seconds must be positive".to_string()));
        }
        if !self.carousel.swipe_threshold.is_finite() || self.carousel.swipe_threshold < 0.0 {
            return Err(StudioError::Config(
                "carousel.swipe_threshold must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.service.endpoint, DEFAULT_SERVICE_ENDPOINT);
        assert_eq!(config.service.timeout(), Duration::from_secs(120));
        assert_eq!(config.pacing.intro_delay_ms, 0);
        assert_eq!(config.carousel.swipe_threshold, 50.0);
        assert!(config.gallery.enabled);
        assert!(config.tables.education.is_none());
    }

    #[test]
    fn test_sections_parse() {
        let config = Config::from_toml_str(
            r#"
[service]
endpoint = "https://transform.example/api"
timeout_seconds = 30

[pacing]
intro_delay_ms = 1500
outro_delay_ms = 1000

[carousel]
swipe_threshold = 80.0

[tables]
education = "data/education.toml"

[gallery]
enabled = false
directory = "/tmp/gallery"
"#,
        )
        .unwrap();
        assert_eq!(config.service.timeout_seconds, 30);
        assert_eq!(config.pacing.outro_delay_ms, 1000);
        assert_eq!(config.carousel.swipe_threshold, 80.0);
        assert_eq!(config.tables.education, Some(PathBuf::from("data/education.toml")));
        assert!(!config.gallery.enabled);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_toml_str("[service]\ntimeout_seconds = 0\n"),
            Err(StudioError::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[carousel]\nswipe_threshold = -1.0\n"),
            Err(StudioError::Config(_))
        ));
    }

    #[test]
    fn test_load_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[pacing]\nintro_delay_ms = 5").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.pacing.intro_delay_ms, 5);
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let result = Config::load(Path::new("/nonexistent/style_studio.toml"));
        assert!(matches!(result, Err(StudioError::Config(_))));
    }
}
