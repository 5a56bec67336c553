use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Transform service error: {0}")]
    Service(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Table '{table}' is invalid: {message}")]
    Table { table: String, message: String },

    #[error("Metrics error: {0}")]
    Metrics(String),
}

pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_errors_convert() {
        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        let err: StudioError = err.into();
        assert!(matches!(err, StudioError::Http(_)));
        assert!(err.to_string().starts_with("HTTP request failed"));
    }

    #[test]
    fn test_table_error_names_the_table() {
        let err = StudioError::Table {
            table: "education".to_string(),
            message: "version is empty".to_string(),
        };
        assert_eq!(err.to_string(), "Table 'education' is invalid: version is empty");
    }
}
