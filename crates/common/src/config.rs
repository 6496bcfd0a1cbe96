use crate::error::CourseRecError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CourseRec application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Course corpus file (CSV or JSON) with precomputed embeddings
    pub data_path: PathBuf,

    /// Canonical name of the embeddings column
    pub embeddings_column: String,

    /// Number of recommendations returned when the caller gives none
    pub default_top_k: usize,

    /// Description length shown in recommendation previews
    pub description_preview_chars: usize,

    /// Destination of the processed (flattened) corpus export
    pub export_path: PathBuf,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./data/course_embeddings.json"),
            embeddings_column: "Embeddings".to_string(),
            default_top_k: 5,
            description_preview_chars: 150,
            export_path: PathBuf::from("./data/processed_courses.csv"),
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            log_dir: PathBuf::from("./data/log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, CourseRecError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();
        let config = Self {
            data_path: Self::get_env_path("DATA_PATH").unwrap_or(defaults.data_path),
            embeddings_column: std::env::var("EMBEDDINGS_COLUMN")
                .unwrap_or(defaults.embeddings_column),
            default_top_k: Self::get_env_parsed("DEFAULT_TOP_K")?
                .unwrap_or(defaults.default_top_k),
            description_preview_chars: Self::get_env_parsed("DESCRIPTION_PREVIEW_CHARS")?
                .unwrap_or(defaults.description_preview_chars),
            export_path: Self::get_env_path("EXPORT_PATH").unwrap_or(defaults.export_path),
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT")?.unwrap_or(defaults.server_port),
            log_dir: Self::get_env_path("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file (TOML/JSON/YAML, by extension),
    /// with environment variables layered on top
    pub fn from_file(path: &Path) -> Result<Self, CourseRecError> {
        let _ = dotenv::dotenv();

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::default().try_parsing(true))
            .build()
            .map_err(|e| {
                CourseRecError::config(format!(
                    "Failed to read config file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| CourseRecError::config(format!("Invalid configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().map(PathBuf::from)
    }

    /// Parse a numeric environment variable
    ///
    /// Unset means `Ok(None)`; a value that is set but does not parse is a
    /// `Config` error rather than a silent fallback to the default.
    fn get_env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, CourseRecError> {
        match std::env::var(key) {
            Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
                CourseRecError::config(format!("Invalid value for {}: '{}'", key, raw))
            }),
            Err(_) => Ok(None),
        }
    }

    /// Ensure the log directory and the export directory exist
    pub fn ensure_directories(&self) -> Result<(), CourseRecError> {
        let mut dirs = vec![self.log_dir.as_path()];
        if let Some(parent) = self.export_path.parent() {
            if !parent.as_os_str().is_empty() {
                dirs.push(parent);
            }
        }

        for dir in dirs {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    CourseRecError::config(format!(
                        "Failed to create directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(())
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), CourseRecError> {
        if self.embeddings_column.trim().is_empty() {
            return Err(CourseRecError::config("Embeddings column name cannot be empty"));
        }

        if self.default_top_k == 0 {
            return Err(CourseRecError::config("Default top_k must be at least 1"));
        }

        if self.server_port == 0 {
            return Err(CourseRecError::config("Server port cannot be 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.default_top_k, 5);
        assert_eq!(config.description_preview_chars, 150);
        assert_eq!(config.embeddings_column, "Embeddings");
    }

    #[test]
    fn test_server_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.server_bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = AppConfig::default();
        invalid_config.default_top_k = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.embeddings_column = "  ".to_string();
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_get_env_parsed_rejects_malformed_values() {
        let key = "COURSEREC_TEST_MALFORMED_NUMBER";

        std::env::set_var(key, "abc");
        let result = AppConfig::get_env_parsed::<u16>(key);
        assert!(matches!(result, Err(CourseRecError::Config(_))));

        std::env::set_var(key, "70000");
        assert!(AppConfig::get_env_parsed::<u16>(key).is_err());

        std::env::set_var(key, " 8081 ");
        assert_eq!(AppConfig::get_env_parsed::<u16>(key).unwrap(), Some(8081));

        std::env::remove_var(key);
        assert_eq!(AppConfig::get_env_parsed::<u16>(key).unwrap(), None);
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courserec.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "data_path = \"courses.csv\"").unwrap();
        writeln!(file, "description_preview_chars = 80").unwrap();
        drop(file);

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.data_path, PathBuf::from("courses.csv"));
        assert_eq!(config.description_preview_chars, 80);
        assert_eq!(config.server_port, 8080);
    }

    #[test]
    fn test_ensure_directories_creates_log_and_export_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            log_dir: dir.path().join("log"),
            export_path: dir.path().join("out").join("processed.csv"),
            ..AppConfig::default()
        };

        config.ensure_directories().unwrap();
        assert!(dir.path().join("log").is_dir());
        assert!(dir.path().join("out").is_dir());
    }
}
