use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the classification service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server listens on (default: 8080)
    pub port: u16,

    /// Directory for transient upload files (default: "temp_images")
    pub scratch_dir: PathBuf,

    /// Maximum accepted upload size in bytes (default: 10 MB)
    pub max_upload_size: usize,

    /// Classifier backend: "command" or "stub" (default: "command")
    pub classifier_kind: String,

    /// Interpreter used to run the inference script (default: "python3")
    pub classifier_program: String,

    /// Path to the inference script (default: "ml_model/src/predict_model.py")
    pub classifier_script: PathBuf,

    /// Upper bound on a single classification run (default: 30s)
    pub classify_timeout: Duration,

    /// Reject uploads whose magic bytes are not a known image type (default: true)
    pub require_image_content: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            scratch_dir: PathBuf::from("temp_images"),
            max_upload_size: 10 * 1024 * 1024, // 10 MB
            classifier_kind: "command".to_string(),
            classifier_program: "python3".to_string(),
            classifier_script: PathBuf::from("ml_model/src/predict_model.py"),
            classify_timeout: Duration::from_secs(30),
            require_image_content: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            scratch_dir: env::var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.scratch_dir),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            classifier_kind: env::var("CLASSIFIER_KIND").unwrap_or(default.classifier_kind),

            classifier_program: env::var("CLASSIFIER_PROGRAM")
                .unwrap_or(default.classifier_program),

            classifier_script: env::var("CLASSIFIER_SCRIPT")
                .map(PathBuf::from)
                .unwrap_or(default.classifier_script),

            classify_timeout: env::var("CLASSIFY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.classify_timeout),

            require_image_content: env::var("REQUIRE_IMAGE_CONTENT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default.require_image_content),
        }
    }

    /// Create config for development (stub classifier, no external process)
    pub fn development() -> Self {
        Self {
            classifier_kind: "stub".to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.scratch_dir, PathBuf::from("temp_images"));
        assert_eq!(config.classifier_kind, "command");
        assert_eq!(config.classify_timeout, Duration::from_secs(30));
        assert!(config.require_image_content);
    }

    #[test]
    fn test_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.classifier_kind, "stub");
        assert_eq!(config.max_upload_size, 10 * 1024 * 1024);
    }
}
