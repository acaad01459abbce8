use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::config::AppConfig;
use crate::models::Prediction;

/// A classification attempt that did not produce a usable prediction
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("failed to start classifier process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("classifier process error: {0}")]
    Io(#[from] std::io::Error),

    #[error("classifier exited with {status}: {stderr}")]
    NonZeroExit {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("classifier did not finish within {0:?}")]
    Timeout(Duration),

    #[error("classifier produced unparseable output: {0}")]
    InvalidOutput(String),
}

/// Maps an image file on disk to a structured prediction.
///
/// Implementations are read-only with respect to the input file and make
/// exactly one attempt per call, never retrying internally.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    async fn classify(&self, image_path: &Path) -> Result<Prediction, ClassifyError>;

    /// Check if the classifier backend is available/healthy
    async fn health_check(&self) -> bool;
}

/// Classifier that shells out to an inference script:
///
/// ```bash
/// python3 ml_model/src/predict_model.py <image-path>
/// ```
///
/// The script prints a single JSON object ({"label": ..., "confidence": ...})
/// on its last stdout line and exits non-zero on failure.
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandClassifier {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl ImageClassifier for CommandClassifier {
    async fn classify(&self, image_path: &Path) -> Result<Prediction, ClassifyError> {
        debug!(
            "Invoking classifier: {} {:?} {}",
            self.program,
            self.args,
            image_path.display()
        );

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(image_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // If the timeout fires the child is dropped mid-wait; make sure
            // the process dies with it.
            .kill_on_drop(true)
            .spawn()
            .map_err(ClassifyError::Spawn)?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => return Err(ClassifyError::Timeout(self.timeout)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ClassifyError::NonZeroExit {
                status: output.status,
                stderr,
            });
        }

        // The script may emit framework noise before the result; the
        // prediction is the last non-empty stdout line.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("")
            .trim();

        serde_json::from_str(line).map_err(|_| {
            let mut end = line.len().min(200);
            while !line.is_char_boundary(end) {
                end -= 1;
            }
            ClassifyError::InvalidOutput(line[..end].to_string())
        })
    }

    async fn health_check(&self) -> bool {
        // The interpreter is resolved via PATH at spawn time; the script is
        // the part that tends to be missing.
        self.args.first().is_none_or(|script| Path::new(script).exists())
    }
}

/// Fixed-answer classifier for development and tests
pub struct StubClassifier {
    prediction: Prediction,
}

impl StubClassifier {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            prediction: Prediction {
                label: label.into(),
                confidence,
            },
        }
    }
}

impl Default for StubClassifier {
    fn default() -> Self {
        Self::new("unknown", 0.0)
    }
}

#[async_trait]
impl ImageClassifier for StubClassifier {
    async fn classify(&self, _image_path: &Path) -> Result<Prediction, ClassifyError> {
        tracing::warn!("StubClassifier: returning canned prediction (development mode)");
        Ok(self.prediction.clone())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Factory function to create the classifier selected by configuration
pub fn create_classifier(config: &AppConfig) -> Arc<dyn ImageClassifier> {
    match config.classifier_kind.to_lowercase().as_str() {
        "command" => Arc::new(CommandClassifier::new(
            config.classifier_program.clone(),
            vec![config.classifier_script.display().to_string()],
            config.classify_timeout,
        )),
        "stub" | "none" | "disabled" => Arc::new(StubClassifier::default()),
        other => {
            tracing::warn!("Unknown classifier kind '{}', using StubClassifier", other);
            Arc::new(StubClassifier::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str, timeout: Duration) -> CommandClassifier {
        CommandClassifier::new("sh", vec!["-c".to_string(), script.to_string()], timeout)
    }

    #[tokio::test]
    async fn test_stub_classifier() {
        let classifier = StubClassifier::new("cat", 0.97);
        let prediction = classifier.classify(Path::new("ignored.jpg")).await.unwrap();
        assert_eq!(prediction.label, "cat");
        assert_eq!(prediction.confidence, 0.97);
        assert!(classifier.health_check().await);
    }

    #[tokio::test]
    async fn test_command_classifier_parses_last_line() {
        let classifier = sh(
            r#"echo 'loading model...'; echo '{"label":"cat","confidence":0.97}'"#,
            Duration::from_secs(5),
        );
        let prediction = classifier.classify(Path::new("/dev/null")).await.unwrap();
        assert_eq!(prediction.label, "cat");
        assert_eq!(prediction.confidence, 0.97);
    }

    #[tokio::test]
    async fn test_command_classifier_nonzero_exit() {
        let classifier = sh("echo boom >&2; exit 3", Duration::from_secs(5));
        let err = classifier.classify(Path::new("/dev/null")).await.unwrap_err();
        match err {
            ClassifyError::NonZeroExit { stderr, .. } => assert!(stderr.contains("boom")),
            other => panic!("expected NonZeroExit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_command_classifier_timeout() {
        let classifier = sh("sleep 5", Duration::from_millis(100));
        let err = classifier.classify(Path::new("/dev/null")).await.unwrap_err();
        assert!(matches!(err, ClassifyError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_command_classifier_garbage_output() {
        let classifier = sh("echo this is not json", Duration::from_secs(5));
        let err = classifier.classify(Path::new("/dev/null")).await.unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidOutput(_)));
    }

    #[tokio::test]
    async fn test_command_classifier_missing_program() {
        let classifier = CommandClassifier::new(
            "definitely-not-a-real-binary",
            vec![],
            Duration::from_secs(5),
        );
        let err = classifier.classify(Path::new("/dev/null")).await.unwrap_err();
        assert!(matches!(err, ClassifyError::Spawn(_)));
    }

    #[tokio::test]
    async fn test_create_classifier() {
        let config = AppConfig::development();
        let classifier = create_classifier(&config);
        assert!(classifier.health_check().await);

        let config = AppConfig {
            classifier_kind: "what-is-this".to_string(),
            ..AppConfig::default()
        };
        let classifier = create_classifier(&config);
        assert!(classifier.health_check().await);
    }
}
