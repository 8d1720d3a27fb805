//! OCR invocation: hand one PNG image to the Tesseract CLI, get text back.
//!
//! Every call is independent: the image goes into a fresh temp directory,
//! Tesseract writes recognised text to stdout, and the directory is removed
//! when the call returns. There is no timeout and no retry; a failing page
//! fails the request.

use crate::config::ServiceConfig;
use crate::error::ExtractError;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Availability of an OCR engine, reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    pub name: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A text-recognition backend.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Engine name used in logs and health output.
    fn name(&self) -> &str;

    /// Check whether the engine can run. Performs no recognition.
    async fn probe(&self) -> EngineStatus;

    /// Recognise the text in one PNG image.
    async fn recognize(&self, png: &[u8]) -> Result<String, ExtractError>;
}

/// [`OcrEngine`] wrapping the `tesseract` executable.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    cmd: PathBuf,
    languages: String,
    psm: u8,
    oem: u8,
}

impl TesseractEngine {
    pub fn new(cmd: impl Into<PathBuf>, languages: impl Into<String>, psm: u8, oem: u8) -> Self {
        Self {
            cmd: cmd.into(),
            languages: languages.into(),
            psm,
            oem,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            config.tesseract_cmd.clone(),
            config.languages.clone(),
            config.psm,
            config.oem,
        )
    }

    /// Arguments after the input path: `stdout -l <langs> --psm N --oem N`.
    pub fn args(&self) -> Vec<String> {
        vec![
            "stdout".to_string(),
            "-l".to_string(),
            self.languages.clone(),
            "--psm".to_string(),
            self.psm.to_string(),
            "--oem".to_string(),
            self.oem.to_string(),
        ]
    }

    fn unavailable(&self, reason: impl Into<String>) -> ExtractError {
        ExtractError::EngineUnavailable {
            engine: format!("tesseract ({})", self.cmd.display()),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn probe(&self) -> EngineStatus {
        let output = Command::new(&self.cmd)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => EngineStatus {
                name: self.name().to_string(),
                available: true,
                version: parse_version(&out.stdout).or_else(|| parse_version(&out.stderr)),
            },
            _ => EngineStatus {
                name: self.name().to_string(),
                available: false,
                version: None,
            },
        }
    }

    #[instrument(level = "debug", skip_all, fields(bytes = png.len()))]
    async fn recognize(&self, png: &[u8]) -> Result<String, ExtractError> {
        let start = Instant::now();

        let tmpdir = tempfile::TempDir::with_prefix("ocr-page")
            .map_err(|e| ExtractError::Internal(format!("cannot create temp dir: {e}")))?;
        let input_path = tmpdir.path().join("page.png");
        tokio::fs::write(&input_path, png)
            .await
            .map_err(|e| ExtractError::Internal(format!("cannot write OCR input: {e}")))?;

        let output = Command::new(&self.cmd)
            .arg(&input_path)
            .args(self.args())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.unavailable(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::OcrFailed(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("Recognised {} chars in {:?}", text.chars().count(), start.elapsed());
        Ok(text)
    }
}

/// First line of `tesseract --version`, e.g. `tesseract 5.3.4`.
fn parse_version(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    text.lines()
        .map(str::trim)
        .find(|l| l.starts_with("tesseract"))
        .map(|l| l.trim_start_matches("tesseract").trim().to_string())
        .filter(|v| !v.is_empty())
}
