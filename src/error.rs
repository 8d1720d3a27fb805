//! Error types for the doc-ocr-server library.
//!
//! Every failure in the pipeline is an [`ExtractError`]. Extraction is
//! all-or-nothing per request, so there is no page-level error type: the
//! first failing page aborts the request.
//!
//! Variants are grouped into three [`ErrorKind`]s. The kind alone decides the
//! HTTP status and the machine-readable tag; the `Display` text is kept as the
//! untranslated `detail`, and [`ExtractError::localized`] produces the message
//! shown to end users.

use crate::config::Locale;
use thiserror::Error;

/// Coarse classification of an [`ExtractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something we cannot process (HTTP 400).
    ClientInput,
    /// Downloading a remote document failed (HTTP 400).
    UpstreamFetch,
    /// Rasterisation or OCR failed on an accepted document (HTTP 500).
    Processing,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::ClientInput | ErrorKind::UpstreamFetch => 400,
            ErrorKind::Processing => 500,
        }
    }

    /// Stable tag written to the `error_type` field of error responses.
    pub fn tag(self) -> &'static str {
        match self {
            ErrorKind::ClientInput => "client_input",
            ErrorKind::UpstreamFetch => "upstream_fetch",
            ErrorKind::Processing => "processing",
        }
    }
}

/// All errors returned by the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Client input ──────────────────────────────────────────────────────
    /// No `file` field / JSON key was sent.
    #[error("No file was sent")]
    MissingFile,

    /// The multipart file field has an empty or missing filename.
    #[error("File name is empty")]
    EmptyFilename,

    /// The document contained zero bytes.
    #[error("File is empty")]
    EmptyFile,

    /// JSON body carried both `file` and `file_url`.
    #[error("Send either 'file' or 'file_url', not both")]
    AmbiguousInput,

    /// Body could not be parsed as multipart or JSON.
    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),

    /// Extension / MIME hint is not a PDF or a supported raster format.
    #[error("Unsupported file type: {}", display_extension(.extension))]
    UnsupportedFileType { extension: String },

    /// Base64 payload could not be decoded.
    #[error("Invalid base64 data: {0}")]
    InvalidBase64(String),

    /// `file_url` is not an http/https URL.
    #[error("Invalid URL '{url}': only http and https are supported")]
    InvalidUrl { url: String },

    /// Document exceeds the configured size limit.
    #[error("File is {size_mb:.2} MB, the limit is {limit_mb} MB")]
    FileTooLarge { size_mb: f64, limit_mb: u64 },

    /// PDF is encrypted and cannot be opened without a password.
    #[error("PDF is password protected")]
    PasswordProtected,

    /// OCR ran successfully but produced no text.
    #[error("No text could be extracted from the file")]
    NoTextExtracted,

    // ── Upstream fetch ────────────────────────────────────────────────────
    /// Remote server answered with a non-2xx status.
    #[error("Failed to download '{url}': upstream returned HTTP {status}")]
    UpstreamStatus { url: String, status: u16 },

    /// Network-level download failure.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Processing ────────────────────────────────────────────────────────
    /// Bytes could not be parsed as the dispatched format.
    #[error("File is corrupt or unreadable: {0}")]
    CorruptDocument(String),

    /// PDF parsed but has no pages.
    #[error("PDF has no pages")]
    EmptyDocument,

    /// PDFium failed to render a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// PNG encoding of a page image failed.
    #[error("Image encoding failed for page {page}: {detail}")]
    ImageEncoding { page: usize, detail: String },

    /// Tesseract returned a non-zero exit status.
    #[error("OCR failed: {0}")]
    OcrFailed(String),

    /// OCR or rendering engine cannot be started.
    #[error("Engine '{engine}' is unavailable: {reason}")]
    EngineUnavailable { engine: String, reason: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn display_extension(ext: &str) -> &str {
    if ext.is_empty() {
        "(none)"
    } else {
        ext
    }
}

impl ExtractError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        use ExtractError::*;
        match self {
            MissingFile
            | EmptyFilename
            | EmptyFile
            | AmbiguousInput
            | InvalidRequestBody(_)
            | UnsupportedFileType { .. }
            | InvalidBase64(_)
            | InvalidUrl { .. }
            | FileTooLarge { .. }
            | PasswordProtected
            | NoTextExtracted => ErrorKind::ClientInput,
            UpstreamStatus { .. } | DownloadFailed { .. } | DownloadTimeout { .. } => {
                ErrorKind::UpstreamFetch
            }
            CorruptDocument(_)
            | EmptyDocument
            | RasterisationFailed { .. }
            | ImageEncoding { .. }
            | OcrFailed(_)
            | EngineUnavailable { .. }
            | InvalidConfig(_)
            | Internal(_) => ErrorKind::Processing,
        }
    }

    /// User-facing message in the given locale.
    ///
    /// English returns the `Display` text unchanged.
    pub fn localized(&self, locale: Locale) -> String {
        match locale {
            Locale::English => self.to_string(),
            Locale::Arabic => self.arabic(),
        }
    }

    fn arabic(&self) -> String {
        use ExtractError::*;
        match self {
            MissingFile => "لم يتم إرسال ملف".to_string(),
            EmptyFilename => "اسم الملف فارغ".to_string(),
            EmptyFile => "الملف فارغ".to_string(),
            AmbiguousInput => "أرسل إما 'file' أو 'file_url' وليس كليهما".to_string(),
            InvalidRequestBody(d) => format!("محتوى الطلب غير صالح: {d}"),
            UnsupportedFileType { extension } => {
                format!("نوع الملف غير مدعوم: {}", display_extension(extension))
            }
            InvalidBase64(d) => format!("بيانات base64 غير صالحة: {d}"),
            InvalidUrl { url } => format!("رابط غير صالح: {url}"),
            FileTooLarge { size_mb, limit_mb } => {
                format!("حجم الملف {size_mb:.2} ميجابايت يتجاوز الحد {limit_mb} ميجابايت")
            }
            PasswordProtected => "ملف PDF محمي بكلمة مرور".to_string(),
            NoTextExtracted => "لم يتم استخراج أي نص من الملف".to_string(),
            UpstreamStatus { status, .. } => format!("فشل تحميل الملف: {status}"),
            DownloadFailed { reason, .. } => format!("فشل تحميل الملف: {reason}"),
            DownloadTimeout { secs, .. } => {
                format!("انتهت مهلة تحميل الملف بعد {secs} ثانية")
            }
            // Processing failures keep the untranslated cause after the prefix.
            other => format!("فشل استخراج النص: {other}"),
        }
    }
}
