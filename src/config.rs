//! Service configuration.
//!
//! All runtime behaviour is controlled through [`ServiceConfig`], built via
//! its [`ServiceConfigBuilder`]. The config is created once at startup,
//! validated, and shared read-only by every request.

use crate::error::ExtractError;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

/// Immutable configuration of the extraction service.
///
/// # Example
/// ```rust
/// use doc_ocr::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .port(9000)
///     .dpi(200)
///     .languages("eng")
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 200);
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// Listen address. Default: `0.0.0.0`.
    pub host: IpAddr,

    /// Listen port. Default: 8000.
    pub port: u16,

    /// Path of the `tesseract` executable. Default: `/usr/bin/tesseract`.
    pub tesseract_cmd: PathBuf,

    /// Tesseract language models joined with `+`. Default: `ara+eng`.
    pub languages: String,

    /// Tesseract page segmentation mode. Default: 1 (automatic with OSD).
    pub psm: u8,

    /// Tesseract OCR engine mode. Default: 3 (best available).
    pub oem: u8,

    /// PDF rasterisation DPI. Range: 72–600. Default: 300.
    pub dpi: u32,

    /// Cap on the longest edge of a rendered page, in pixels. Default: 6000.
    pub max_rendered_pixels: u32,

    /// Parallel PNG-encoding tasks per PDF request. Default: 4.
    pub render_threads: usize,

    /// Download timeout for `file_url` inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Largest accepted document in megabytes. Default: 100.
    pub max_upload_mb: u64,

    /// Directory containing the PDFium shared library.
    /// If None, the working directory then the system library are tried.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Language of user-facing error messages and page headers. Default: Arabic.
    pub locale: Locale,

    /// Header placed above each PDF page's text.
    /// If None, the locale's default header is used.
    pub page_header: Option<PageHeader>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            tesseract_cmd: PathBuf::from("/usr/bin/tesseract"),
            languages: "ara+eng".to_string(),
            psm: 1,
            oem: 3,
            dpi: 300,
            max_rendered_pixels: 6000,
            render_threads: 4,
            download_timeout_secs: 120,
            max_upload_mb: 100,
            pdfium_lib_path: None,
            locale: Locale::default(),
            page_header: None,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("addr", &self.socket_addr())
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("languages", &self.languages)
            .field("psm", &self.psm)
            .field("oem", &self.oem)
            .field("dpi", &self.dpi)
            .field("render_threads", &self.render_threads)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("max_upload_mb", &self.max_upload_mb)
            .field("locale", &self.locale)
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Maximum document size in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_mb as usize).saturating_mul(1024 * 1024)
    }

    /// Request body limit: base64 inflates payloads by 4/3, plus JSON framing.
    pub fn body_limit_bytes(&self) -> usize {
        self.max_upload_bytes()
            .saturating_mul(4)
            .saturating_div(3)
            .saturating_add(64 * 1024)
    }

    /// The header that labels PDF pages, honouring an explicit override.
    pub fn effective_page_header(&self) -> PageHeader {
        self.page_header
            .clone()
            .unwrap_or_else(|| PageHeader::for_locale(self.locale))
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn host(mut self, host: IpAddr) -> Self {
        self.config.host = host;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn languages(mut self, langs: impl Into<String>) -> Self {
        self.config.languages = langs.into();
        self
    }

    pub fn psm(mut self, psm: u8) -> Self {
        self.config.psm = psm;
        self
    }

    pub fn oem(mut self, oem: u8) -> Self {
        self.config.oem = oem;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn render_threads(mut self, n: usize) -> Self {
        self.config.render_threads = n.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn max_upload_mb(mut self, mb: u64) -> Self {
        self.config.max_upload_mb = mb;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn locale(mut self, locale: Locale) -> Self {
        self.config.locale = locale;
        self
    }

    pub fn page_header(mut self, header: PageHeader) -> Self {
        self.config.page_header = Some(header);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, ExtractError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(ExtractError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.psm > 13 {
            return Err(ExtractError::InvalidConfig(format!(
                "PSM must be 0–13, got {}",
                c.psm
            )));
        }
        if c.oem > 3 {
            return Err(ExtractError::InvalidConfig(format!(
                "OEM must be 0–3, got {}",
                c.oem
            )));
        }
        if c.languages.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "At least one OCR language is required".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(ExtractError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        if c.max_upload_mb == 0 {
            return Err(ExtractError::InvalidConfig(
                "Upload limit must be ≥ 1 MB".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Language used for error messages and page headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Arabic,
    English,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ar" | "arabic" => Ok(Locale::Arabic),
            "en" | "english" => Ok(Locale::English),
            other => Err(format!("unknown locale '{other}' (expected ar or en)")),
        }
    }
}

/// Label written above each page's text in PDF output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageHeader {
    /// No header; pages are only separated by a blank line.
    None,
    /// `--- صفحة N ---`
    Arabic,
    /// `--- Page N ---`
    English,
    /// Custom template; every `{n}` is replaced by the page number.
    Custom(String),
}

impl PageHeader {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::Arabic => PageHeader::Arabic,
            Locale::English => PageHeader::English,
        }
    }

    /// Render the header for the given page number (1-indexed).
    /// Returns `None` when pages carry no header.
    pub fn render(&self, page_num: usize) -> Option<String> {
        match self {
            PageHeader::None => None,
            PageHeader::Arabic => Some(format!("--- صفحة {} ---", page_num)),
            PageHeader::English => Some(format!("--- Page {} ---", page_num)),
            PageHeader::Custom(t) => Some(t.replace("{n}", &page_num.to_string())),
        }
    }
}

impl FromStr for PageHeader {
    type Err = String;

    /// Parses `none`, `ar`, `en`, or any other string as a custom template.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(PageHeader::None),
            "ar" | "arabic" => Ok(PageHeader::Arabic),
            "en" | "english" => Ok(PageHeader::English),
            "" => Err("page header must not be empty (use 'none')".to_string()),
            custom => Ok(PageHeader::Custom(custom.to_string())),
        }
    }
}
