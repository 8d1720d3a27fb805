//! HTTP server binary for doc-ocr-server.
//!
//! A thin shim over the library crate that maps CLI flags / environment
//! variables to `ServiceConfig`, checks the engines, and serves the router.

use anyhow::{Context, Result};
use clap::Parser;
use doc_ocr::{server, Extractor, Locale, PageHeader, ServiceConfig};
use std::io;
use std::net::IpAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Defaults: 0.0.0.0:8000, /usr/bin/tesseract, ara+eng, 300 DPI
  ocr-server

  # Custom port and tesseract location
  PORT=9000 TESSERACT_CMD=/opt/homebrew/bin/tesseract ocr-server

  # English-only recognition, English messages and page headers
  ocr-server --languages eng --locale en

REQUESTS:
  curl -F file=@scan.pdf http://localhost:8000/ocr
  curl -H 'Content-Type: application/json' \
       -d '{"file":"<base64>","filename":"scan.png"}' http://localhost:8000/ocr
  curl -H 'Content-Type: application/json' \
       -d '{"file_url":"https://example.com/scan.pdf"}' http://localhost:8000/ocr
  curl http://localhost:8000/health

ENVIRONMENT VARIABLES:
  RUST_LOG                Log filter (overrides --verbose), e.g. doc_ocr=debug
  PDFIUM_LIB_PATH         Directory containing libpdfium
"#;

/// Extract text from PDFs and images over HTTP with Tesseract OCR.
#[derive(Parser, Debug)]
#[command(
    name = "ocr-server",
    version,
    about = "Extract text from PDFs and images over HTTP with Tesseract OCR",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Path of the tesseract executable.
    #[arg(long, env = "TESSERACT_CMD", default_value = "/usr/bin/tesseract")]
    tesseract_cmd: PathBuf,

    /// Tesseract language models, joined with '+'.
    #[arg(long, env = "OCR_LANGUAGES", default_value = "ara+eng")]
    languages: String,

    /// Tesseract page segmentation mode (0–13).
    #[arg(long, env = "OCR_PSM", default_value_t = 1,
          value_parser = clap::value_parser!(u8).range(0..=13))]
    psm: u8,

    /// Tesseract OCR engine mode (0–3).
    #[arg(long, env = "OCR_OEM", default_value_t = 3,
          value_parser = clap::value_parser!(u8).range(0..=3))]
    oem: u8,

    /// PDF rendering DPI (72–600).
    #[arg(long, env = "OCR_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Cap on the longest edge of a rendered page, in pixels.
    #[arg(long, env = "OCR_MAX_RENDERED_PIXELS", default_value_t = 6000)]
    max_rendered_pixels: u32,

    /// Parallel page-encoding tasks per PDF request.
    #[arg(long, env = "OCR_RENDER_THREADS", default_value_t = 4)]
    render_threads: usize,

    /// Timeout for downloading `file_url` documents, in seconds.
    #[arg(long = "download-timeout", env = "OCR_DOWNLOAD_TIMEOUT_SECS", default_value_t = 120)]
    download_timeout_secs: u64,

    /// Largest accepted document, in megabytes.
    #[arg(long, env = "OCR_MAX_UPLOAD_MB", default_value_t = 100)]
    max_upload_mb: u64,

    /// Directory containing the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Language of error messages and page headers: ar, en.
    #[arg(long, env = "OCR_LOCALE", default_value = "ar")]
    locale: Locale,

    /// Page header: ar, en, none, or a template where {n} is the page number.
    #[arg(long, env = "OCR_PAGE_HEADER")]
    page_header: Option<PageHeader>,

    /// Verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> Result<ServiceConfig> {
        let mut builder = ServiceConfig::builder()
            .host(self.host)
            .port(self.port)
            .tesseract_cmd(&self.tesseract_cmd)
            .languages(&self.languages)
            .psm(self.psm)
            .oem(self.oem)
            .dpi(self.dpi)
            .max_rendered_pixels(self.max_rendered_pixels)
            .render_threads(self.render_threads)
            .download_timeout_secs(self.download_timeout_secs)
            .max_upload_mb(self.max_upload_mb)
            .locale(self.locale);

        if let Some(ref path) = self.pdfium_lib_path {
            builder = builder.pdfium_lib_path(path);
        }
        if let Some(ref header) = self.page_header {
            builder = builder.page_header(header.clone());
        }

        builder.build().context("invalid configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "doc_ocr=debug,tower_http=debug,info"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = cli.to_config()?;
    let addr = config.socket_addr();
    tracing::info!("Starting OCR Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("{:?}", config);

    // ── Fail fast when an engine is missing ──────────────────────────────
    let extractor = Extractor::from_config(config);
    let status = extractor
        .check_engines()
        .await
        .context("OCR engines are not usable; check TESSERACT_CMD and PDFIUM_LIB_PATH")?;
    tracing::info!(
        "OCR engine: {} {}",
        status.name,
        status.version.as_deref().unwrap_or("(unknown version)")
    );

    let app = server::router(server::AppState::new(extractor));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    tracing::info!("OCR Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
