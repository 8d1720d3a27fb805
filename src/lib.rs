//! # doc-ocr-server
//!
//! Extract text from PDFs and images over HTTP, using Tesseract for
//! recognition (Arabic + English by default) and pdfium for rasterisation.
//!
//! ## Pipeline Overview
//!
//! ```text
//! request
//!  │
//!  ├─ 1. Input    multipart upload, base64 JSON, or remote URL → bytes
//!  ├─ 2. Format   PDF or raster image, from extension / MIME hint
//!  ├─ 3. Render   PDF pages → images via pdfium (spawn_blocking)
//!  ├─ 4. Encode   images → PNG, bounded parallelism, order preserved
//!  ├─ 5. OCR      one Tesseract run per page, sequential
//!  ├─ 6. Clean    form feeds, invisible chars, blank-line runs
//!  └─ 7. Output   page-labelled text + length + size as JSON
//! ```
//!
//! Extraction is all-or-nothing per request: any failure becomes a single
//! [`ExtractError`], classified by [`ErrorKind`] into a 400 or 500 response.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc_ocr::{server, Extractor, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::builder().port(8000).build()?;
//!     let addr = config.socket_addr();
//!     let extractor = Extractor::from_config(config);
//!     extractor.check_engines().await?;
//!
//!     let app = server::router(server::AppState::new(extractor));
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Locale, PageHeader, ServiceConfig, ServiceConfigBuilder};
pub use error::{ErrorKind, ExtractError};
pub use extract::Extractor;
pub use output::{ExtractionResult, PageText};
pub use pipeline::format::{DocumentKind, RasterFormat};
pub use pipeline::input::{DocumentSource, IncomingDocument};
pub use pipeline::ocr::{EngineStatus, OcrEngine, TesseractEngine};
pub use pipeline::render::{PageImage, PdfiumRasterizer, Rasterizer};
