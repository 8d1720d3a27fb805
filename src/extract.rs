//! The shared extraction pipeline.
//!
//! Every input mode ends up here as an [`IncomingDocument`]. The pipeline is
//! strictly linear and all-or-nothing: the first failing stage aborts the
//! request, and no partial text is ever returned.

use crate::config::ServiceConfig;
use crate::error::ExtractError;
use crate::output::{size_in_mb, ExtractionResult, PageText};
use crate::pipeline::format::{DocumentKind, RasterFormat};
use crate::pipeline::input::IncomingDocument;
use crate::pipeline::ocr::{EngineStatus, OcrEngine, TesseractEngine};
use crate::pipeline::render::{PdfiumRasterizer, Rasterizer};
use crate::pipeline::{encode, postprocess, render};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runs documents through dispatch → render → OCR → assembly.
///
/// Cheap to share: the config and both engines are immutable.
pub struct Extractor {
    config: ServiceConfig,
    engine: Arc<dyn OcrEngine>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl Extractor {
    pub fn new(
        config: ServiceConfig,
        engine: Arc<dyn OcrEngine>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        Self {
            config,
            engine,
            rasterizer,
        }
    }

    /// Extractor using Tesseract and pdfium as configured.
    pub fn from_config(config: ServiceConfig) -> Self {
        let engine = Arc::new(TesseractEngine::from_config(&config));
        let rasterizer = Arc::new(PdfiumRasterizer::new(config.pdfium_lib_path.clone()));
        Self::new(config, engine, rasterizer)
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Verify both engines before accepting traffic.
    pub async fn check_engines(&self) -> Result<EngineStatus, ExtractError> {
        let status = self.engine.probe().await;
        if !status.available {
            return Err(ExtractError::EngineUnavailable {
                engine: status.name,
                reason: "the OCR binary could not be executed".into(),
            });
        }

        let rasterizer = Arc::clone(&self.rasterizer);
        tokio::task::spawn_blocking(move || rasterizer.check())
            .await
            .map_err(|e| ExtractError::Internal(format!("Engine check panicked: {}", e)))??;

        Ok(status)
    }

    /// OCR engine availability for the health probe.
    pub async fn engine_status(&self) -> EngineStatus {
        self.engine.probe().await
    }

    /// Extract the text of one document.
    pub async fn extract(&self, doc: IncomingDocument) -> Result<ExtractionResult, ExtractError> {
        let start = Instant::now();
        info!(
            "Processing file: {} - size: {:.2} MB",
            doc.display_name(),
            size_in_mb(doc.size_bytes())
        );

        let kind = DocumentKind::detect(doc.filename.as_deref(), doc.mime_type.as_deref())?;
        debug!("Dispatched {} as {:?}", doc.display_name(), kind);

        let result = match kind {
            DocumentKind::Pdf => self.extract_pdf(&doc).await?,
            DocumentKind::Image(format) => self.extract_image(&doc, format).await?,
        };

        info!(
            "Extracted {} chars from {} in {}ms",
            result.text_length,
            doc.display_name(),
            start.elapsed().as_millis()
        );
        Ok(result)
    }

    async fn extract_pdf(&self, doc: &IncomingDocument) -> Result<ExtractionResult, ExtractError> {
        // ── Step 1: Rasterise pages ──────────────────────────────────────────
        let render_start = Instant::now();
        let images = render::render_pages(
            Arc::clone(&self.rasterizer),
            doc.bytes.clone(),
            self.config.dpi,
            self.config.max_rendered_pixels,
        )
        .await?;
        let total = images.len();
        info!(
            "Rendered {} pages in {}ms",
            total,
            render_start.elapsed().as_millis()
        );

        // ── Step 2: Encode pages to PNG ──────────────────────────────────────
        let encoded = encode::encode_pages(images, self.config.render_threads).await?;

        // ── Step 3: OCR each page, in order ──────────────────────────────────
        let mut pages = Vec::with_capacity(total);
        for (page_num, png) in encoded {
            info!("Processing page {}/{}", page_num, total);
            let raw = self.engine.recognize(&png).await?;
            // Normalised, not just trimmed: form feeds, invisible chars and
            // blank-line runs are removed before assembly.
            pages.push(PageText {
                page_num,
                text: postprocess::clean_text(&raw),
            });
        }

        // ── Step 4: Assemble ─────────────────────────────────────────────────
        ExtractionResult::from_pages(
            &pages,
            &self.config.effective_page_header(),
            doc.size_bytes(),
        )
    }

    async fn extract_image(
        &self,
        doc: &IncomingDocument,
        format: RasterFormat,
    ) -> Result<ExtractionResult, ExtractError> {
        info!("Processing image...");
        let png = encode::prepare_image(doc.bytes.clone(), format).await?;
        let raw = self.engine.recognize(&png).await?;
        // Same normalisation as PDF pages.
        let page = PageText {
            page_num: 1,
            text: postprocess::clean_text(&raw),
        };
        ExtractionResult::from_image(&page, doc.size_bytes())
    }
}
