//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! ## Threading
//!
//! pdfium keeps thread-local state and must not be called from async
//! contexts. [`render_pages`] runs the whole document on Tokio's blocking
//! pool; pages are rendered one after another inside that task.
//!
//! Rendering sits behind the [`Rasterizer`] trait so the pipeline can be
//! exercised without a pdfium shared library.

use crate::error::ExtractError;
use axum::body::Bytes;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// One rendered page; page numbers are 1-based and follow document order.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub page_num: usize,
    pub image: DynamicImage,
}

/// Turns PDF bytes into page images. Implementations are blocking.
pub trait Rasterizer: Send + Sync {
    /// Short engine name used in logs and errors.
    fn name(&self) -> &str;

    /// Verify the backend can be loaded. Called once at startup.
    fn check(&self) -> Result<(), ExtractError>;

    /// Render every page, in order, at `dpi` with the longest edge capped
    /// at `max_pixels`.
    fn rasterize(
        &self,
        pdf: &[u8],
        dpi: u32,
        max_pixels: u32,
    ) -> Result<Vec<PageImage>, ExtractError>;
}

/// Run a rasterizer on the blocking pool.
pub async fn render_pages(
    rasterizer: Arc<dyn Rasterizer>,
    pdf: Bytes,
    dpi: u32,
    max_pixels: u32,
) -> Result<Vec<PageImage>, ExtractError> {
    tokio::task::spawn_blocking(move || rasterizer.rasterize(&pdf, dpi, max_pixels))
        .await
        .map_err(|e| ExtractError::Internal(format!("Render task panicked: {}", e)))?
}

/// [`Rasterizer`] backed by the pdfium shared library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    lib_path: Option<PathBuf>,
}

impl PdfiumRasterizer {
    /// Bind from `lib_path` when given, else the working directory, else the
    /// system library.
    pub fn new(lib_path: Option<PathBuf>) -> Self {
        Self { lib_path }
    }

    fn bind(&self) -> Result<Pdfium, ExtractError> {
        let bindings = match &self.lib_path {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| ExtractError::EngineUnavailable {
            engine: "pdfium".into(),
            reason: format!("{:?}", e),
        })?;

        Ok(Pdfium::new(bindings))
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn name(&self) -> &str {
        "pdfium"
    }

    fn check(&self) -> Result<(), ExtractError> {
        self.bind().map(|_| ())
    }

    fn rasterize(
        &self,
        pdf: &[u8],
        dpi: u32,
        max_pixels: u32,
    ) -> Result<Vec<PageImage>, ExtractError> {
        let pdfium = self.bind()?;

        let document = pdfium.load_pdf_from_byte_slice(pdf, None).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                ExtractError::PasswordProtected
            } else {
                ExtractError::CorruptDocument(err_str)
            }
        })?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        if total_pages == 0 {
            return Err(ExtractError::EmptyDocument);
        }
        info!("PDF loaded: {} pages, rendering at {} DPI", total_pages, dpi);

        let mut results = Vec::with_capacity(total_pages);

        for (idx, page) in pages.iter().enumerate() {
            let page_num = idx + 1;
            let (width, height) =
                target_size(page.width().value, page.height().value, dpi, max_pixels);

            let render_config = PdfRenderConfig::new()
                .set_target_width(width as i32)
                .set_target_height(height as i32)
                .render_form_data(true);

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                ExtractError::RasterisationFailed {
                    page: page_num,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                page_num,
                image.width(),
                image.height()
            );

            results.push(PageImage { page_num, image });
        }

        Ok(results)
    }
}

/// Pixel size for a page of `width_pt × height_pt` points at `dpi`, scaled
/// down proportionally so neither edge exceeds `max_pixels`.
pub fn target_size(width_pt: f32, height_pt: f32, dpi: u32, max_pixels: u32) -> (u32, u32) {
    let scale = dpi as f32 / 72.0;
    let mut w = (width_pt * scale).max(1.0);
    let mut h = (height_pt * scale).max(1.0);

    let longest = w.max(h);
    if longest > max_pixels as f32 {
        let shrink = max_pixels as f32 / longest;
        w *= shrink;
        h *= shrink;
    }

    (w.round().max(1.0) as u32, h.round().max(1.0) as u32)
}
