//! Output types: the per-unit OCR text and the assembled response body.

use crate::config::PageHeader;
use crate::error::ExtractError;
use serde::Serialize;

/// Cleaned OCR text of one unit: a PDF page, or the single uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-indexed page number (always 1 for images).
    pub page_num: usize,
    pub text: String,
}

/// Successful extraction, serialised directly as the `/ocr` response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub success: bool,
    pub text: String,
    /// Number of characters (Unicode scalar values) in `text`.
    pub text_length: usize,
    /// Input size in MiB, rounded to two decimals.
    pub file_size_mb: f64,
    /// Page count for PDF input; absent for images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_count: Option<usize>,
}

impl ExtractionResult {
    /// Assemble the response for a PDF: every page gets its header and pages
    /// are joined by a blank line, in the order given.
    ///
    /// Fails with [`ExtractError::NoTextExtracted`] when all pages are blank,
    /// so headers alone never count as extracted text.
    pub fn from_pages(
        pages: &[PageText],
        header: &PageHeader,
        size_bytes: usize,
    ) -> Result<Self, ExtractError> {
        if pages.iter().all(|p| p.text.trim().is_empty()) {
            return Err(ExtractError::NoTextExtracted);
        }

        let blocks: Vec<String> = pages
            .iter()
            .map(|p| match header.render(p.page_num) {
                // A blank page keeps its header and nothing else.
                Some(h) => format!("{}\n{}", h, p.text.trim()).trim_end().to_string(),
                None => p.text.trim().to_string(),
            })
            .collect();

        Ok(Self::build(blocks.join("\n\n"), size_bytes, Some(pages.len())))
    }

    /// Assemble the response for a single image.
    pub fn from_image(page: &PageText, size_bytes: usize) -> Result<Self, ExtractError> {
        if page.text.trim().is_empty() {
            return Err(ExtractError::NoTextExtracted);
        }
        Ok(Self::build(page.text.clone(), size_bytes, None))
    }

    fn build(text: String, size_bytes: usize, pages_count: Option<usize>) -> Self {
        let text = text.trim().to_string();
        Self {
            success: true,
            text_length: text.chars().count(),
            text,
            file_size_mb: size_in_mb(size_bytes),
            pages_count,
        }
    }
}

/// `bytes / 1024²` rounded to two decimals.
pub fn size_in_mb(size_bytes: usize) -> f64 {
    let mb = size_bytes as f64 / (1024.0 * 1024.0);
    (mb * 100.0).round() / 100.0
}
