//! Pipeline stages for document text extraction.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested alone and the external engines can be swapped behind a trait.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ format ──▶ render ──▶ encode ──▶ ocr ──▶ postprocess
//! (bytes)   (pdf/img)  (pdfium)   (PNG)     (tesseract) (cleanup)
//! ```
//!
//! 1. [`input`]: acquire bytes from a multipart field, base64 or a URL
//! 2. [`format`]: pick the PDF or image path from extension / MIME hint
//! 3. [`render`]: rasterise PDF pages; runs in `spawn_blocking`
//! 4. [`encode`]: decode uploaded images, PNG-encode every page
//! 5. [`ocr`]: run Tesseract once per page, sequentially
//! 6. [`postprocess`]: deterministic cleanup of OCR artefacts

pub mod encode;
pub mod format;
pub mod input;
pub mod ocr;
pub mod postprocess;
pub mod render;
