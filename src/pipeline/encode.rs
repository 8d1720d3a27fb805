//! Image encoding: raster decode and `DynamicImage` → PNG bytes for Tesseract.
//!
//! Every page reaches Tesseract as lossless PNG, whatever the input format.

use crate::error::ExtractError;
use crate::pipeline::format::RasterFormat;
use crate::pipeline::render::PageImage;
use futures::stream::{self, StreamExt, TryStreamExt};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode one image as PNG.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!("Encoded {}x{} image → {} bytes PNG", img.width(), img.height(), buf.len());
    Ok(buf)
}

/// Decode uploaded image bytes as the dispatched format.
pub fn decode_raster(bytes: &[u8], format: RasterFormat) -> Result<DynamicImage, ExtractError> {
    image::load_from_memory_with_format(bytes, format.image_format())
        .map_err(|e| ExtractError::CorruptDocument(format!("cannot decode {:?} image: {}", format, e)))
}

/// Decode an uploaded image and re-encode it as PNG on the blocking pool.
pub async fn prepare_image(
    bytes: axum::body::Bytes,
    format: RasterFormat,
) -> Result<Vec<u8>, ExtractError> {
    tokio::task::spawn_blocking(move || {
        let img = decode_raster(&bytes, format)?;
        debug!("Decoded {:?} image: {}x{} px", format, img.width(), img.height());
        encode_png(&img).map_err(|e| ExtractError::ImageEncoding {
            page: 1,
            detail: e.to_string(),
        })
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("Encode task panicked: {}", e)))?
}

/// PNG-encode rendered pages with at most `threads` blocking tasks in flight.
///
/// Output order equals input order (`buffered`, not `buffer_unordered`).
pub async fn encode_pages(
    pages: Vec<PageImage>,
    threads: usize,
) -> Result<Vec<(usize, Vec<u8>)>, ExtractError> {
    stream::iter(pages.into_iter().map(|page| async move {
        let page_num = page.page_num;
        tokio::task::spawn_blocking(move || encode_png(&page.image))
            .await
            .map_err(|e| ExtractError::Internal(format!("Encode task panicked: {}", e)))?
            .map(|png| (page_num, png))
            .map_err(|e| ExtractError::ImageEncoding {
                page: page_num,
                detail: e.to_string(),
            })
    }))
    .buffered(threads.max(1))
    .try_collect()
    .await
}
