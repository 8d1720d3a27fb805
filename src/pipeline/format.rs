//! Format dispatch: decide whether a document is a PDF or a raster image.
//!
//! A recognised MIME hint wins over the filename extension; otherwise the
//! extension (case-insensitive, after the last `.`) decides. Content is never
//! sniffed, so a file named `scan.xyz` is rejected even if it holds a PNG.

use crate::error::ExtractError;

/// Raster formats accepted on the image path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Jpeg,
    Png,
    Webp,
    Bmp,
    Tiff,
}

impl RasterFormat {
    /// The matching `image` crate format used for decoding.
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            RasterFormat::Jpeg => image::ImageFormat::Jpeg,
            RasterFormat::Png => image::ImageFormat::Png,
            RasterFormat::Webp => image::ImageFormat::WebP,
            RasterFormat::Bmp => image::ImageFormat::Bmp,
            RasterFormat::Tiff => image::ImageFormat::Tiff,
        }
    }
}

/// Which pipeline path a document takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image(RasterFormat),
}

impl DocumentKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        let kind = match ext.to_ascii_lowercase().as_str() {
            "pdf" => DocumentKind::Pdf,
            "jpg" | "jpeg" => DocumentKind::Image(RasterFormat::Jpeg),
            "png" => DocumentKind::Image(RasterFormat::Png),
            "webp" => DocumentKind::Image(RasterFormat::Webp),
            "bmp" => DocumentKind::Image(RasterFormat::Bmp),
            "tif" | "tiff" => DocumentKind::Image(RasterFormat::Tiff),
            _ => return None,
        };
        Some(kind)
    }

    /// Parameters (`; charset=…`) are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        let kind = match essence.as_str() {
            "application/pdf" | "application/x-pdf" => DocumentKind::Pdf,
            "image/jpeg" | "image/jpg" | "image/pjpeg" => DocumentKind::Image(RasterFormat::Jpeg),
            "image/png" => DocumentKind::Image(RasterFormat::Png),
            "image/webp" => DocumentKind::Image(RasterFormat::Webp),
            "image/bmp" | "image/x-bmp" | "image/x-ms-bmp" => DocumentKind::Image(RasterFormat::Bmp),
            "image/tiff" | "image/tif" => DocumentKind::Image(RasterFormat::Tiff),
            _ => return None,
        };
        Some(kind)
    }

    /// Resolve the path for a document from its declared name and MIME hint.
    pub fn detect(filename: Option<&str>, mime_hint: Option<&str>) -> Result<Self, ExtractError> {
        if let Some(kind) = mime_hint.and_then(Self::from_mime) {
            return Ok(kind);
        }
        let ext = filename.map(extension_of).unwrap_or_default();
        Self::from_extension(&ext).ok_or(ExtractError::UnsupportedFileType { extension: ext })
    }
}

/// Lower-cased text after the last `.`; empty when there is none.
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}
