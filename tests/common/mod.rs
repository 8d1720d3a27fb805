//! Shared fakes for integration tests: an OCR engine and a rasterizer that
//! need neither tesseract nor pdfium.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use doc_ocr::server::{router, AppState};
use doc_ocr::{
    EngineStatus, ExtractError, Extractor, Locale, OcrEngine, PageImage, Rasterizer,
    ServiceConfig,
};
use image::{DynamicImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// What the fake engine answers.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// `"<label> <width>"` where width is the PNG's pixel width, with the
    /// usual Tesseract trailing form feed.
    EchoWidth,
    /// Whitespace only.
    Blank,
    /// CRLF, a zero-width space, trailing spaces and a long blank run.
    Messy,
    /// Non-zero exit.
    Fail,
}

pub struct FakeEngine {
    reply: Reply,
    calls: AtomicUsize,
}

impl FakeEngine {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    async fn probe(&self) -> EngineStatus {
        EngineStatus {
            name: "fake".into(),
            available: true,
            version: Some("0.0.1".into()),
        }
    }

    async fn recognize(&self, png: &[u8]) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Reply::EchoWidth => {
                let img = image::load_from_memory(png)
                    .map_err(|e| ExtractError::OcrFailed(e.to_string()))?;
                Ok(format!("  نص text {}  \n\n\n\n\u{000C}", img.width()))
            }
            Reply::Blank => Ok(" \n\u{000C}".into()),
            Reply::Messy => Ok("ab\u{200B}c  \r\n\n\n\n\nd\u{000C}".into()),
            Reply::Fail => Err(ExtractError::OcrFailed("engine crashed".into())),
        }
    }
}

/// Renders `pages` pages; page N is N pixels wide so the fake engine can
/// report which page it saw.
pub struct FakeRasterizer {
    pub pages: usize,
}

impl Rasterizer for FakeRasterizer {
    fn name(&self) -> &str {
        "fake"
    }

    fn check(&self) -> Result<(), ExtractError> {
        Ok(())
    }

    fn rasterize(
        &self,
        pdf: &[u8],
        _dpi: u32,
        _max_pixels: u32,
    ) -> Result<Vec<PageImage>, ExtractError> {
        if !pdf.starts_with(b"%PDF") {
            return Err(ExtractError::CorruptDocument("missing %PDF header".into()));
        }
        if self.pages == 0 {
            return Err(ExtractError::EmptyDocument);
        }
        Ok((1..=self.pages)
            .map(|n| PageImage {
                page_num: n,
                image: solid(n as u32, 2),
            })
            .collect())
    }
}

pub fn solid(w: u32, h: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])))
}

pub fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    solid(w, h)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

pub fn fake_pdf() -> Vec<u8> {
    b"%PDF-1.7\n% fake document for tests\n".to_vec()
}

pub fn config(locale: Locale) -> ServiceConfig {
    ServiceConfig::builder()
        .locale(locale)
        .download_timeout_secs(5)
        .build()
        .unwrap()
}

pub fn app(engine: Arc<FakeEngine>, pages: usize, locale: Locale) -> Router {
    app_with_config(engine, pages, config(locale))
}

pub fn app_with_config(engine: Arc<FakeEngine>, pages: usize, config: ServiceConfig) -> Router {
    let extractor = Extractor::new(config, engine, Arc::new(FakeRasterizer { pages }));
    router(AppState::new(extractor))
}

pub const BOUNDARY: &str = "----ocr-test-boundary";

/// Multipart body with one field. `filename = None` omits the attribute.
pub fn multipart_body(field: &str, filename: Option<&str>, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    match filename {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").as_bytes(),
        ),
    }
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(field: &str, filename: Option<&str>, content: &[u8]) -> Request<Body> {
    Request::post("/ocr")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, filename, content)))
        .unwrap()
}

pub fn json_request(value: serde_json::Value) -> Request<Body> {
    Request::post("/ocr")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap()
}

/// Send one request and decode the JSON response.
pub async fn send(app: Router, req: Request<Body>) -> (u16, serde_json::Value) {
    let resp: Response<Body> = app.oneshot(req).await.unwrap();
    let status = resp.status().as_u16();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("non-JSON body ({e}): {}", String::from_utf8_lossy(&bytes)));
    (status, json)
}

pub fn round2(bytes: usize) -> f64 {
    ((bytes as f64 / (1024.0 * 1024.0)) * 100.0).round() / 100.0
}
