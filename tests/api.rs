//! HTTP contract tests for `/health` and `/ocr`, using fake engines.

mod common;

use axum::body::Body;
use axum::http::Request;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::*;
use doc_ocr::Locale;
use serde_json::json;

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_succeeds_on_fresh_instance() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let req = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(engine.clone(), 1, Locale::Arabic), req).await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ocr_engine"]["available"], true);
    assert_eq!(engine.calls(), 0, "health must not run OCR");
}

// ── Multipart uploads ────────────────────────────────────────────────────────

#[tokio::test]
async fn image_upload_reports_trimmed_length_and_size() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let png = png_bytes(37, 5);
    let req = multipart_request("file", Some("scan.PNG"), &png);
    let (status, body) = send(app(engine.clone(), 1, Locale::Arabic), req).await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["success"], true);
    let text = body["text"].as_str().unwrap();
    assert_eq!(text, "نص text 37");
    assert_eq!(
        body["text_length"].as_u64().unwrap() as usize,
        text.trim().chars().count()
    );
    assert_eq!(body["file_size_mb"].as_f64().unwrap(), round2(png.len()));
    assert!(body.get("pages_count").is_none());
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn pdf_upload_labels_every_page_in_order() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let req = multipart_request("file", Some("report.pdf"), &fake_pdf());
    let (status, body) = send(app(engine.clone(), 5, Locale::Arabic), req).await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["pages_count"], 5);
    let text = body["text"].as_str().unwrap();

    assert_eq!(text.matches("--- صفحة ").count(), 5);
    let mut last = 0;
    for n in 1..=5 {
        let header = format!("--- صفحة {n} ---\nنص text {n}");
        let pos = text.find(&header).unwrap_or_else(|| panic!("missing {header:?} in {text:?}"));
        assert!(pos >= last, "page {n} out of order");
        last = pos;
    }
    assert!(text.contains("نص text 2\n\n--- صفحة 3 ---"));
    assert_eq!(engine.calls(), 5);
}

#[tokio::test]
async fn english_locale_uses_english_headers() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let req = multipart_request("file", Some("a.pdf"), &fake_pdf());
    let (_, body) = send(app(engine, 2, Locale::English), req).await;
    let text = body["text"].as_str().unwrap();
    assert!(text.starts_with("--- Page 1 ---\n"), "{text}");
    assert!(text.contains("--- Page 2 ---"));
}

#[tokio::test]
async fn page_text_is_normalised_not_just_trimmed() {
    let engine = FakeEngine::new(Reply::Messy);
    let req = multipart_request("file", Some("a.pdf"), &fake_pdf());
    let (status, body) = send(app(engine, 2, Locale::English), req).await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(
        body["text"],
        "--- Page 1 ---\nabc\n\nd\n\n--- Page 2 ---\nabc\n\nd"
    );
}

#[tokio::test]
async fn unknown_extension_is_client_error_naming_it() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let req = multipart_request("file", Some("notes.xyz"), &png_bytes(3, 3));
    let (status, body) = send(app(engine.clone(), 1, Locale::Arabic), req).await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "client_input");
    assert!(body["error"].as_str().unwrap().contains("xyz"));
    assert!(body["detail"].as_str().unwrap().contains("xyz"));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn missing_extension_is_client_error() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let req = multipart_request("file", Some("scan"), &png_bytes(3, 3));
    let (status, body) = send(app(engine, 1, Locale::English), req).await;

    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("Unsupported file type"));
}

#[tokio::test]
async fn blank_ocr_output_is_no_text_error() {
    let engine = FakeEngine::new(Reply::Blank);
    let req = multipart_request("file", Some("blank.png"), &png_bytes(8, 8));
    let (status, body) = send(app(engine, 1, Locale::English), req).await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No text could be extracted from the file");
}

#[tokio::test]
async fn blank_pdf_pages_are_no_text_error() {
    let engine = FakeEngine::new(Reply::Blank);
    let req = multipart_request("file", Some("blank.pdf"), &fake_pdf());
    let (status, body) = send(app(engine, 3, Locale::Arabic), req).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "لم يتم استخراج أي نص من الملف");
}

#[tokio::test]
async fn missing_file_field_is_client_error() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let req = multipart_request("document", Some("a.png"), &png_bytes(3, 3));
    let (status, body) = send(app(engine, 1, Locale::Arabic), req).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "لم يتم إرسال ملف");
}

#[tokio::test]
async fn empty_filename_is_client_error() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let req = multipart_request("file", Some(""), &png_bytes(3, 3));
    let (status, body) = send(app(engine, 1, Locale::Arabic), req).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "اسم الملف فارغ");
}

#[tokio::test]
async fn engine_failure_is_processing_error() {
    let engine = FakeEngine::new(Reply::Fail);
    let req = multipart_request("file", Some("a.png"), &png_bytes(3, 3));
    let (status, body) = send(app(engine, 1, Locale::Arabic), req).await;

    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "processing");
    assert!(body["detail"].as_str().unwrap().contains("engine crashed"));
}

#[tokio::test]
async fn corrupt_image_is_processing_error() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let req = multipart_request("file", Some("photo.jpg"), b"not really a jpeg");
    let (status, body) = send(app(engine.clone(), 1, Locale::English), req).await;

    assert_eq!(status, 500);
    assert_eq!(body["error_type"], "processing");
    assert_eq!(engine.calls(), 0);
}

// ── Base64 JSON ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn base64_image_is_extracted() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let png = png_bytes(12, 4);
    let req = json_request(json!({ "file": STANDARD.encode(&png), "filename": "x.png" }));
    let (status, body) = send(app(engine, 1, Locale::Arabic), req).await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["text"], "نص text 12");
    assert_eq!(body["file_size_mb"].as_f64().unwrap(), round2(png.len()));
}

#[tokio::test]
async fn base64_mimetype_overrides_missing_filename() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let req = json_request(json!({ "file": STANDARD.encode(fake_pdf()), "mimetype": "application/pdf" }));
    let (status, body) = send(app(engine, 2, Locale::Arabic), req).await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["pages_count"], 2);
}

#[tokio::test]
async fn base64_data_uri_is_accepted() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let uri = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(9, 9)));
    let (status, body) = send(app(engine, 1, Locale::Arabic), json_request(json!({ "file": uri }))).await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["text"], "نص text 9");
}

#[tokio::test]
async fn malformed_base64_is_client_error() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let req = json_request(json!({ "file": "@@not-base64@@", "filename": "x.png" }));
    let (status, body) = send(app(engine.clone(), 1, Locale::English), req).await;

    assert_eq!(status, 400);
    assert_eq!(body["error_type"], "client_input");
    assert!(body["error"].as_str().unwrap().starts_with("Invalid base64"));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn json_with_both_inputs_is_rejected() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let req = json_request(json!({ "file": "aGk=", "file_url": "http://localhost/x.pdf" }));
    let (status, _) = send(app(engine, 1, Locale::Arabic), req).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn invalid_json_is_client_error() {
    let engine = FakeEngine::new(Reply::EchoWidth);
    let req = Request::post("/ocr")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(engine, 1, Locale::English), req).await;

    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}
