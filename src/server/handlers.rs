//! Route handlers.

use super::response::ApiError;
use super::AppState;
use crate::error::ExtractError;
use crate::output::ExtractionResult;
use crate::pipeline::input::DocumentSource;
use crate::pipeline::ocr::EngineStatus;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub ocr_engine: EngineStatus,
}

/// GET /health
///
/// Always 200 while the process is up; the engine status is informational.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.extractor().engine_status().await;
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "OCR Server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ocr_engine: engine,
    })
}

/// JSON body of `POST /ocr`: either `file` (base64) or `file_url`.
#[derive(Debug, Default, Deserialize)]
pub struct OcrJsonRequest {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
}

impl OcrJsonRequest {
    pub fn into_source(self) -> Result<DocumentSource, ExtractError> {
        match (self.file, self.file_url) {
            (Some(_), Some(_)) => Err(ExtractError::AmbiguousInput),
            (Some(data), None) => Ok(DocumentSource::Base64 {
                data,
                filename: self.filename,
                mimetype: self.mimetype,
            }),
            (None, Some(url)) => Ok(DocumentSource::Url {
                url,
                filename: self.filename,
            }),
            (None, None) => Err(ExtractError::MissingFile),
        }
    }
}

/// POST /ocr
///
/// `multipart/form-data` bodies are read as an upload; anything else must be
/// a JSON [`OcrJsonRequest`].
pub async fn extract_text(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ExtractionResult>, ApiError> {
    let extractor = state.extractor();
    let locale = extractor.config().locale;
    let fail = |e: ExtractError| ApiError::new(e, locale);

    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false);

    let source = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| fail(ExtractError::InvalidRequestBody(e.body_text())))?;
        read_upload(multipart).await.map_err(fail)?
    } else {
        let Json(body) = Json::<OcrJsonRequest>::from_request(request, &state)
            .await
            .map_err(|e| fail(ExtractError::InvalidRequestBody(e.body_text())))?;
        body.into_source().map_err(fail)?
    };

    info!("Received {} document", source.mode());
    let doc = source.acquire(extractor.config()).await.map_err(fail)?;
    let result = extractor.extract(doc).await.map_err(fail)?;
    Ok(Json(result))
}

/// Pull the `file` field out of a multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<DocumentSource, ExtractError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ExtractError::InvalidRequestBody(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ExtractError::InvalidRequestBody(e.body_text()))?;
        return Ok(DocumentSource::Multipart { filename, bytes });
    }
    Err(ExtractError::MissingFile)
}
