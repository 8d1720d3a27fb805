//! Input acquisition: turn whichever input mode a request used into raw bytes.
//!
//! Three sources feed the same pipeline:
//!
//! * [`DocumentSource::Multipart`]: bytes already read from a form field
//! * [`DocumentSource::Base64`]: a base64 string (optionally a `data:` URI)
//! * [`DocumentSource::Url`]: a remote document downloaded with `reqwest`
//!
//! Everything downstream only sees an [`IncomingDocument`].

use crate::config::ServiceConfig;
use crate::error::ExtractError;
use crate::output::size_in_mb;
use crate::pipeline::format::{extension_of, DocumentKind};
use axum::body::Bytes;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::time::Duration;
use tracing::{debug, info};

/// A document materialised from a request, discarded after processing.
#[derive(Debug, Clone)]
pub struct IncomingDocument {
    pub bytes: Bytes,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
}

impl IncomingDocument {
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Name used in log lines.
    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("<unnamed>")
    }
}

/// Where a document's bytes come from.
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// Uploaded form field. Dispatch relies on the filename only.
    Multipart { filename: String, bytes: Bytes },
    /// Base64 payload from a JSON body.
    Base64 {
        data: String,
        filename: Option<String>,
        mimetype: Option<String>,
    },
    /// Remote document to download.
    Url { url: String, filename: Option<String> },
}

impl DocumentSource {
    /// Short mode name used in logs.
    pub fn mode(&self) -> &'static str {
        match self {
            DocumentSource::Multipart { .. } => "multipart",
            DocumentSource::Base64 { .. } => "base64",
            DocumentSource::Url { .. } => "url",
        }
    }

    /// Acquire the document bytes, enforcing the configured size limit.
    pub async fn acquire(self, config: &ServiceConfig) -> Result<IncomingDocument, ExtractError> {
        let doc = match self {
            DocumentSource::Multipart { filename, bytes } => {
                if filename.trim().is_empty() {
                    return Err(ExtractError::EmptyFilename);
                }
                IncomingDocument {
                    bytes,
                    filename: Some(filename),
                    mime_type: None,
                }
            }
            DocumentSource::Base64 {
                data,
                filename,
                mimetype,
            } => {
                let (bytes, uri_mime) = decode_base64(&data)?;
                IncomingDocument {
                    bytes: Bytes::from(bytes),
                    filename,
                    mime_type: mimetype.or(uri_mime),
                }
            }
            DocumentSource::Url { url, filename } => {
                download_url(&url, filename, config).await?
            }
        };

        if doc.bytes.is_empty() {
            return Err(ExtractError::EmptyFile);
        }
        if doc.size_bytes() > config.max_upload_bytes() {
            return Err(ExtractError::FileTooLarge {
                size_mb: size_in_mb(doc.size_bytes()),
                limit_mb: config.max_upload_mb,
            });
        }
        Ok(doc)
    }
}

/// Decode a bare base64 string or a `data:<mime>;base64,<payload>` URI.
///
/// Returns the bytes and, for data URIs, the embedded MIME type.
pub fn decode_base64(data: &str) -> Result<(Vec<u8>, Option<String>), ExtractError> {
    let (payload, mime) = match data.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or_else(|| {
                ExtractError::InvalidBase64("data URI has no ',' separator".into())
            })?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or_else(|| ExtractError::InvalidBase64("data URI is not base64".into()))?;
            let mime = (!mime.is_empty()).then(|| mime.to_string());
            (payload, mime)
        }
        None => (data, None),
    };

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ExtractError::InvalidBase64(e.to_string()))?;
    debug!("Decoded base64 payload → {} bytes", bytes.len());
    Ok((bytes, mime))
}

/// Check if the input string looks like a URL we are willing to fetch.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Download a URL into memory, stopping once the body exceeds the upload cap.
///
/// A caller-supplied filename with a recognised extension outranks the
/// upstream `Content-Type`; otherwise the header is the MIME hint and the
/// last URL path segment stands in for a missing filename.
async fn download_url(
    url: &str,
    filename: Option<String>,
    config: &ServiceConfig,
) -> Result<IncomingDocument, ExtractError> {
    if !is_url(url) || reqwest::Url::parse(url).is_err() {
        return Err(ExtractError::InvalidUrl {
            url: url.to_string(),
        });
    }
    info!("Downloading document from: {}", url);

    let timeout_secs = config.download_timeout_secs;
    let max_bytes = config.max_upload_bytes();
    let too_large = |size: usize| ExtractError::FileTooLarge {
        size_mb: size_in_mb(size),
        limit_mb: config.max_upload_mb,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ExtractError::Internal(format!("HTTP client: {e}")))?;

    let map_err = |e: reqwest::Error| {
        if e.is_timeout() {
            ExtractError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            ExtractError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let mut response = client.get(url).send().await.map_err(map_err)?;

    if !response.status().is_success() {
        return Err(ExtractError::UpstreamStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let declared_len = response.content_length();
    if let Some(len) = declared_len {
        if len > max_bytes as u64 {
            return Err(too_large(usize::try_from(len).unwrap_or(usize::MAX)));
        }
    }

    let filename = filename.filter(|f| !f.trim().is_empty());
    let caller_named_type = filename
        .as_deref()
        .and_then(|f| DocumentKind::from_extension(&extension_of(f)))
        .is_some();
    let mime_type = if caller_named_type {
        None
    } else {
        response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or("").trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let filename = filename.or_else(|| filename_from_url(url));

    // Content-Length may be absent or wrong; the running total is authoritative.
    let mut buf = Vec::with_capacity(declared_len.map_or(0, |n| n as usize));
    while let Some(chunk) = response.chunk().await.map_err(map_err)? {
        let total = buf.len() + chunk.len();
        if total > max_bytes {
            return Err(too_large(total));
        }
        buf.extend_from_slice(&chunk);
    }
    info!("Downloaded {} bytes from {}", buf.len(), url);

    Ok(IncomingDocument {
        bytes: Bytes::from(buf),
        filename,
        mime_type,
    })
}

/// Last non-empty path segment of a URL, if any.
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    (!last.is_empty()).then(|| last.to_string())
}
