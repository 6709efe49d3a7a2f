//! Document ingestor: turns an uploaded file into a transport-ready payload.
//!
//! Preconditions enforced here: non-empty, within the size limit, and a media
//! type the scoring engine can read. Anything else fails before a model call.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

pub const MEDIA_TYPE_PDF: &str = "application/pdf";
pub const MEDIA_TYPE_TEXT: &str = "text/plain";

/// Used when neither the upload nor the file name reveal the media type.
const FALLBACK_MEDIA_TYPE: &str = MEDIA_TYPE_PDF;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("upload was interrupted: {0}")]
    Interrupted(String),

    #[error("no file was uploaded")]
    Missing,

    #[error("uploaded file is empty")]
    Empty,

    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported media type '{0}'")]
    UnsupportedMediaType(String),

    #[error("document could not be decoded: {0}")]
    Undecodable(String),
}

/// Raw upload as received from the client, before any validation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentData {
    /// Binary documents, base64-encoded for transport.
    Base64(String),
    /// Plain-text documents, sent inline.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPayload {
    pub file_name: Option<String>,
    pub media_type: String,
    pub size_bytes: usize,
    pub data: DocumentData,
}

#[derive(Debug, Clone, Copy)]
pub struct Ingestor {
    max_bytes: usize,
}

impl Ingestor {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn ingest(&self, upload: UploadedFile) -> Result<DocumentPayload, IngestError> {
        let size = upload.bytes.len();
        if size == 0 {
            return Err(IngestError::Empty);
        }
        if size > self.max_bytes {
            return Err(IngestError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }

        let media_type = resolve_media_type(upload.content_type.as_deref(), upload.file_name.as_deref());
        let data = match media_type.as_str() {
            MEDIA_TYPE_PDF => DocumentData::Base64(STANDARD.encode(&upload.bytes)),
            MEDIA_TYPE_TEXT => {
                let text = String::from_utf8(upload.bytes.to_vec())
                    .map_err(|e| IngestError::Undecodable(e.to_string()))?;
                DocumentData::Text(text)
            }
            other => return Err(IngestError::UnsupportedMediaType(other.to_string())),
        };

        debug!(
            "Ingested {:?}: {} bytes as {}",
            upload.file_name, size, media_type
        );

        Ok(DocumentPayload {
            file_name: upload.file_name,
            media_type,
            size_bytes: size,
            data,
        })
    }
}

/// Declared content type first (parameters dropped), then the file extension,
/// then the PDF fallback.
fn resolve_media_type(content_type: Option<&str>, file_name: Option<&str>) -> String {
    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");
    if let Some(declared) = declared {
        return declared;
    }

    file_name
        .and_then(|name| mime_guess::from_path(name).first_raw())
        .unwrap_or(FALLBACK_MEDIA_TYPE)
        .to_string()
}
