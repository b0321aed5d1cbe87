//! Uploaded CV → plain text.

use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

/// A CV file received from the multipart form.
#[derive(Debug, Clone)]
pub struct UploadedCv {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DocumentKind {
    Text,
    Pdf,
}

fn detect_kind(filename: Option<&str>, content_type: Option<&str>) -> Option<DocumentKind> {
    let extension = filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("md" | "markdown" | "txt") => return Some(DocumentKind::Text),
        Some("pdf") => return Some(DocumentKind::Pdf),
        _ => {}
    }

    let mime = content_type?.split(';').next()?.trim().to_ascii_lowercase();
    if mime == "application/pdf" {
        Some(DocumentKind::Pdf)
    } else if mime.starts_with("text/") {
        Some(DocumentKind::Text)
    } else {
        None
    }
}

/// Extracts text from a Markdown/plain-text or PDF upload.
/// PDF parsing is CPU-bound and runs on the blocking pool.
pub async fn extract_text(upload: UploadedCv) -> Result<String, AppError> {
    if upload.data.is_empty() {
        return Err(AppError::Validation("cv_file is empty".to_string()));
    }

    let kind = detect_kind(upload.filename.as_deref(), upload.content_type.as_deref())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "Unsupported CV format '{}': upload a PDF, Markdown or plain-text file",
                upload.filename.as_deref().unwrap_or("<unnamed>")
            ))
        })?;

    let text = match kind {
        DocumentKind::Text => String::from_utf8(upload.data.to_vec())
            .map_err(|_| AppError::Validation("cv_file is not valid UTF-8 text".to_string()))?,
        DocumentKind::Pdf => {
            let data = upload.data;
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
                .await
                .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
                .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?
        }
    };

    debug!("Extracted {} chars from CV ({:?})", text.len(), kind);
    Ok(text)
}
