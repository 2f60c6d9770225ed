//! File HTTP Routes
//!
//! Upload, listing and by-name download for logged-in users.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{multipart::Field, Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::errors::{api_error, share_error, ApiError};
use super::state::{run_blocking, AppState};
use crate::sharing::{FileEntry, ResolvedFile, ShareError, UploadReceipt};

/// File routes with shared state
pub fn file_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_files_handler).post(upload_file_handler))
        .route("/:stored_name", get(download_file_handler))
        .with_state(state)
}

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct FileResponse {
    #[serde(flatten)]
    pub entry: FileEntry,
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct FilesListResponse {
    pub files: Vec<FileResponse>,
    pub total: usize,
}

// ==================
// Handlers
// ==================

async fn upload_file_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadReceipt>), ApiError> {
    let session = state.session_from_headers(&headers)?;
    let limit = state.service.max_upload_bytes();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(e.status().as_u16(), e.body_text()))?
    {
        let file_name = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let data = read_field(field, limit).await?;

        let receipt = run_blocking(&state, move |s| {
            s.service.upload(&session, &file_name, &data)
        })
        .await?;

        return Ok((StatusCode::CREATED, Json(receipt)));
    }

    Err(api_error(400, "No file provided"))
}

/// Read a multipart field, failing as soon as it passes `limit` bytes
async fn read_field(mut field: Field<'_>, limit: u64) -> Result<Vec<u8>, ApiError> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| api_error(e.status().as_u16(), e.body_text()))?
    {
        let size = (data.len() + chunk.len()) as u64;
        if size > limit {
            return Err(share_error(ShareError::SizeLimitExceeded { size, limit }));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn list_files_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<FilesListResponse>, ApiError> {
    let session = state.session_from_headers(&headers)?;

    let entries = run_blocking(&state, move |s| s.service.list_files(&session)).await?;
    let files: Vec<FileResponse> = entries
        .into_iter()
        .map(|entry| FileResponse {
            link: state.service.link_for(&entry.stored_name),
            entry,
        })
        .collect();

    Ok(Json(FilesListResponse {
        total: files.len(),
        files,
    }))
}

async fn download_file_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(stored_name): Path<String>,
) -> Result<(StatusCode, HeaderMap, Bytes), ApiError> {
    let session = state.session_from_headers(&headers)?;

    let file = run_blocking(&state, move |s| s.service.download(&session, &stored_name)).await?;
    Ok(attachment(file))
}

/// Response carrying a file as a download attachment
pub(crate) fn attachment(file: ResolvedFile) -> (StatusCode, HeaderMap, Bytes) {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(file.data.len()));
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&file.stored_name),
    );

    (StatusCode::OK, headers, Bytes::from(file.data))
}

fn content_disposition(stored_name: &str) -> HeaderValue {
    // Header values must be visible ASCII
    let filename: String = stored_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_escapes() {
        let value = content_disposition("alice_20240309140507_a\"b\u{e9}.txt");
        assert_eq!(
            value.to_str().unwrap(),
            "attachment; filename=\"alice_20240309140507_a_b_.txt\""
        );
    }

    #[test]
    fn test_attachment_headers() {
        let (status, headers, body) = attachment(ResolvedFile {
            stored_name: "alice_20240309140507_r.txt".into(),
            data: b"data".to_vec(),
        });

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_LENGTH], "4");
        assert_eq!(headers[header::CONTENT_TYPE], "application/octet-stream");
        assert_eq!(&body[..], b"data");
    }
}
