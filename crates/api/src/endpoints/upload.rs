//! Evidence upload.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    routing::post,
};
use bytes::BytesMut;
use cybersecure_common::{AppError, AppResult, config::UploadConfig};
use cybersecure_core::{
    FileUpload,
    evidence::{file_too_large, too_many_files},
};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::StoredFile};

/// Multipart field carrying files.
const FILES_FIELD: &str = "files";

/// `{message, files}` response.
#[derive(Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub files: Vec<StoredFile>,
}

fn multipart_error(e: &MultipartError) -> AppError {
    if e.status().as_u16() == 413 {
        AppError::BadRequest("Upload exceeds the maximum request size".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Read every `files` field, enforcing the count and per-file limits while
/// the body streams in.
pub(crate) async fn read_files(
    multipart: &mut Multipart,
    limits: UploadConfig,
) -> AppResult<Vec<FileUpload>> {
    let mut files = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        if files.len() == limits.max_files {
            return Err(too_many_files(limits.max_files));
        }

        let name = field.file_name().unwrap_or("file").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(&e))? {
            if data.len() + chunk.len() > limits.max_file_size {
                return Err(file_too_large(&name, limits.max_file_size));
            }
            data.extend_from_slice(&chunk);
        }

        files.push(FileUpload {
            name,
            content_type,
            data: data.freeze(),
        });
    }

    Ok(files)
}

/// Upload loose evidence files.
async fn upload_files(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let files = read_files(&mut multipart, state.evidence_service.limits()).await?;
    let uploaded = state.evidence_service.upload(user.id, &files).await?;

    Ok(Json(UploadResponse {
        message: "Files uploaded successfully",
        files: uploaded.into_iter().map(StoredFile::from).collect(),
    }))
}

pub fn router(limits: UploadConfig) -> Router<AppState> {
    Router::new().route(
        "/upload",
        post(upload_files).layer(DefaultBodyLimit::max(limits.body_limit())),
    )
}
