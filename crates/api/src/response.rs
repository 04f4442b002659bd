//! API response types.

use axum::Json;
use cybersecure_common::UploadedFile;
use cybersecure_core::AuthSession;
use serde::Serialize;
use serde_json::Value;

/// `{message}` response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Create a `{message}` response.
pub fn message(text: impl Into<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.into(),
    })
}

/// `{message, user, session}` response for auth flows.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: String,
    pub user: Option<Value>,
    pub session: Option<Value>,
}

impl SessionResponse {
    /// Wrap an identity-provider result.
    pub fn new(message: impl Into<String>, session: AuthSession) -> Json<Self> {
        Json(Self {
            message: message.into(),
            user: session.user,
            session: session.session,
        })
    }
}

/// A stored file as the client addresses it.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    /// Key inside the bucket.
    pub path: String,
    /// Key including the bucket name.
    #[serde(rename = "fullPath")]
    pub full_path: String,
}

impl From<UploadedFile> for StoredFile {
    fn from(file: UploadedFile) -> Self {
        Self {
            path: file.key,
            full_path: file.full_path,
        }
    }
}
