//! Evidence upload.
//!
//! A batch of files is stored all-or-nothing: when one upload fails, the
//! objects already written for that batch are removed again. Attaching to a
//! report is the second phase of a submission; the report row itself is
//! never rolled back.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use cybersecure_common::{
    AppError, AppResult, IdGenerator, StorageBackend, UploadedFile, config::UploadConfig,
    evidence_key, report_evidence_key,
};
use uuid::Uuid;

use super::{
    report::ReportService,
    unified_report::{ReportKind, UnifiedReport},
};

/// One file received from a client.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Original file name.
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Evidence service.
#[derive(Clone)]
pub struct EvidenceService {
    storage: Arc<dyn StorageBackend>,
    limits: UploadConfig,
    id_gen: IdGenerator,
}

impl EvidenceService {
    /// Create a new evidence service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, limits: UploadConfig) -> Self {
        Self {
            storage,
            limits,
            id_gen: IdGenerator::new(),
        }
    }

    /// Upload limits in force.
    #[must_use]
    pub const fn limits(&self) -> UploadConfig {
        self.limits
    }

    /// Reject a batch that is empty, too large, or holds an oversized file.
    pub fn check_limits(&self, files: &[FileUpload]) -> AppResult<()> {
        if files.is_empty() {
            return Err(AppError::BadRequest("No files uploaded".to_string()));
        }
        if files.len() > self.limits.max_files {
            return Err(too_many_files(self.limits.max_files));
        }
        if let Some(file) = files.iter().find(|f| f.data.len() > self.limits.max_file_size) {
            return Err(file_too_large(&file.name, self.limits.max_file_size));
        }
        Ok(())
    }

    /// Store loose evidence files under `{user_id}/{uuid}-{name}`.
    pub async fn upload(&self, user_id: Uuid, files: &[FileUpload]) -> AppResult<Vec<UploadedFile>> {
        self.check_limits(files)?;

        let keys = files
            .iter()
            .map(|f| evidence_key(user_id, self.id_gen.generate_random(), &f.name))
            .collect::<Vec<_>>();

        let uploaded = self.store_all(&keys, files).await?;
        tracing::info!(user_id = %user_id, count = uploaded.len(), "Evidence uploaded");
        Ok(uploaded)
    }

    /// Store files for a report and append their paths to it.
    ///
    /// Only the report's owner may attach. When the row patch fails the
    /// stored objects are deleted and the error is returned.
    pub async fn attach_to_report(
        &self,
        reports: &ReportService,
        user_id: Uuid,
        kind: ReportKind,
        report_id: Uuid,
        files: &[FileUpload],
    ) -> AppResult<(UnifiedReport, Vec<UploadedFile>)> {
        self.check_limits(files)?;
        reports.get_owned(kind, report_id, user_id).await?;

        let timestamp = Utc::now().timestamp_millis();
        let keys = files
            .iter()
            .enumerate()
            .map(|(n, f)| {
                report_evidence_key(user_id, kind.as_str(), report_id, timestamp, n, &f.name)
            })
            .collect::<Vec<_>>();

        let uploaded = self.store_all(&keys, files).await?;

        match reports.append_evidence(kind, report_id, &keys).await {
            Ok(report) => {
                tracing::info!(
                    user_id = %user_id,
                    report_id = %report_id,
                    kind = %kind,
                    count = uploaded.len(),
                    "Evidence attached"
                );
                Ok((report, uploaded))
            }
            Err(e) => {
                tracing::warn!(report_id = %report_id, kind = %kind, error = %e, "Evidence patch failed, removing uploads");
                self.discard(&keys).await;
                Err(e)
            }
        }
    }

    /// Upload every file, deleting the ones already stored if any fails.
    async fn store_all(&self, keys: &[String], files: &[FileUpload]) -> AppResult<Vec<UploadedFile>> {
        let mut uploaded = Vec::with_capacity(files.len());

        for (key, file) in keys.iter().zip(files) {
            match self.storage.upload(key, &file.data, &file.content_type).await {
                Ok(stored) => uploaded.push(stored),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Upload failed, removing batch");
                    let written: Vec<String> = uploaded.iter().map(|u| u.key.clone()).collect();
                    self.discard(&written).await;
                    return Err(e);
                }
            }
        }

        Ok(uploaded)
    }

    /// Best-effort delete. Failures leave orphans and are only logged.
    async fn discard(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        if let Err(e) = self.storage.delete(keys).await {
            tracing::error!(error = %e, count = keys.len(), "Failed to remove orphaned uploads");
        }
    }
}

/// Error for a batch with more than `max` files.
#[must_use]
pub fn too_many_files(max: usize) -> AppError {
    AppError::BadRequest(format!("Too many files. At most {max} files per upload"))
}

/// Error for a file over the per-file limit.
#[must_use]
pub fn file_too_large(name: &str, max_bytes: usize) -> AppError {
    AppError::BadRequest(format!(
        "File {name} exceeds the size limit of {} MB",
        max_bytes / (1024 * 1024)
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory storage that fails on a chosen upload.
    #[derive(Default)]
    struct FlakyStorage {
        fail_on: Option<usize>,
        stored: Mutex<Vec<String>>,
        attempts: Mutex<usize>,
    }

    #[async_trait]
    impl StorageBackend for FlakyStorage {
        async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<UploadedFile> {
            let attempt = {
                let mut attempts = self.attempts.lock().unwrap();
                *attempts += 1;
                *attempts
            };
            if self.fail_on == Some(attempt) {
                return Err(AppError::Storage("bucket unavailable".to_string()));
            }
            self.stored.lock().unwrap().push(key.to_string());
            Ok(UploadedFile {
                key: key.to_string(),
                full_path: format!("evidence-files/{key}"),
                url: format!("/files/{key}"),
                size: data.len() as u64,
                content_type: content_type.to_string(),
            })
        }

        async fn delete(&self, keys: &[String]) -> AppResult<()> {
            self.stored.lock().unwrap().retain(|k| !keys.contains(k));
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("/files/{key}")
        }

        async fn exists(&self, key: &str) -> AppResult<bool> {
            Ok(self.stored.lock().unwrap().iter().any(|k| k == key))
        }
    }

    fn file(name: &str, size: usize) -> FileUpload {
        FileUpload {
            name: name.to_string(),
            content_type: "application/octet-stream".to_string(),
            data: Bytes::from(vec![0u8; size]),
        }
    }

    fn service(storage: Arc<FlakyStorage>) -> EvidenceService {
        EvidenceService::new(storage, UploadConfig::default())
    }

    #[test]
    fn test_rejects_empty_batch() {
        let svc = service(Arc::new(FlakyStorage::default()));
        let err = svc.check_limits(&[]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "No files uploaded"));
    }

    #[test]
    fn test_rejects_six_files() {
        let svc = service(Arc::new(FlakyStorage::default()));
        let files: Vec<_> = (0..6).map(|i| file(&format!("{i}.txt"), 1)).collect();
        assert!(matches!(svc.check_limits(&files), Err(AppError::BadRequest(_))));
        assert!(svc.check_limits(&files[..5]).is_ok());
    }

    #[test]
    fn test_rejects_oversized_file() {
        let svc = service(Arc::new(FlakyStorage::default()));
        let limit = UploadConfig::default().max_file_size;
        let err = svc.check_limits(&[file("big.mp4", limit + 1)]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("size limit")));
        assert!(svc.check_limits(&[file("ok.mp4", limit)]).is_ok());
    }

    #[tokio::test]
    async fn test_upload_uses_user_prefixed_keys() {
        let storage = Arc::new(FlakyStorage::default());
        let svc = service(storage.clone());
        let user_id = Uuid::new_v4();

        let uploaded = svc.upload(user_id, &[file("shot.png", 10)]).await.unwrap();

        assert_eq!(uploaded.len(), 1);
        assert!(uploaded[0].key.starts_with(&format!("{user_id}/")));
        assert!(uploaded[0].key.ends_with("-shot.png"));
        assert!(uploaded[0].full_path.starts_with("evidence-files/"));
    }

    #[tokio::test]
    async fn test_failed_upload_removes_earlier_objects() {
        let storage = Arc::new(FlakyStorage {
            fail_on: Some(3),
            ..Default::default()
        });
        let svc = service(storage.clone());

        let files: Vec<_> = (0..4).map(|i| file(&format!("{i}.txt"), 1)).collect();
        let err = svc.upload(Uuid::new_v4(), &files).await.unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        assert!(storage.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_patch_removes_attached_objects() {
        use crate::services::events::ReportEvents;
        use cybersecure_db::{
            entities::{ReportStatus, Severity, suspicious_entity},
            repositories::{GrievanceReportRepository, ProfileRepository, SuspiciousEntityRepository},
        };
        use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

        let user_id = Uuid::new_v4();
        let row = suspicious_entity::Model {
            id: Uuid::new_v4(),
            user_id,
            entity_type: "email".to_string(),
            entity_value: "ceo@examp1e.com".to_string(),
            description: "Gift card request".to_string(),
            evidence_files: serde_json::json!([]),
            threat_level: Severity::Medium,
            status: ReportStatus::Pending,
            admin_notes: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row.clone()]])
                .append_query_results([[row.clone()]])
                .append_query_errors([DbErr::Custom("connection reset".to_string())])
                .into_connection(),
        );
        let reports = ReportService::new(
            GrievanceReportRepository::new(db.clone()),
            SuspiciousEntityRepository::new(db.clone()),
            ProfileRepository::new(db),
            ReportEvents::new(),
        );

        let storage = Arc::new(FlakyStorage::default());
        let svc = service(storage.clone());

        let err = svc
            .attach_to_report(&reports, user_id, ReportKind::Suspicious, row.id, &[file("mail.eml", 5)])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(*storage.attempts.lock().unwrap(), 1);
        assert!(storage.stored.lock().unwrap().is_empty());
    }
}
