//! Model service - upload, translation and status workflow

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::domain::model::{
    MAX_UPLOAD_SIZE, is_archive, normalize_entry_point, object_key_for, validate_upload,
    validate_urn,
};
use crate::domain::{
    DomainError, Manifest, ModelRef, ModelStatus, ObjectStore, PollPolicy, TranslationJob,
    TranslationService, wait_for_translation,
};

/// A design file received from a client
#[derive(Debug, Clone)]
pub struct UploadModelRequest {
    pub file_name: String,
    pub content: Bytes,
    /// Root design inside a zip archive
    pub entry_point: Option<String>,
}

impl UploadModelRequest {
    pub fn new(file_name: impl Into<String>, content: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content,
            entry_point: None,
        }
    }

    pub fn with_entry_point(mut self, entry_point: Option<String>) -> Self {
        self.entry_point = entry_point;
        self
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Coordinates the object store and the translation service
#[derive(Debug, Clone)]
pub struct ModelService {
    store: Arc<dyn ObjectStore>,
    translator: Arc<dyn TranslationService>,
    max_upload_size: u64,
    poll_policy: PollPolicy,
}

impl ModelService {
    pub fn new(store: Arc<dyn ObjectStore>, translator: Arc<dyn TranslationService>) -> Self {
        Self {
            store,
            translator,
            max_upload_size: MAX_UPLOAD_SIZE,
            poll_policy: PollPolicy::default(),
        }
    }

    pub fn with_max_upload_size(mut self, max_upload_size: u64) -> Self {
        self.max_upload_size = max_upload_size;
        self
    }

    pub fn with_poll_policy(mut self, poll_policy: PollPolicy) -> Self {
        self.poll_policy = poll_policy;
        self
    }

    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    /// All designs stored in the bucket
    pub async fn list_models(&self) -> Result<Vec<ModelRef>, DomainError> {
        let objects = self.store.list_objects().await?;

        Ok(objects.iter().map(|o| o.to_model_ref()).collect())
    }

    /// Flattened translation status of `urn`
    pub async fn get_status(&self, urn: &str) -> Result<ModelStatus, DomainError> {
        let urn = validate_urn(urn)?;

        match self.translator.get_manifest(urn).await? {
            Some(manifest) => {
                debug!(
                    urn = %urn,
                    status = %manifest.status,
                    progress = manifest.progress.as_deref().unwrap_or(""),
                    "Model status retrieved"
                );
                Ok(ModelStatus::from_manifest(&manifest))
            }
            None => {
                debug!(urn = %urn, "No manifest found for model");
                Ok(ModelStatus::not_available())
            }
        }
    }

    /// Validate, upload and start translating a design
    pub async fn upload_model(&self, request: UploadModelRequest) -> Result<ModelRef, DomainError> {
        validate_upload(&request.file_name, request.size(), self.max_upload_size).map_err(|e| {
            warn!(file_name = %request.file_name, size = request.size(), error = %e, "Upload rejected");
            DomainError::from(e)
        })?;

        let entry_point = normalize_entry_point(request.entry_point.as_deref());

        if is_archive(&request.file_name) && entry_point.is_none() {
            debug!(file_name = %request.file_name, "Archive uploaded without an entry point");
        }

        let object_key = object_key_for(&request.file_name);

        self.store.ensure_bucket().await?;
        let object = self.store.upload_object(&object_key, request.content).await?;
        let model = object.to_model_ref();

        debug!(object_id = %object.object_id, "Starting model translation");
        let job = TranslationJob::new(model.urn.clone()).with_root_filename(entry_point);
        self.translator.start_translation(&job).await?;

        info!(name = %model.name, urn = %model.urn, "Model uploaded and translation started");

        Ok(model)
    }

    /// Block until the translation of `urn` finishes or the poll policy runs out
    pub async fn wait_for_translation(&self, urn: &str) -> Result<Manifest, DomainError> {
        let urn = validate_urn(urn)?;
        wait_for_translation(self.translator.as_ref(), urn, self.poll_policy).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::manifest::{Derivative, ManifestStatus};
    use crate::domain::storage::mock::MockObjectStore;
    use crate::domain::translation::mock::MockTranslationService;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn service(
        store: Arc<MockObjectStore>,
        translator: Arc<MockTranslationService>,
    ) -> ModelService {
        ModelService::new(store, translator)
    }

    #[tokio::test]
    async fn test_list_models_maps_objects() {
        let store = Arc::new(MockObjectStore::new().with_object("a.rvt").with_object("b.ifc"));
        let models = service(store, Arc::new(MockTranslationService::new()))
            .list_models()
            .await
            .unwrap();

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "a.rvt");
        assert_eq!(
            models[0].urn,
            crate::domain::model::urnify("urn:adsk.objects:os.object:mock-bucket/a.rvt")
        );
    }

    #[tokio::test]
    async fn test_list_models_propagates_store_failure() {
        let store = Arc::new(MockObjectStore::failing("unreachable"));
        let err = service(store, Arc::new(MockTranslationService::new()))
            .list_models()
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_status_requires_urn() {
        let translator = Arc::new(MockTranslationService::new());
        let svc = service(Arc::new(MockObjectStore::new()), translator.clone());

        let err = svc.get_status("   ").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert_eq!(translator.manifest_calls(), 0);
    }

    #[tokio::test]
    async fn test_status_rejects_urn_with_path_characters() {
        let translator = Arc::new(MockTranslationService::new());
        let svc = service(Arc::new(MockObjectStore::new()), translator.clone());

        for urn in ["../../oss/v2/buckets", "dXJu?x=", "dXJu/manifest"] {
            let err = svc.get_status(urn).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation { .. }), "{}", urn);
        }
        assert_eq!(translator.manifest_calls(), 0);
    }

    #[tokio::test]
    async fn test_status_without_manifest_is_not_available() {
        let svc = service(
            Arc::new(MockObjectStore::new()),
            Arc::new(MockTranslationService::new().with_manifest(None)),
        );

        assert_eq!(svc.get_status("dXJu").await.unwrap(), ModelStatus::not_available());
    }

    #[tokio::test]
    async fn test_status_flattens_manifest() {
        let manifest = Manifest::new(ManifestStatus::InProgress)
            .with_progress("40% complete")
            .with_derivative(Derivative {
                messages: vec![serde_json::json!({"code": "W1"})],
                ..Derivative::default()
            });
        let svc = service(
            Arc::new(MockObjectStore::new()),
            Arc::new(MockTranslationService::new().with_manifest(Some(manifest))),
        );

        let status = svc.get_status("dXJu").await.unwrap();
        assert_eq!(status.status, "inprogress");
        assert_eq!(status.progress.as_deref(), Some("40% complete"));
        assert_eq!(status.messages.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_rejects_disallowed_extension_before_network() {
        let store = Arc::new(MockObjectStore::new());
        let translator = Arc::new(MockTranslationService::new());
        let svc = service(store.clone(), translator.clone());

        for name in ["notes.txt", "photo.jpeg", "script.sh", "noextension"] {
            let result = svc
                .upload_model(UploadModelRequest::new(name, Bytes::from_static(b"x")))
                .await;
            assert!(matches!(result, Err(DomainError::Validation { .. })), "{}", name);
        }

        assert_eq!(store.network_calls(), 0);
        assert!(translator.jobs().is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file_before_network() {
        let store = Arc::new(MockObjectStore::new());
        let svc = service(store.clone(), Arc::new(MockTranslationService::new()))
            .with_max_upload_size(8);

        let result = svc
            .upload_model(UploadModelRequest::new(
                "model.rvt",
                Bytes::from_static(b"123456789"),
            ))
            .await;

        assert_err!(&result);
        assert!(result.unwrap_err().to_string().contains("exceeds"));
        assert_eq!(store.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_then_translate() {
        let store = Arc::new(MockObjectStore::new());
        let translator = Arc::new(MockTranslationService::new());
        let svc = service(store.clone(), translator.clone());

        let model = assert_ok!(
            svc.upload_model(UploadModelRequest::new(
                "model.rvt",
                Bytes::from_static(b"design"),
            ))
            .await
        );

        assert_eq!(model.name, "model.rvt");
        assert_eq!(store.upload_calls(), 1);

        let jobs = translator.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].urn, model.urn);
        assert!(!jobs[0].is_compressed());
    }

    #[tokio::test]
    async fn test_zip_without_entry_point_is_accepted() {
        let translator = Arc::new(MockTranslationService::new());
        let svc = service(Arc::new(MockObjectStore::new()), translator.clone());

        let model = svc
            .upload_model(
                UploadModelRequest::new("project.zip", Bytes::from_static(b"PK"))
                    .with_entry_point(Some("  ".to_string())),
            )
            .await
            .unwrap();

        assert_eq!(model.name, "project.zip");
        assert_eq!(translator.jobs()[0].root_filename, None);
    }

    #[tokio::test]
    async fn test_zip_entry_point_is_forwarded() {
        let translator = Arc::new(MockTranslationService::new());
        let svc = service(Arc::new(MockObjectStore::new()), translator.clone());

        svc.upload_model(
            UploadModelRequest::new("project.zip", Bytes::from_static(b"PK"))
                .with_entry_point(Some("main.rvt".to_string())),
        )
        .await
        .unwrap();

        let job = &translator.jobs()[0];
        assert_eq!(job.root_filename.as_deref(), Some("main.rvt"));
        assert!(job.is_compressed());
    }

    #[tokio::test]
    async fn test_translation_failure_fails_upload() {
        let svc = service(
            Arc::new(MockObjectStore::new()),
            Arc::new(MockTranslationService::new().failing_start()),
        );

        let err = svc
            .upload_model(UploadModelRequest::new("model.rvt", Bytes::from_static(b"x")))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_upload_sanitizes_object_key() {
        let svc = service(
            Arc::new(MockObjectStore::new()),
            Arc::new(MockTranslationService::new()),
        );

        let model = svc
            .upload_model(UploadModelRequest::new("my tower.ifc", Bytes::from_static(b"x")))
            .await
            .unwrap();
        assert_eq!(model.name, "my_tower.ifc");
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_translation_uses_policy() {
        let svc = service(
            Arc::new(MockObjectStore::new()),
            Arc::new(
                MockTranslationService::new()
                    .with_manifest(Some(Manifest::new(ManifestStatus::Pending))),
            ),
        )
        .with_poll_policy(PollPolicy::new(Duration::from_millis(10), 3));

        let err = svc.wait_for_translation("dXJu").await.unwrap_err();
        assert!(matches!(err, DomainError::Timeout { attempts: 3, .. }));
    }
}
