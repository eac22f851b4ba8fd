use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;

use super::StoredObject;
use crate::domain::DomainError;

/// Bucket/object storage operations used by the upload workflow
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Create the configured bucket; an existing bucket counts as success
    async fn ensure_bucket(&self) -> Result<(), DomainError>;

    /// List every object in the configured bucket
    async fn list_objects(&self) -> Result<Vec<StoredObject>, DomainError>;

    /// Upload `content` under `object_key`
    async fn upload_object(
        &self,
        object_key: &str,
        content: Bytes,
    ) -> Result<StoredObject, DomainError>;

    /// Name of the bucket objects are stored in
    fn bucket_key(&self) -> &str;
}
