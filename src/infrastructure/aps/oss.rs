//! Object Storage Service client

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info};

use super::http_client::{ApsHttpClient, is_conflict, is_not_found, parse_json, status_error};
use crate::domain::{DomainError, ObjectStore, StoredObject, TokenProvider};

const SERVICE: &str = "oss";
const PAGE_SIZE: u32 = 64;

#[derive(Debug, Deserialize)]
struct ObjectPage {
    #[serde(default)]
    items: Vec<StoredObject>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignedUpload {
    upload_key: String,
    urls: Vec<String>,
}

/// Bucket/object operations against a single configured bucket
#[derive(Debug, Clone)]
pub struct OssClient {
    http: ApsHttpClient,
    tokens: Arc<dyn TokenProvider>,
    bucket_key: String,
    region: String,
}

impl OssClient {
    pub fn new(
        http: ApsHttpClient,
        tokens: Arc<dyn TokenProvider>,
        bucket_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            bucket_key: bucket_key.into(),
            region: "US".to_string(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    async fn bearer(&self) -> Result<String, DomainError> {
        self.tokens
            .internal_token()
            .await
            .map(|t| t.access_token().to_string())
            .map_err(|e| DomainError::upstream("auth", e.to_string()))
    }

    fn objects_path(&self) -> String {
        format!("/oss/v2/buckets/{}/objects", self.bucket_key)
    }

    fn signed_upload_path(&self, object_key: &str) -> String {
        format!("{}/{}/signeds3upload", self.objects_path(), object_key)
    }

    async fn list_page(
        &self,
        token: &str,
        start_at: Option<&str>,
    ) -> Result<Option<ObjectPage>, DomainError> {
        let mut query = vec![("limit", PAGE_SIZE.to_string())];

        if let Some(start_at) = start_at {
            query.push(("startAt", start_at.to_string()));
        }

        let request = self
            .http
            .client()
            .get(self.http.url(&self.objects_path()))
            .bearer_auth(token)
            .query(&query);

        let response = self.http.send(request, SERVICE).await?;

        if is_not_found(response.status()) {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(status_error(response, SERVICE).await);
        }

        parse_json(response, SERVICE).await.map(Some)
    }
}

/// Extract the `startAt` cursor from the `next` link of an object page
fn next_cursor(next: &str) -> Option<String> {
    let url = reqwest::Url::parse(next).ok()?;

    url.query_pairs()
        .find(|(key, _)| key == "startAt")
        .map(|(_, value)| value.into_owned())
}

#[async_trait]
impl ObjectStore for OssClient {
    async fn ensure_bucket(&self) -> Result<(), DomainError> {
        let token = self.bearer().await?;

        let request = self
            .http
            .client()
            .post(self.http.url("/oss/v2/buckets"))
            .bearer_auth(&token)
            .header("x-ads-region", &self.region)
            .json(&serde_json::json!({
                "bucketKey": self.bucket_key,
                "policyKey": "persistent",
            }));

        let response = self.http.send(request, SERVICE).await?;
        let status = response.status();

        if status.is_success() {
            info!(bucket = %self.bucket_key, "Created bucket");
            return Ok(());
        }

        if is_conflict(status) {
            debug!(bucket = %self.bucket_key, "Bucket already exists");
            return Ok(());
        }

        Err(status_error(response, SERVICE).await)
    }

    async fn list_objects(&self) -> Result<Vec<StoredObject>, DomainError> {
        let token = self.bearer().await?;
        let mut objects = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let Some(page) = self.list_page(&token, cursor.as_deref()).await? else {
                debug!(bucket = %self.bucket_key, "Bucket does not exist yet");
                break;
            };

            objects.extend(page.items);

            match page.next.as_deref().and_then(next_cursor) {
                Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(objects)
    }

    async fn upload_object(
        &self,
        object_key: &str,
        content: Bytes,
    ) -> Result<StoredObject, DomainError> {
        let token = self.bearer().await?;
        let size = content.len();
        let path = self.signed_upload_path(object_key);

        let signed: SignedUpload = self
            .http
            .send_json(
                self.http
                    .client()
                    .get(self.http.url(&path))
                    .bearer_auth(&token),
                SERVICE,
            )
            .await?;

        let upload_url = signed.urls.first().ok_or_else(|| {
            DomainError::upstream(SERVICE, "Signed upload response contained no URL")
        })?;

        debug!(object_key = %object_key, size, "Uploading object content");

        self.http
            .send_checked(
                self.http
                    .client()
                    .put(upload_url)
                    .header("Content-Type", "application/octet-stream")
                    .body(content),
                "s3",
            )
            .await?;

        let object: StoredObject = self
            .http
            .send_json(
                self.http
                    .client()
                    .post(self.http.url(&path))
                    .bearer_auth(&token)
                    .json(&serde_json::json!({ "uploadKey": signed.upload_key })),
                SERVICE,
            )
            .await?;

        info!(
            bucket = %object.bucket_key,
            object_key = %object.object_key,
            object_id = %object.object_id,
            size = object.size,
            "Uploaded object"
        );

        Ok(object)
    }

    fn bucket_key(&self) -> &str {
        &self.bucket_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::mock::MockTokenProvider;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, tokens: MockTokenProvider) -> OssClient {
        OssClient::new(ApsHttpClient::new(server.uri()), Arc::new(tokens), "test-bucket")
    }

    fn object_json(key: &str) -> serde_json::Value {
        serde_json::json!({
            "bucketKey": "test-bucket",
            "objectKey": key,
            "objectId": format!("urn:adsk.objects:os.object:test-bucket/{}", key),
            "size": 4
        })
    }

    #[test]
    fn test_next_cursor() {
        assert_eq!(
            next_cursor("https://developer.api.autodesk.com/oss/v2/buckets/b/objects?startAt=abc%2Fdef&limit=64")
                .as_deref(),
            Some("abc/def")
        );
        assert_eq!(next_cursor("https://example.com/objects?limit=64"), None);
        assert_eq!(next_cursor("not a url"), None);
    }

    #[tokio::test]
    async fn test_ensure_bucket_treats_conflict_as_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oss/v2/buckets"))
            .and(header("authorization", "Bearer tok-internal"))
            .and(header("x-ads-region", "US"))
            .and(body_json(serde_json::json!({
                "bucketKey": "test-bucket",
                "policyKey": "persistent"
            })))
            .respond_with(ResponseTemplate::new(409).set_body_string("Bucket already exists"))
            .expect(1)
            .mount(&server)
            .await;

        client(&server, MockTokenProvider::new("tok"))
            .ensure_bucket()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ensure_bucket_fails_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oss/v2/buckets"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server, MockTokenProvider::new("tok"))
            .ensure_bucket()
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_list_objects_follows_pagination() {
        let server = MockServer::start().await;
        let next = format!(
            "{}/oss/v2/buckets/test-bucket/objects?startAt=b.rvt&limit=64",
            server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/oss/v2/buckets/test-bucket/objects"))
            .and(query_param("startAt", "b.rvt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [object_json("c.ifc")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/oss/v2/buckets/test-bucket/objects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [object_json("a.rvt"), object_json("b.rvt")],
                "next": next
            })))
            .expect(1)
            .mount(&server)
            .await;

        let objects = client(&server, MockTokenProvider::new("tok"))
            .list_objects()
            .await
            .unwrap();

        let keys: Vec<&str> = objects.iter().map(|o| o.object_key.as_str()).collect();
        assert_eq!(keys, vec!["a.rvt", "b.rvt", "c.ifc"]);
    }

    #[tokio::test]
    async fn test_list_objects_of_missing_bucket_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oss/v2/buckets/test-bucket/objects"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let objects = client(&server, MockTokenProvider::new("tok"))
            .list_objects()
            .await
            .unwrap();
        assert!(objects.is_empty());
    }

    #[tokio::test]
    async fn test_token_failure_is_reported_as_upstream() {
        let server = MockServer::start().await;
        let err = client(&server, MockTokenProvider::failing())
            .list_objects()
            .await
            .unwrap_err();

        match err {
            DomainError::Upstream { service, .. } => assert_eq!(service, "auth"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_uses_signed_url_flow() {
        let server = MockServer::start().await;
        let signed_path = "/oss/v2/buckets/test-bucket/objects/model.rvt/signeds3upload";
        let s3_url = format!("{}/s3/upload-target", server.uri());

        Mock::given(method("GET"))
            .and(path(signed_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "uploadKey": "upload-123",
                "urls": [s3_url]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/s3/upload-target"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(signed_path))
            .and(body_json(serde_json::json!({"uploadKey": "upload-123"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(object_json("model.rvt")))
            .expect(1)
            .mount(&server)
            .await;

        let object = client(&server, MockTokenProvider::new("tok"))
            .upload_object("model.rvt", Bytes::from_static(b"data"))
            .await
            .unwrap();

        assert_eq!(object.object_key, "model.rvt");
        assert_eq!(
            object.object_id,
            "urn:adsk.objects:os.object:test-bucket/model.rvt"
        );
    }

    #[tokio::test]
    async fn test_upload_fails_when_storage_rejects_content() {
        let server = MockServer::start().await;
        let signed_path = "/oss/v2/buckets/test-bucket/objects/model.rvt/signeds3upload";

        Mock::given(method("GET"))
            .and(path(signed_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "uploadKey": "upload-123",
                "urls": [format!("{}/s3/upload-target", server.uri())]
            })))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/s3/upload-target"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(signed_path))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server, MockTokenProvider::new("tok"))
            .upload_object("model.rvt", Bytes::from_static(b"data"))
            .await
            .unwrap_err();

        match err {
            DomainError::Upstream { service, .. } => assert_eq!(service, "s3"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
