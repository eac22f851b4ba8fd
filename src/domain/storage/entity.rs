use serde::{Deserialize, Serialize};

use crate::domain::model::ModelRef;

/// Object held in a storage bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub bucket_key: String,
    pub object_key: String,
    pub object_id: String,
    #[serde(default)]
    pub size: u64,
}

impl StoredObject {
    pub fn new(
        bucket_key: impl Into<String>,
        object_key: impl Into<String>,
        object_id: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            bucket_key: bucket_key.into(),
            object_key: object_key.into(),
            object_id: object_id.into(),
            size,
        }
    }

    /// Model reference addressing this object in the derivative service
    pub fn to_model_ref(&self) -> ModelRef {
        ModelRef::from_object(self.object_key.clone(), &self.object_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::urnify;

    #[test]
    fn test_deserialize_oss_object() {
        let object: StoredObject = serde_json::from_value(serde_json::json!({
            "bucketKey": "my-bucket",
            "objectKey": "model.rvt",
            "objectId": "urn:adsk.objects:os.object:my-bucket/model.rvt",
            "sha1": "abc",
            "size": 1024,
            "location": "https://example.com"
        }))
        .unwrap();

        assert_eq!(object.bucket_key, "my-bucket");
        assert_eq!(object.size, 1024);
    }

    #[test]
    fn test_to_model_ref() {
        let object = StoredObject::new(
            "b",
            "model.rvt",
            "urn:adsk.objects:os.object:b/model.rvt",
            10,
        );
        let model = object.to_model_ref();
        assert_eq!(model.name, "model.rvt");
        assert_eq!(model.urn, urnify("urn:adsk.objects:os.object:b/model.rvt"));
    }
}
