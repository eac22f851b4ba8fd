//! Model reference entity and URN helpers

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters allowed in an OSS object key; everything else becomes `_`
static OBJECT_KEY_DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9._-]").expect("object key pattern is a valid regex")
});

/// A translated (or translating) design addressable by the viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRef {
    /// Display name, the OSS object key
    pub name: String,
    /// Base64 (URL-safe, unpadded) encoded OSS object id
    pub urn: String,
}

impl ModelRef {
    pub fn new(name: impl Into<String>, urn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            urn: urn.into(),
        }
    }

    /// Build a reference from an OSS object key and object id
    pub fn from_object(object_key: impl Into<String>, object_id: &str) -> Self {
        Self::new(object_key, urnify(object_id))
    }
}

/// Encode an OSS object id into the URN format the derivative service expects
pub fn urnify(object_id: &str) -> String {
    URL_SAFE_NO_PAD.encode(object_id.as_bytes())
}

/// Decode a URN back into an OSS object id, accepting padded and unpadded input
pub fn deurnify(urn: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(urn.trim_end_matches('='))
        .or_else(|_| URL_SAFE.decode(urn))
        .ok()?;

    String::from_utf8(bytes).ok()
}

/// Derive the OSS object key for an uploaded file name
pub fn object_key_for(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    OBJECT_KEY_DISALLOWED.replace_all(base, "_").into_owned()
}

/// Object id the OSS service assigns to `key` inside `bucket`
pub fn object_id_for(bucket: &str, key: &str) -> String {
    format!("urn:adsk.objects:os.object:{}/{}", bucket, key)
}
