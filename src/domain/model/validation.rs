//! Upload and URN validation utilities

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::DomainError;

const MIB: u64 = 1024 * 1024;

/// URL-safe base64, optionally padded
static URN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+=*$").expect("urn pattern is a valid regex"));

/// Largest design file accepted for upload (100 MB)
pub const MAX_UPLOAD_SIZE: u64 = 100 * MIB;

/// File extensions the derivative service is asked to translate
pub const ALLOWED_EXTENSIONS: [&str; 10] = [
    "rvt", "dwg", "ifc", "nwd", "3ds", "fbx", "obj", "step", "iges", "zip",
];

/// Upload validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum UploadValidationError {
    /// The multipart form carried no `model-file` field
    MissingFile,
    /// Extension outside the allow-list
    UnsupportedExtension { extension: String },
    /// Payload larger than the ceiling
    TooLarge { size: u64, max: u64 },
    /// The entry point given for an archive is blank
    EmptyEntryPoint,
}

impl fmt::Display for UploadValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFile => write!(f, "The required field \"model-file\" is missing."),
            Self::UnsupportedExtension { extension } => write!(
                f,
                "Unsupported file type: {}. Allowed types: {}",
                extension,
                allowed_extensions_display()
            ),
            Self::TooLarge { max, .. } => {
                write!(f, "File size exceeds {} limit.", size_limit_display(*max))
            }
            Self::EmptyEntryPoint => {
                write!(f, "The archive entry point must not be empty.")
            }
        }
    }
}

impl std::error::Error for UploadValidationError {}

impl From<UploadValidationError> for DomainError {
    fn from(err: UploadValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}

/// Lowercased extension of `file_name` including the leading dot, or empty
pub fn file_extension(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) => file_name[idx..].to_lowercase(),
        None => String::new(),
    }
}

/// Whether `file_name` names a zip archive
pub fn is_archive(file_name: &str) -> bool {
    file_extension(file_name) == ".zip"
}

/// Validate the extension of an uploaded file against the allow-list
pub fn validate_extension(file_name: &str) -> Result<(), UploadValidationError> {
    let extension = file_extension(file_name);
    let bare = extension.trim_start_matches('.');

    if bare.is_empty() || !ALLOWED_EXTENSIONS.contains(&bare) {
        return Err(UploadValidationError::UnsupportedExtension { extension });
    }

    Ok(())
}

/// Validate the size of an uploaded file against `max`
pub fn validate_size(size: u64, max: u64) -> Result<(), UploadValidationError> {
    if size > max {
        return Err(UploadValidationError::TooLarge { size, max });
    }

    Ok(())
}

/// Validate an upload before anything is sent to the object store
pub fn validate_upload(file_name: &str, size: u64, max: u64) -> Result<(), UploadValidationError> {
    validate_extension(file_name)?;
    validate_size(size, max)
}

/// Normalize an optional archive entry point; blank values count as absent
pub fn normalize_entry_point(entry_point: Option<&str>) -> Option<String> {
    entry_point
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Trimmed, URL-safe URN from a request path, or a validation error
pub fn validate_urn(urn: &str) -> Result<&str, DomainError> {
    let urn = urn.trim();

    if !URN_PATTERN.is_match(urn) {
        return Err(DomainError::validation("Invalid URN parameter"));
    }

    Ok(urn)
}

/// Human readable size, e.g. `1.5 MB`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    let rounded = (size * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

fn size_limit_display(max: u64) -> String {
    if max >= MIB && max % MIB == 0 {
        format!("{}MB", max / MIB)
    } else {
        format_file_size(max)
    }
}

fn allowed_extensions_display() -> String {
    ALLOWED_EXTENSIONS
        .iter()
        .map(|e| format!(".{}", e))
        .collect::<Vec<_>>()
        .join(", ")
}
