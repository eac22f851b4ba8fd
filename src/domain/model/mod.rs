//! Model domain - design references and upload rules

mod entity;
mod validation;

pub use entity::{ModelRef, deurnify, object_id_for, object_key_for, urnify};
pub use validation::{
    ALLOWED_EXTENSIONS, MAX_UPLOAD_SIZE, UploadValidationError, file_extension, format_file_size,
    is_archive, normalize_entry_point, validate_extension, validate_size, validate_upload,
    validate_urn,
};
