// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Attachment file storage.
//!
//! Uploaded files land under `<upload_dir>/<entity>/<slot>/` with a
//! generated filename; the original name survives only inside the stored
//! [`FileMetadata`]. Nothing from the client ever becomes a path
//! component directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use comreg_domain::{EntityKind, FileMetadata};
use std::path::{Path, PathBuf};
use tracing::info;

/// Maximum accepted upload size in bytes (10 MB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// MIME types accepted for attachment uploads.
const ALLOWED_MIME_TYPES: [&str; 3] = ["application/pdf", "image/jpeg", "image/png"];

/// Errors raised while storing or serving attachment files.
#[derive(Debug)]
pub enum UploadError {
    /// The upload exceeds [`MAX_UPLOAD_BYTES`].
    TooLarge,
    /// The MIME type is not in the allow-list.
    UnsupportedType(String),
    /// The requested stored filename is invalid.
    InvalidFilename,
    /// Filesystem I/O failed.
    Io(String),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        match self {
            Self::TooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("File exceeds the {MAX_UPLOAD_BYTES} byte upload limit"),
            )
                .into_response(),
            Self::UnsupportedType(mimetype) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("Unsupported file type: {mimetype}"),
            )
                .into_response(),
            Self::InvalidFilename => {
                (StatusCode::BAD_REQUEST, "Invalid filename").into_response()
            }
            Self::Io(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("File storage error: {message}"),
            )
                .into_response(),
        }
    }
}

/// Generates a collision-resistant stored filename.
///
/// The extension is taken from the original name; the stem is random so
/// uploads never overwrite each other.
fn generate_stored_filename(original: &str) -> String {
    let bytes: [u8; 16] = rand::random();
    let mut stem: String = String::with_capacity(32);
    for byte in bytes {
        stem.push_str(&format!("{byte:02x}"));
    }

    match Path::new(original).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.chars().all(char::is_alphanumeric) => format!("{stem}.{ext}"),
        _ => stem,
    }
}

/// Validates and stores an uploaded file, returning its metadata.
///
/// # Arguments
///
/// * `upload_dir` - The storage root
/// * `entity` - The entity kind the record belongs to
/// * `slot` - The attachment slot name
/// * `original_filename` - The client-supplied filename
/// * `mimetype` - The client-supplied MIME type
/// * `data` - The file contents
///
/// # Errors
///
/// Returns an error if the file is too large, its type is not allowed,
/// or writing to disk fails.
pub async fn store_attachment(
    upload_dir: &Path,
    entity: EntityKind,
    slot: &str,
    original_filename: &str,
    mimetype: &str,
    data: &[u8],
) -> Result<FileMetadata, UploadError> {
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge);
    }
    if !ALLOWED_MIME_TYPES.contains(&mimetype) {
        return Err(UploadError::UnsupportedType(mimetype.to_string()));
    }

    let stored_filename: String = generate_stored_filename(original_filename);
    let relative_path: String = format!("{}/{slot}/{stored_filename}", entity.as_str());

    let slot_dir: PathBuf = upload_dir.join(entity.as_str()).join(slot);
    tokio::fs::create_dir_all(&slot_dir)
        .await
        .map_err(|e| UploadError::Io(e.to_string()))?;
    tokio::fs::write(slot_dir.join(&stored_filename), data)
        .await
        .map_err(|e| UploadError::Io(e.to_string()))?;

    info!(
        entity = entity.as_str(),
        slot,
        filename = %stored_filename,
        size = data.len(),
        "Stored attachment file"
    );

    #[allow(clippy::cast_possible_wrap)]
    Ok(FileMetadata::new(
        stored_filename,
        relative_path,
        mimetype.to_string(),
        data.len() as i64,
    ))
}

/// Reads a stored attachment back.
///
/// The filename must be a bare generated name; anything that could
/// escape the slot directory is rejected.
///
/// # Arguments
///
/// * `upload_dir` - The storage root
/// * `entity` - The entity kind
/// * `slot` - The attachment slot name
/// * `filename` - The stored filename
///
/// # Errors
///
/// Returns an error if the filename is invalid or the file cannot be
/// read.
pub async fn read_attachment(
    upload_dir: &Path,
    entity: EntityKind,
    slot: &str,
    filename: &str,
) -> Result<Vec<u8>, UploadError> {
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(UploadError::InvalidFilename);
    }
    if slot.contains('/') || slot.contains('\\') || slot.contains("..") {
        return Err(UploadError::InvalidFilename);
    }

    let path: PathBuf = upload_dir.join(entity.as_str()).join(slot).join(filename);
    tokio::fs::read(&path)
        .await
        .map_err(|e| UploadError::Io(e.to_string()))
}
