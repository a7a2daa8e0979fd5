//! Image Upload Handler
//!
//! Handles image uploads from catalog management flows.
//! Supports multiple image formats (PNG, JPEG, WebP) and converts to JPG.

use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, ok_with_message};

/// Maximum file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// JPEG quality for dish images
const JPEG_QUALITY: u8 = 85;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub original_name: String,
    pub size: usize,
    pub format: String,
    pub url: String,
}

/// A stored image: filename on disk + public URL
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub filename: String,
    pub url: String,
}

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Find existing file by content hash
fn find_file_by_hash(images_dir: &Path, hash: &str) -> Option<String> {
    let hash_dir = images_dir.join("by_hash");
    if !hash_dir.exists() {
        return None;
    }

    // Hash directory uses first 2 chars as subdir (e.g., "ab/abc123...")
    let prefix = &hash[..2];
    let hash_path = hash_dir.join(format!("{}/{}", prefix, hash));

    if hash_path.exists()
        && let Ok(target) = fs::read_link(&hash_path)
    {
        return target.file_name().map(|s| s.to_string_lossy().to_string());
    }
    None
}

/// Create hash-based symlink for deduplication
fn create_hash_symlink(images_dir: &Path, hash: &str, filename: &str) -> Result<(), AppError> {
    let prefix = &hash[..2];
    let hash_subdir = images_dir.join("by_hash").join(prefix);
    fs::create_dir_all(&hash_subdir)
        .map_err(|e| AppError::internal(format!("Failed to create hash dir: {}", e)))?;

    let hash_path = hash_subdir.join(hash);
    let target_path = PathBuf::from("../../").join(filename);

    symlink::symlink_auto(&target_path, &hash_path)
        .map_err(|e| AppError::internal(format!("Failed to create symlink: {}", e)))?;

    Ok(())
}

/// Validate and re-encode an image as JPEG
fn compress_image(data: &[u8], ext: &str) -> Result<Vec<u8>, AppError> {
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "File too large. Maximum size is {}MB",
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let ext_lower = ext.to_lowercase();
    if !SUPPORTED_FORMATS.contains(&ext_lower.as_str()) {
        return Err(AppError::validation(format!(
            "Unsupported file format '{}'. Supported: {}",
            ext_lower,
            SUPPORTED_FORMATS.join(", ")
        )));
    }

    let img = image::load_from_memory(data)
        .map_err(|e| AppError::validation(format!("Invalid image file ({}): {}", ext_lower, e)))?;

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| AppError::internal(format!("Failed to compress image: {}", e)))?;
    }

    Ok(buffer)
}

/// Store image bytes in the local image store, deduplicating by content hash.
///
/// Shared by the upload endpoint and the catalog handlers that accept an
/// image as part of their multipart payload.
pub(crate) fn store_image(
    state: &ServerState,
    data: &[u8],
    original_name: &str,
) -> Result<StoredImage, AppError> {
    if data.is_empty() {
        return Err(AppError::validation("Empty file provided".to_string()));
    }

    let ext = PathBuf::from(original_name)
        .extension()
        .and_then(|ext| ext.to_str().map(|s| s.to_string()))
        .ok_or_else(|| {
            AppError::validation(format!("Invalid file extension for: {}", original_name))
        })?;

    let images_dir = state.config.images_dir();
    fs::create_dir_all(&images_dir)
        .map_err(|e| AppError::internal(format!("Failed to create images directory: {}", e)))?;

    let compressed = compress_image(data, &ext)?;
    let file_hash = calculate_hash(&compressed);

    // Duplicate content: reuse the existing file
    if let Some(existing) = find_file_by_hash(&images_dir, &file_hash) {
        tracing::info!(
            original_name = %original_name,
            existing_file = %existing,
            "Duplicate image detected, returning existing file"
        );
        return Ok(StoredImage {
            url: format!("/api/image/{}", existing),
            filename: existing,
        });
    }

    let filename = format!("{}.jpg", Uuid::new_v4());
    let file_path = images_dir.join(&filename);
    fs::write(&file_path, &compressed)
        .map_err(|e| AppError::internal(format!("Failed to save file: {}", e)))?;

    create_hash_symlink(&images_dir, &file_hash, &filename)?;

    tracing::info!(
        original_name = %original_name,
        size = compressed.len(),
        hash = %file_hash,
        "Image uploaded"
    );

    Ok(StoredImage {
        url: format!("/api/image/{}", filename),
        filename,
    })
}

/// POST /api/image/upload - upload an image on its own
pub async fn upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Json<AppResponse<UploadResponse>>, AppError> {
    let mut field_data: Option<Vec<u8>> = None;
    let mut original_filename = None;

    while let Some(f) = multipart.next_field().await? {
        let name = f.name().map(|s| s.to_string());
        if name.as_deref() == Some("file") || name.as_deref() == Some("image") {
            original_filename = f.file_name().map(|s| s.to_string());
            field_data = Some(f.bytes().await?.to_vec());
            break;
        }
    }

    let data = field_data.ok_or_else(|| {
        AppError::validation("No 'file' field found. Field name must be 'file'".to_string())
    })?;
    let original_name = original_filename
        .ok_or_else(|| AppError::validation("No filename provided in file field".to_string()))?;

    let stored = store_image(&state, &data, &original_name)?;

    let file_id = stored
        .filename
        .strip_suffix(".jpg")
        .unwrap_or(&stored.filename)
        .to_string();
    let size = data.len();

    Ok(ok_with_message(
        UploadResponse {
            file_id,
            filename: stored.filename.clone(),
            original_name,
            size,
            format: "jpg".to_string(),
            url: stored.url,
        },
        "Image uploaded successfully",
    ))
}
