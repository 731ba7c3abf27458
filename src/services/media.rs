// src/services/media.rs - upload checks for trip images
use std::io::Cursor;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};

use crate::errors::ValidationErrors;

pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "tif", "tiff"];
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;
pub const MAX_PIXEL_DIMENSION: u32 = 4096;

pub const TITLE_MIN_LEN: usize = 2;
pub const TITLE_MAX_LEN: usize = 50;
pub const DESCRIPTION_MIN_LEN: usize = 2;
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Decode the base64 payload, stripping a `data:image/...;base64,` prefix
/// when the client sends one.
pub fn decode_image_data(image_data: &str) -> Result<Vec<u8>, String> {
    let base64_data = match image_data.split_once(',') {
        Some((_, rest)) => rest,
        None => image_data,
    };

    general_purpose::STANDARD
        .decode(base64_data.trim())
        .map_err(|e| format!("invalid base64 image data: {}", e))
}

pub fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Run every check on the uploaded file and collect the failures.
/// Pixel dimensions are only inspected once the size ceiling passed.
pub fn validate_image_file(file_name: &str, bytes: &[u8], errors: &mut ValidationErrors) {
    match file_extension(file_name) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => errors.add(
            "image",
            format!(
                "file extension must be one of: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ),
        ),
    }

    if bytes.len() > MAX_UPLOAD_BYTES {
        errors.add(
            "image",
            format!("file is larger than {} bytes", MAX_UPLOAD_BYTES),
        );
        return;
    }

    match image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()
        .and_then(|reader| reader.into_dimensions().ok())
    {
        Some((width, height)) => {
            if width > MAX_PIXEL_DIMENSION || height > MAX_PIXEL_DIMENSION {
                errors.add(
                    "image",
                    format!(
                        "image dimensions must not exceed {}x{} pixels",
                        MAX_PIXEL_DIMENSION, MAX_PIXEL_DIMENSION
                    ),
                );
            }
        }
        None => errors.add("image", "file is not a readable image"),
    }
}

pub fn validate_image_fields(title: &str, description: &str, errors: &mut ValidationErrors) {
    let title_len = title.trim().chars().count();
    if title_len < TITLE_MIN_LEN || title_len > TITLE_MAX_LEN {
        errors.add(
            "title",
            format!(
                "must be between {} and {} characters long",
                TITLE_MIN_LEN, TITLE_MAX_LEN
            ),
        );
    }

    let description_len = description.trim().chars().count();
    if description_len < DESCRIPTION_MIN_LEN || description_len > DESCRIPTION_MAX_LEN {
        errors.add(
            "description",
            format!(
                "must be between {} and {} characters long",
                DESCRIPTION_MIN_LEN, DESCRIPTION_MAX_LEN
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use image::{ImageFormat, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::new(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_plain_and_data_url_base64() {
        let bytes = png_bytes(1, 1);
        let encoded = general_purpose::STANDARD.encode(&bytes);

        assert_eq!(decode_image_data(&encoded).unwrap(), bytes);
        let with_prefix = format!("data:image/png;base64,{}", encoded);
        assert_eq!(decode_image_data(&with_prefix).unwrap(), bytes);
        assert!(decode_image_data("!!not base64!!").is_err());
    }

    #[test]
    fn accepts_a_small_png() {
        let mut errors = ValidationErrors::new();
        validate_image_file("photo.png", &png_bytes(16, 16), &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn rejects_disallowed_extension() {
        let mut errors = ValidationErrors::new();
        validate_image_file("photo.bmp", &png_bytes(1, 1), &mut errors);
        assert!(errors.field("image").is_some());
    }

    // storage naming relies on validated uploads always having an extension
    #[test]
    fn rejects_file_name_without_extension() {
        let mut errors = ValidationErrors::new();
        validate_image_file("photo", &png_bytes(1, 1), &mut errors);
        assert!(errors.field("image").is_some());
        assert_eq!(file_extension("photo"), None);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let mut errors = ValidationErrors::new();
        validate_image_file("photo.JPEG", &png_bytes(1, 1), &mut errors);
        // PNG bytes in a .jpeg file still decode; only the name is checked here
        assert!(errors.is_empty());
    }

    #[test]
    fn rejects_files_over_size_ceiling() {
        let mut errors = ValidationErrors::new();
        let blob = vec![0u8; MAX_UPLOAD_BYTES + 1];
        validate_image_file("photo.jpg", &blob, &mut errors);
        assert!(errors.field("image").is_some());
    }

    #[test]
    fn rejects_oversized_pixel_dimensions() {
        let mut errors = ValidationErrors::new();
        validate_image_file("wide.png", &png_bytes(MAX_PIXEL_DIMENSION + 1, 1), &mut errors);
        assert!(errors.field("image").is_some());
    }

    #[test]
    fn rejects_unreadable_bytes() {
        let mut errors = ValidationErrors::new();
        validate_image_file("photo.png", b"definitely not an image", &mut errors);
        assert!(errors.field("image").is_some());
    }

    #[test]
    fn collects_title_and_description_errors_together() {
        let mut errors = ValidationErrors::new();
        validate_image_fields("x", "", &mut errors);
        assert!(errors.field("title").is_some());
        assert!(errors.field("description").is_some());
    }
}
