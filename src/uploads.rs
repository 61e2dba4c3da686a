//! Shared upload handling: multipart collection, size/type validation and
//! storage key generation. Every file-accepting handler goes through here
//! before any database write happens.

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;
use uuid::Uuid;

use crate::error::ApiError;

/// Image uploads (screenshots, profile photos).
pub const ALLOWED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Document uploads. Office files are matched by their container signatures:
/// `application/msword` covers OLE compound files (.doc/.xls) and
/// `application/zip` covers OOXML containers (.docx/.xlsx).
pub const ALLOWED_DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/zip",
    "image/png",
    "image/jpeg",
];

/// CV uploads: PDF and Word only.
pub const ALLOWED_CV_TYPES: &[&str] =
    &["application/pdf", "application/msword", "application/zip"];

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub bytes: Bytes,
}

/// A fully read multipart request: text fields plus file fields, keyed by
/// field name. Reading everything up front keeps handler validation order
/// independent of field order on the wire.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if field.file_name().is_some() {
                let filename = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
                form.files.insert(name, UploadedFile { filename, bytes });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid form field: {e}")))?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }

    /// Trimmed text field, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Uploaded file for a field, `None` when absent or empty.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name).filter(|f| !f.bytes.is_empty())
    }
}

/// Sniff the MIME type from file contents. Extension is deliberately ignored;
/// only magic bytes count.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.starts_with(b"%PDF-") {
        Some("application/pdf")
    } else if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]) {
        // OLE compound file: legacy .doc/.xls
        Some("application/msword")
    } else if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
        // zip container: .docx/.xlsx
        Some("application/zip")
    } else {
        None
    }
}

/// Validate an upload against a size ceiling and a MIME allow-list.
/// Returns the sniffed MIME type; errors are client-facing messages meant to
/// be pushed onto a handler's validation error list.
pub fn validate_upload(
    file: &UploadedFile,
    allowed: &[&str],
    max_size: u64,
) -> Result<&'static str, String> {
    if file.bytes.is_empty() {
        return Err("No file was uploaded.".to_string());
    }
    if file.bytes.len() as u64 > max_size {
        return Err(format!(
            "File size exceeds maximum allowed size ({} MB).",
            max_size / (1024 * 1024)
        ));
    }
    let mime = sniff_mime(&file.bytes)
        .ok_or_else(|| "Could not determine file type from its contents.".to_string())?;
    if !allowed.contains(&mime) {
        return Err(format!(
            "File type not allowed. Allowed types: {}.",
            allowed.join(", ")
        ));
    }
    Ok(mime)
}

/// Lowercased alphanumeric extension of a filename, if any.
pub fn file_extension(name: &str) -> Option<String> {
    let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}

/// Collision-resistant storage key preserving the original extension:
/// `{dir}/{prefix}-{uuid}.{ext}`.
pub fn storage_key(dir: &str, prefix: &str, original_name: Option<&str>) -> String {
    let ext = original_name
        .and_then(file_extension)
        .unwrap_or_else(|| "bin".to_string());
    format!("{dir}/{prefix}-{}.{ext}", Uuid::new_v4())
}

/// Human readable file size, matching the showcase display format.
pub fn format_file_size(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.2} KB", b / KB)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(bytes: &'static [u8]) -> UploadedFile {
        UploadedFile {
            filename: Some("upload.bin".to_string()),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn sniffs_common_types() {
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(
            sniff_mime(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1]),
            Some("image/png")
        );
        assert_eq!(sniff_mime(b"GIF89a......"), Some("image/gif"));
        assert_eq!(sniff_mime(b"RIFF\x00\x00\x00\x00WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_mime(b"%PDF-1.7 rest"), Some("application/pdf"));
        assert_eq!(sniff_mime(&[0x50, 0x4B, 0x03, 0x04, 0]), Some("application/zip"));
        assert_eq!(sniff_mime(b"#!/bin/sh"), None);
        assert_eq!(sniff_mime(&[]), None);
    }

    #[test]
    fn extension_does_not_fool_the_sniffer() {
        // An executable renamed to .png still fails the image allow-list.
        let f = UploadedFile {
            filename: Some("evil.png".to_string()),
            bytes: Bytes::from_static(b"\x7fELF...."),
        };
        assert!(validate_upload(&f, ALLOWED_IMAGE_TYPES, 1024).is_err());
    }

    #[test]
    fn rejects_oversized_files() {
        let f = UploadedFile {
            filename: None,
            bytes: Bytes::from(vec![0xFF; 2048]),
        };
        let err = validate_upload(&f, ALLOWED_IMAGE_TYPES, 1024).unwrap_err();
        assert!(err.contains("exceeds maximum allowed size"));
    }

    #[test]
    fn rejects_disallowed_type_with_distinct_message() {
        let err = validate_upload(&file(b"%PDF-1.4"), ALLOWED_IMAGE_TYPES, 1024).unwrap_err();
        assert!(err.contains("File type not allowed"));
    }

    #[test]
    fn accepts_valid_image() {
        let mime = validate_upload(&file(&[0xFF, 0xD8, 0xFF, 0xE1]), ALLOWED_IMAGE_TYPES, 1024)
            .expect("jpeg passes");
        assert_eq!(mime, "image/jpeg");
    }

    #[test]
    fn rejects_empty_file() {
        let f = UploadedFile {
            filename: None,
            bytes: Bytes::new(),
        };
        assert_eq!(
            validate_upload(&f, ALLOWED_DOCUMENT_TYPES, 1024).unwrap_err(),
            "No file was uploaded."
        );
    }

    #[test]
    fn storage_keys_preserve_extension_and_differ() {
        let a = storage_key("projects", "project", Some("Shot.PNG"));
        let b = storage_key("projects", "project", Some("Shot.PNG"));
        assert!(a.starts_with("projects/project-"));
        assert!(a.ends_with(".png"));
        assert_ne!(a, b);
        assert!(storage_key("documents", "doc", None).ends_with(".bin"));
        // A hostile "extension" falls back to .bin instead of leaking into the key.
        assert!(storage_key("documents", "doc", Some("x...//etc")).ends_with(".bin"));
    }

    #[test]
    fn formats_file_sizes() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn file_extension_is_sanitized() {
        assert_eq!(file_extension("report.PDF"), Some("pdf".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("trailingdot."), None);
        assert_eq!(file_extension("weird.p/df"), None);
    }
}
