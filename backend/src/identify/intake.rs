use sha2::{Digest, Sha256};

use crate::ai::{ImageMime, ImagePart};
use crate::config::UploadLimits;
use crate::error::{ScanError, ScanResult};

const OPAQUE_MIME: &str = "application/octet-stream";

/// Validates an uploaded image before anything is sent to the AI service.
///
/// A declared MIME type must be JPEG, PNG or WEBP. Without a usable declared
/// type the format is sniffed from the content.
pub fn accept_image(
    bytes: Vec<u8>,
    declared_mime: Option<&str>,
    limits: &UploadLimits,
) -> ScanResult<ImagePart> {
    if bytes.is_empty() {
        return Err(ScanError::Input("The selected file is empty".to_string()));
    }
    check_size(bytes.len(), limits)?;

    let declared = declared_mime
        .map(str::trim)
        .filter(|mime| !mime.is_empty() && !mime.eq_ignore_ascii_case(OPAQUE_MIME));

    let mime = match declared {
        Some(mime_type) => ImageMime::from_declared(mime_type).ok_or_else(|| {
            ScanError::Input(format!(
                "Unsupported file type {}; please choose a JPEG, PNG or WEBP image",
                mime_type
            ))
        })?,
        None => ImageMime::sniff(&bytes).ok_or_else(|| {
            ScanError::Input(
                "The selected file is not a JPEG, PNG or WEBP image".to_string(),
            )
        })?,
    };

    Ok(ImagePart::new(bytes, mime))
}

pub fn check_size(len: usize, limits: &UploadLimits) -> ScanResult<()> {
    if len > limits.max_bytes {
        return Err(ScanError::Input(format!(
            "The selected file is too large (limit is {} bytes)",
            limits.max_bytes
        )));
    }
    Ok(())
}

/// Hex SHA-256 of the image, used only to correlate log lines.
pub fn image_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
