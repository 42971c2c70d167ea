use async_trait::async_trait;
use image::ImageFormat;

use crate::error::ScanResult;

/// Image formats the identification flow accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Jpeg,
    Png,
    Webp,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
            ImageMime::Webp => "image/webp",
        }
    }

    /// Matches a declared MIME type, ignoring case and parameters.
    pub fn from_declared(mime_type: &str) -> Option<Self> {
        let essence = mime_type.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageMime::Jpeg),
            "image/png" => Some(ImageMime::Png),
            "image/webp" => Some(ImageMime::Webp),
            _ => None,
        }
    }

    /// Detects the format from magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            ImageFormat::Jpeg => Some(ImageMime::Jpeg),
            ImageFormat::Png => Some(ImageMime::Png),
            ImageFormat::WebP => Some(ImageMime::Webp),
            _ => None,
        }
    }
}

/// Image bytes plus their MIME type, sent as one multimodal part.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePart {
    pub bytes: Vec<u8>,
    pub mime: ImageMime,
}

impl ImagePart {
    pub fn new(bytes: Vec<u8>, mime: ImageMime) -> Self {
        Self { bytes, mime }
    }
}

/// Sole boundary to the hosted generative model. One round trip per call,
/// no retries.
#[async_trait]
pub trait AiClient: Send + Sync {
    async fn identify(&self, image: &ImagePart, prompt: &str) -> ScanResult<String>;

    async fn complete(&self, prompt: &str) -> ScanResult<String>;
}
