//! Image payloads shared by the catalog, the wizard and the generation services.
//!
//! Every image in the app is either a remote URL (presets) or an inline,
//! base64-encoded payload (uploads and anything an AI model produced). The
//! generation services only accept inline payloads, so remote images pass
//! through an [`ImageEncoder`] first.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Unsupported image content: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to fetch {url}: HTTP {status}")]
    Fetch { url: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MediaError>;

// ============================================================================
// InlineImage
// ============================================================================

/// An image embedded directly as base64 bytes plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 (standard alphabet, padded), without any `data:` header.
    pub data: String,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Encode raw bytes with a known MIME type.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(mime_type, BASE64.encode(bytes))
    }

    /// Encode raw bytes, sniffing the MIME type from the content itself.
    ///
    /// Fails if the bytes are not a recognizable image.
    pub fn from_image_bytes(bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes)
            .map_err(|e| MediaError::UnsupportedFormat(e.to_string()))?;
        Ok(Self::from_bytes(bytes, format.to_mime_type()))
    }

    /// Read an image file from disk (user upload).
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_image_bytes(&bytes)
    }

    /// Read a user upload: either a pasted `data:` URL or a file path.
    pub fn from_upload(source: &str) -> Result<Self> {
        let source = source.trim();
        if source.starts_with("data:") {
            let image = Self::parse_data_url(source)?;
            image.decode()?;
            Ok(image)
        } else {
            Self::from_file(Path::new(source))
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn parse_data_url(input: &str) -> Result<Self> {
        let rest = input
            .strip_prefix("data:")
            .ok_or_else(|| MediaError::InvalidDataUrl("missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| MediaError::InvalidDataUrl("missing ',' separator".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| MediaError::InvalidDataUrl("only base64 payloads are supported".to_string()))?;
        if mime_type.is_empty() {
            return Err(MediaError::InvalidDataUrl("empty MIME type".to_string()));
        }
        Ok(Self::new(mime_type, payload))
    }

    /// Decode the payload back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(BASE64.decode(self.data.as_bytes())?)
    }

    /// Approximate decoded size in bytes, without decoding.
    pub fn approx_size(&self) -> usize {
        let padding = self.data.bytes().rev().take_while(|b| *b == b'=').count();
        ((self.data.len() / 4) * 3).saturating_sub(padding.min(2))
    }

    /// Preferred file extension for the MIME type.
    pub fn file_extension(&self) -> &'static str {
        image::ImageFormat::from_mime_type(&self.mime_type)
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("bin")
    }

    /// Write the decoded payload to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.decode()?)?;
        Ok(())
    }
}

// ============================================================================
// ImageData
// ============================================================================

/// Where an asset's pixels live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImageData {
    Remote(Url),
    Inline(InlineImage),
}

impl ImageData {
    pub fn is_inline(&self) -> bool {
        matches!(self, ImageData::Inline(_))
    }

    /// Normalize to an inline payload, fetching remote images through `encoder`.
    pub async fn to_inline(&self, encoder: &dyn ImageEncoder) -> Result<InlineImage> {
        match self {
            ImageData::Inline(image) => Ok(image.clone()),
            ImageData::Remote(url) => encoder.to_inline(url).await,
        }
    }

    /// Short human-readable description for logs and the TUI.
    pub fn describe(&self) -> String {
        match self {
            ImageData::Remote(url) => url.host_str().unwrap_or("remote").to_string(),
            ImageData::Inline(image) => {
                format!("{} ({} KB)", image.mime_type, image.approx_size() / 1024)
            }
        }
    }
}

impl From<InlineImage> for ImageData {
    fn from(image: InlineImage) -> Self {
        ImageData::Inline(image)
    }
}

// ============================================================================
// Image Encoding Utility
// ============================================================================

/// Converts a remote image into an inline payload.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageEncoder: Send + Sync {
    async fn to_inline(&self, url: &Url) -> Result<InlineImage>;
}

/// Fetches remote images over HTTP.
pub struct HttpImageEncoder {
    client: Client,
}

impl HttpImageEncoder {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageEncoder for HttpImageEncoder {
    async fn to_inline(&self, url: &Url) -> Result<InlineImage> {
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MediaError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let declared = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| v.starts_with("image/"));

        let bytes = resp.bytes().await?;
        tracing::debug!(%url, bytes = bytes.len(), "fetched remote image");

        match declared {
            Some(mime) => Ok(InlineImage::from_bytes(&bytes, mime)),
            None => InlineImage::from_image_bytes(&bytes),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
