//! Decoding of user-supplied images into embeddable data URIs.
//!
//! Uploaded files are read fully into memory, sniffed for their format and
//! decoded once to make sure they are real images. The result is an
//! [`ImageData`] that can be turned into a `data:` URI and dropped straight
//! into an `<img src>` attribute, so the generated page stays self-contained.
//!
//! # Example
//!
//! ```rust
//! use retrospective::images::{decode_upload, ImageFormat};
//!
//! let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"></svg>"#;
//! let image = decode_upload(svg, None).unwrap();
//! assert_eq!(image.format, ImageFormat::Svg);
//! assert!(image.to_data_uri().starts_with("data:image/svg+xml;base64,"));
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::debug;
use std::path::Path;

/// Represents different image formats supported for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG image format
    Jpeg,
    /// PNG image format
    Png,
    /// SVG image format
    Svg,
    /// WebP image format
    WebP,
    /// GIF image format
    Gif,
}

impl ImageFormat {
    /// Detect image format from file extension.
    ///
    /// # Example
    ///
    /// ```
    /// use retrospective::images::ImageFormat;
    /// assert_eq!(ImageFormat::from_path("photo.jpg"), Some(ImageFormat::Jpeg));
    /// assert_eq!(ImageFormat::from_path("image.png"), Some(ImageFormat::Png));
    /// assert_eq!(ImageFormat::from_path("math.svg"), Some(ImageFormat::Svg));
    /// ```
    pub fn from_path(path: &str) -> Option<ImageFormat> {
        let lower = path.to_lowercase();
        if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            Some(ImageFormat::Jpeg)
        } else if lower.ends_with(".png") {
            Some(ImageFormat::Png)
        } else if lower.ends_with(".svg") {
            Some(ImageFormat::Svg)
        } else if lower.ends_with(".webp") {
            Some(ImageFormat::WebP)
        } else if lower.ends_with(".gif") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }

    /// Detect image format from the leading bytes of the file.
    ///
    /// Raster magic numbers win over the SVG sniff, so metadata that happens
    /// to mention `<svg` does not turn a PNG into text.
    pub fn from_bytes(bytes: &[u8]) -> Option<ImageFormat> {
        match image::guess_format(bytes) {
            Ok(image::ImageFormat::Png) => Some(ImageFormat::Png),
            Ok(image::ImageFormat::Jpeg) => Some(ImageFormat::Jpeg),
            Ok(image::ImageFormat::Gif) => Some(ImageFormat::Gif),
            Ok(image::ImageFormat::WebP) => Some(ImageFormat::WebP),
            _ if looks_like_svg(bytes) => Some(ImageFormat::Svg),
            _ => None,
        }
    }

    /// Get the MIME type for this image format.
    ///
    /// # Example
    ///
    /// ```
    /// use retrospective::images::ImageFormat;
    /// assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
    /// assert_eq!(ImageFormat::Png.mime_type(), "image/png");
    /// ```
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Svg => "image/svg+xml",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    fn raster(&self) -> Option<image::ImageFormat> {
        match self {
            ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            ImageFormat::Png => Some(image::ImageFormat::Png),
            ImageFormat::WebP => Some(image::ImageFormat::WebP),
            ImageFormat::Gif => Some(image::ImageFormat::Gif),
            ImageFormat::Svg => None,
        }
    }
}

/// Error types for image operations.
#[derive(Debug)]
pub enum ImageError {
    /// Failed to read the file from the local filesystem
    LoadError(String),
    /// The bytes are not a decodable image
    DecodeError(String),
    /// Recognized as an image, but not a format the page can embed
    UnsupportedFormat(String),
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageError::LoadError(e) => write!(f, "Failed to load image: {}", e),
            ImageError::DecodeError(e) => write!(f, "Failed to decode image: {}", e),
            ImageError::UnsupportedFormat(e) => write!(f, "Unsupported image format: {}", e),
        }
    }
}

impl std::error::Error for ImageError {}

/// Represents a decoded image with metadata.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// Image format
    pub format: ImageFormat,
}

impl ImageData {
    /// Encodes the image as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        data_uri(self.format.mime_type(), &BASE64.encode(&self.bytes))
    }
}

/// Builds a `data:` URI from a MIME type and an already base64-encoded payload.
pub fn data_uri(mime_type: &str, base64_payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_payload)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    // A multi-byte char may straddle the cut; only that tail may be invalid.
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        Err(e) if e.error_len().is_none() => match std::str::from_utf8(&head[..e.valid_up_to()]) {
            Ok(text) => text,
            Err(_) => return false,
        },
        Err(_) => return false,
    };
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    (trimmed.starts_with("<svg") || trimmed.starts_with("<?xml") || trimmed.starts_with("<!--"))
        && text.contains("<svg")
}

/// Decodes an uploaded file.
///
/// The format is sniffed from the content; `name_hint` is only used in
/// error messages and logs. Raster images are fully decoded so a truncated
/// or corrupt file is rejected here rather than shown broken in the page.
pub fn decode_upload(bytes: &[u8], name_hint: Option<&str>) -> Result<ImageData, ImageError> {
    let label = name_hint.unwrap_or("upload");
    if bytes.is_empty() {
        return Err(ImageError::DecodeError(format!("{} is empty", label)));
    }

    let format = match ImageFormat::from_bytes(bytes) {
        Some(format) => format,
        None => {
            // A known extension on unrecognizable bytes means a corrupt file.
            return Err(match name_hint.and_then(ImageFormat::from_path) {
                Some(expected) => ImageError::DecodeError(format!(
                    "{} does not contain valid {} data",
                    label,
                    expected.mime_type()
                )),
                None => ImageError::UnsupportedFormat(format!(
                    "{} is not a PNG, JPEG, GIF, WebP or SVG image",
                    label
                )),
            });
        }
    };

    match format.raster() {
        Some(raster) => {
            image::load_from_memory_with_format(bytes, raster)
                .map_err(|e| ImageError::DecodeError(format!("{}: {}", label, e)))?;
        }
        None => {
            std::str::from_utf8(bytes)
                .map_err(|e| ImageError::DecodeError(format!("{}: invalid SVG text: {}", label, e)))?;
        }
    }

    debug!(
        "[images] Decoded {} ({} bytes, {})",
        label,
        bytes.len(),
        format.mime_type()
    );

    Ok(ImageData {
        bytes: bytes.to_vec(),
        format,
    })
}

/// Reads an image file from disk and decodes it like [`decode_upload`].
pub fn read_upload(path: &Path) -> Result<ImageData, ImageError> {
    let bytes = std::fs::read(path).map_err(|e| {
        debug!("[images] Failed to read file {}: {}", path.display(), e);
        ImageError::LoadError(format!("Failed to read file {}: {}", path.display(), e))
    })?;
    decode_upload(&bytes, path.to_str())
}
