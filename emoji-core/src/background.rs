//! Canvas background and its asynchronous fetch lifecycle.

use serde::{Deserialize, Serialize};

use crate::Size;

/// What sits behind the emojis.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Background {
    /// Plain white canvas.
    #[default]
    Blank,
    /// Encoded image bytes (PNG, JPEG, ...).
    ImageData(Vec<u8>),
    /// An image that still has to be fetched from this URL.
    Url(String),
}

impl Background {
    /// The URL to fetch, if this background is URL-backed.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }

    /// The image bytes, if present.
    #[must_use]
    pub fn image_data(&self) -> Option<&[u8]> {
        match self {
            Self::ImageData(data) => Some(data),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => write!(f, "Blank"),
            Self::ImageData(data) => write!(f, "ImageData({} bytes)", data.len()),
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

/// Progress of the background image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FetchStatus {
    /// Nothing to fetch.
    #[default]
    Idle,
    /// A fetch for `url` is in flight.
    Fetching {
        /// URL being fetched.
        url: String,
    },
    /// The last fetch failed.
    Failed {
        /// URL that failed.
        url: String,
        /// Human readable failure reason.
        reason: String,
    },
    /// The background image is available.
    Ready,
}

impl FetchStatus {
    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_fetching(&self) -> bool {
        matches!(self, Self::Fetching { .. })
    }
}

/// A request to fetch a background image, handed to the host.
///
/// The generation identifies the request; only the completion carrying the
/// document's current generation is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Request generation.
    pub generation: u64,
    /// URL to fetch.
    pub url: String,
}

/// Read the pixel dimensions from an encoded image header.
///
/// Returns `None` if the bytes are not a recognizable image.
#[cfg(feature = "images")]
#[must_use]
#[allow(clippy::module_name_repetitions)]
pub fn decode_image_size(bytes: &[u8]) -> Option<Size> {
    let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    let (width, height) = reader.into_dimensions().ok()?;
    Some(Size::new(f64::from(width), f64::from(height)))
}

/// Without the `images` feature dimensions are unknown.
#[cfg(not(feature = "images"))]
#[must_use]
pub fn decode_image_size(_bytes: &[u8]) -> Option<Size> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_accessors() {
        assert_eq!(Background::Url("http://x/a.png".into()).url(), Some("http://x/a.png"));
        assert_eq!(Background::ImageData(vec![1, 2]).image_data(), Some(&[1u8, 2][..]));
        assert!(Background::Blank.url().is_none());
    }

    #[test]
    fn test_debug_hides_bytes() {
        let bg = Background::ImageData(vec![0; 1024]);
        assert_eq!(format!("{bg:?}"), "ImageData(1024 bytes)");
    }

    #[test]
    fn test_fetch_status_serializes_tagged() {
        let status = FetchStatus::Fetching {
            url: "http://x".to_string(),
        };
        let json = serde_json::to_value(&status).expect("serialize");
        assert_eq!(json["status"], "fetching");
        assert_eq!(json["url"], "http://x");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_image_size(b"definitely not an image").is_none());
    }

    #[cfg(feature = "images")]
    #[test]
    fn test_decode_png_dimensions() {
        let img = image::RgbaImage::new(8, 4);
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).expect("encode png");
        let size = decode_image_size(buf.get_ref()).expect("png header");
        assert_eq!(size, Size::new(8.0, 4.0));
    }
}
