//! Drag-and-drop / paste payloads.
//!
//! A drop may offer several representations. The editor always probes them
//! in the same order - URL, then image, then text - and takes the first one
//! any provider can deliver.

use serde::{Deserialize, Serialize};

/// What a drop turned out to contain.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum DropPayload {
    /// A URL, used as the background image source.
    Url(String),
    /// Encoded image bytes, used as the background.
    Image(Vec<u8>),
    /// Plain text; its first glyph is added if it is an emoji.
    Text(String),
}

impl std::fmt::Debug for DropPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Image(bytes) => write!(f, "Image({} bytes)", bytes.len()),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

/// A source of dropped data (one item of a platform drop session).
pub trait PayloadProvider {
    /// The item as a URL, if it has one.
    fn load_url(&self) -> Option<String> {
        None
    }

    /// The item as encoded image bytes, if it has them.
    fn load_image(&self) -> Option<Vec<u8>> {
        None
    }

    /// The item as plain text, if it has it.
    fn load_text(&self) -> Option<String> {
        None
    }
}

impl PayloadProvider for DropPayload {
    fn load_url(&self) -> Option<String> {
        match self {
            Self::Url(url) => Some(url.clone()),
            _ => None,
        }
    }

    fn load_image(&self) -> Option<Vec<u8>> {
        match self {
            Self::Image(bytes) => Some(bytes.clone()),
            _ => None,
        }
    }

    fn load_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            _ => None,
        }
    }
}

/// Extract a payload from the dropped providers.
///
/// Every provider is asked for a URL first; only if none has one are they
/// asked for an image, and only then for text.
pub fn extract_payload<P: PayloadProvider>(providers: &[P]) -> Option<DropPayload> {
    providers
        .iter()
        .find_map(PayloadProvider::load_url)
        .map(DropPayload::Url)
        .or_else(|| {
            providers
                .iter()
                .find_map(PayloadProvider::load_image)
                .map(DropPayload::Image)
        })
        .or_else(|| {
            providers
                .iter()
                .find_map(PayloadProvider::load_text)
                .map(DropPayload::Text)
        })
}
