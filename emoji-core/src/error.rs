//! Error types for editor operations.

use thiserror::Error;

use crate::EmojiId;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur in editor operations.
///
/// None of these are fatal: the editor state absorbs them as no-ops or
/// reflects them in a status field.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A removal or mutation referenced an id that was never assigned.
    #[error("Unknown emoji id: {0}")]
    UnknownEmojiId(EmojiId),

    /// Invalid operation on the document.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Zoom scale outside the transform's domain (zero, negative or not finite).
    #[error("Invalid zoom scale: {0}")]
    InvalidZoom(f64),

    /// Zoom-to-fit was asked to fit a zero-sized image or viewport.
    #[error("Degenerate viewport: image {image_width}x{image_height}, viewport {viewport_width}x{viewport_height}")]
    DegenerateViewport {
        /// Image width in pixels.
        image_width: f64,
        /// Image height in pixels.
        image_height: f64,
        /// Viewport width in pixels.
        viewport_width: f64,
        /// Viewport height in pixels.
        viewport_height: f64,
    },

    /// Background image fetch failed or was superseded.
    #[error("Background fetch failed: {0}")]
    FetchFailure(String),

    /// Event or frame serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
