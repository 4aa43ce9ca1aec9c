//! Frame composition for the rendering surface.
//!
//! A [`Frame`] is everything a platform renderer needs for one paint: the
//! background placement and, for each visible emoji in z-order, its glyph,
//! screen position, screen font size and selection state.

use serde::{Deserialize, Serialize};

use crate::reconciler::ActiveGestures;
use crate::{Document, EmojiId, FetchStatus, GestureReconciler, Offset, Point, Selection, Size};

/// One emoji as it should be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderItem {
    /// Placement id.
    pub id: EmojiId,
    /// Glyph to draw.
    pub text: String,
    /// Center of the glyph in screen space.
    pub position: Point,
    /// Font size in screen pixels.
    pub font_size: f64,
    /// Whether to draw the selection border.
    pub selected: bool,
}

impl RenderItem {
    /// Whether a screen point falls inside the glyph's square box.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let half = self.font_size / 2.0;
        (point.x - self.position.x).abs() <= half && (point.y - self.position.y).abs() <= half
    }
}

/// Where and how large to draw the background image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundPlacement {
    /// Screen position of the image center (the emoji space origin).
    pub position: Point,
    /// Scale to draw the image at.
    pub scale: f64,
    /// Image size in pixels, if known.
    pub image_size: Option<Size>,
}

/// A complete description of what to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Viewport size.
    pub viewport: Size,
    /// Effective canvas zoom.
    pub zoom: f64,
    /// Effective pan in screen pixels.
    pub pan: Offset,
    /// Background image placement, when an image is ready.
    pub background: Option<BackgroundPlacement>,
    /// Background fetch status.
    pub fetch_status: FetchStatus,
    /// Show a progress indicator (a background fetch is in flight).
    pub show_progress: bool,
    /// Visible emojis in z-order.
    pub items: Vec<RenderItem>,
    /// Live gesture contributions.
    pub active_gestures: ActiveGestures,
    /// Document revision this frame was built from.
    pub revision: u64,
}

impl Frame {
    /// Compose a frame from the editor's parts.
    #[must_use]
    pub fn compose(
        document: &Document,
        selection: &Selection,
        gestures: &GestureReconciler,
        viewport: Size,
    ) -> Self {
        let projection = gestures.projection(viewport, selection);
        let zoom = projection.zoom;
        let origin = projection.origin();

        let items = document
            .visible_emojis()
            .map(|emoji| {
                let id = emoji.id();
                let offset = gestures.emoji_offset(id, selection);
                RenderItem {
                    id,
                    text: emoji.text().to_string(),
                    position: projection.to_screen_displaced(emoji.location(), offset),
                    font_size: f64::from(emoji.size()) * gestures.emoji_scale(id, selection) * zoom,
                    selected: selection.contains(id),
                }
            })
            .collect();

        let background = (document.fetch_status() == &FetchStatus::Ready
            && document.background().image_data().is_some())
        .then(|| BackgroundPlacement {
            position: origin,
            scale: zoom,
            image_size: document.background_image_size(),
        });

        Self {
            viewport,
            zoom,
            pan: projection.pan,
            background,
            fetch_status: document.fetch_status().clone(),
            show_progress: document.fetch_status().is_fetching(),
            items,
            active_gestures: gestures.active(),
            revision: document.revision(),
        }
    }

    /// Topmost emoji whose box contains `point`.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<EmojiId> {
        self.items
            .iter()
            .rev()
            .find(|item| item.contains(point))
            .map(|item| item.id)
    }
}
