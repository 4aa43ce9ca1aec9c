//! Editor state management.
//!
//! [`EditorState`] is the single serial owner of the document, the selection
//! and the gesture reconciler. Input events are applied one at a time in
//! arrival order.

use serde::{Deserialize, Serialize};

use crate::palette::{first_glyph, glyphs, is_emoji, DEFAULT_PALETTE};
use crate::transform::round_to_i32;
use crate::{
    Background, Document, DropPayload, EditorError, EditorResult, EmojiId, FetchTicket, Frame,
    Gesture, GesturePhase, GestureReconciler, InputEvent, Offset, Point, Projection, Selection,
    Size,
};

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Screen font size of a freshly dropped emoji.
    pub default_emoji_size: f64,
    /// Glyphs offered by the palette.
    pub palette: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_emoji_size: 40.0,
            palette: DEFAULT_PALETTE.to_string(),
        }
    }
}

/// The complete editor state for one editing session.
#[derive(Debug, Clone)]
pub struct EditorState {
    document: Document,
    selection: Selection,
    gestures: GestureReconciler,
    viewport: Size,
    config: EditorConfig,
}

impl EditorState {
    /// Create a new editor with an empty document and the given viewport size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_config(width, height, EditorConfig::default())
    }

    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(width: f64, height: f64, config: EditorConfig) -> Self {
        Self {
            document: Document::new(),
            selection: Selection::new(),
            gestures: GestureReconciler::new(),
            viewport: Size::new(width.max(0.0), height.max(0.0)),
            config,
        }
    }

    /// The document being edited.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the document, for hosts that drain its changes.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// The current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The gesture reconciler.
    #[must_use]
    pub const fn gestures(&self) -> &GestureReconciler {
        &self.gestures
    }

    /// Viewport size in pixels.
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    /// Editor configuration.
    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current emoji/screen projection.
    #[must_use]
    pub fn projection(&self) -> Projection {
        self.gestures.projection(self.viewport, &self.selection)
    }

    /// Compose the frame to render.
    #[must_use]
    pub fn frame(&self) -> Frame {
        Frame::compose(&self.document, &self.selection, &self.gestures, self.viewport)
    }

    /// Glyphs offered by the configured palette, in order. Non-emoji
    /// characters in the configured string are skipped.
    #[must_use]
    pub fn palette(&self) -> Vec<&str> {
        glyphs(&self.config.palette)
            .into_iter()
            .filter(|g| is_emoji(g))
            .collect()
    }

    /// The topmost visible emoji at a screen point.
    #[must_use]
    pub fn emoji_at(&self, point: Point) -> Option<EmojiId> {
        self.frame().hit_test(point)
    }

    /// Apply one input event.
    ///
    /// Returns a fetch ticket if the event asked for a background image that
    /// has to be fetched.
    pub fn process_event(&mut self, event: &InputEvent) -> Option<FetchTicket> {
        match event {
            InputEvent::Gesture(gesture) => {
                self.process_gesture(gesture);
                None
            }
            InputEvent::Drop { payload, x, y } => self.drop_payload(payload.clone(), Point::new(*x, *y)),
            InputEvent::Resize { width, height } => {
                self.resize(*width, *height);
                None
            }
            InputEvent::DeleteSelection => {
                self.delete_selection();
                None
            }
        }
    }

    fn process_gesture(&mut self, gesture: &Gesture) {
        match *gesture {
            Gesture::Tap { x, y } => self.tap(Point::new(x, y)),
            Gesture::DoubleTap { x, y } => self.double_tap(Point::new(x, y)),
            Gesture::Drag {
                phase,
                start_x,
                start_y,
                translation_x,
                translation_y,
            } => self.drag(
                phase,
                Point::new(start_x, start_y),
                Offset::new(translation_x, translation_y),
            ),
            Gesture::Pinch { phase, scale } => self.pinch(phase, scale),
        }
    }

    /// Single tap: toggle the emoji under the point, or clear the selection
    /// when the tap lands on empty canvas.
    pub fn tap(&mut self, at: Point) {
        match self.emoji_at(at) {
            Some(id) => {
                let selected = self.selection.toggle(id);
                tracing::debug!(%id, selected, "selection toggled");
            }
            None => {
                if !self.selection.is_empty() {
                    tracing::debug!(count = self.selection.len(), "selection cleared");
                }
                self.selection.clear();
            }
        }
    }

    /// Double tap on the canvas: fit the background image into the viewport.
    ///
    /// Double taps that land on an emoji are left to the emoji's own tap
    /// handling and do nothing here.
    pub fn double_tap(&mut self, at: Point) {
        if self.emoji_at(at).is_some() {
            return;
        }
        if let Err(err) = self
            .gestures
            .zoom_to_fit(self.document.background_image_size(), self.viewport)
        {
            tracing::debug!(error = %err, "zoom to fit skipped");
        }
    }

    /// Drag gesture. The emoji under `start` decides the route when the
    /// gesture begins.
    pub fn drag(&mut self, phase: GesturePhase, start: Point, translation: Offset) {
        let needs_route = phase == GesturePhase::Start || self.gestures.live_drag().is_none();
        let target = if needs_route { self.emoji_at(start) } else { None };
        self.gestures
            .drag(phase, translation, target, &mut self.document, &self.selection);
    }

    /// Magnify gesture.
    pub fn pinch(&mut self, phase: GesturePhase, scale: f64) {
        self.gestures
            .pinch(phase, scale, &mut self.document, &self.selection);
    }

    /// Handle a dropped payload at a screen location.
    pub fn drop_payload(&mut self, payload: DropPayload, at: Point) -> Option<FetchTicket> {
        match payload {
            DropPayload::Url(url) => self.set_background(Background::Url(url)),
            DropPayload::Image(bytes) => self.set_background(Background::ImageData(bytes)),
            DropPayload::Text(text) => {
                match first_glyph(&text) {
                    Some(glyph) if is_emoji(glyph) => {
                        if let Err(err) = self.add_emoji_at(glyph, at) {
                            tracing::warn!(error = %err, "dropped emoji rejected");
                        }
                    }
                    _ => tracing::debug!(%text, "dropped text is not an emoji"),
                }
                None
            }
        }
    }

    /// Add an emoji at a screen location, sized so it appears at the default
    /// font size under the current zoom.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is empty.
    pub fn add_emoji_at(&mut self, text: &str, at: Point) -> EditorResult<EmojiId> {
        let projection = self.projection();
        let location = projection.to_emoji(at)?;
        let size = round_to_i32(self.config.default_emoji_size / projection.zoom);
        self.document.add_emoji(text, location, size)
    }

    /// Replace the background. Returns the fetch ticket for URL backgrounds.
    pub fn set_background(&mut self, background: Background) -> Option<FetchTicket> {
        self.document.set_background(background)
    }

    /// Apply a background fetch result; stale results are discarded.
    pub fn complete_fetch(&mut self, generation: u64, result: EditorResult<Vec<u8>>) -> bool {
        self.document.complete_fetch(generation, result)
    }

    /// Remove an emoji. Unknown ids are logged and otherwise ignored.
    pub fn remove_emoji(&mut self, id: EmojiId) {
        match self.document.remove_emoji(id) {
            Ok(()) => {
                self.selection.remove(id);
            }
            Err(err @ EditorError::UnknownEmojiId(_)) => {
                tracing::warn!(error = %err, "remove ignored");
            }
            Err(err) => tracing::warn!(error = %err, "remove failed"),
        }
    }

    /// Remove every selected emoji and clear the selection.
    pub fn delete_selection(&mut self) {
        let ids: Vec<_> = self.selection.iter().collect();
        for id in ids {
            self.remove_emoji(id);
        }
        self.selection.clear();
    }

    /// Update the viewport size. Stored positions are unaffected.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width.max(0.0), height.max(0.0));
        tracing::debug!(width, height, "viewport resized");
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EmojiPoint, FetchStatus};

    #[test]
    fn test_drop_text_adds_first_emoji_glyph() {
        let mut state = EditorState::new(200.0, 200.0);
        let ticket = state.drop_payload(DropPayload::Text("🐶 dog".into()), Point::new(130.0, 90.0));
        assert!(ticket.is_none());

        let emoji = &state.document().emojis()[0];
        assert_eq!(emoji.text(), "🐶");
        assert_eq!(emoji.location(), EmojiPoint::new(30, -10));
        assert_eq!(emoji.size(), 40);
    }

    #[test]
    fn test_palette_from_config() {
        let state = EditorState::default();
        let palette = state.palette();
        assert_eq!(palette.len(), 35);
        assert_eq!(palette[0], "😀");

        let config = EditorConfig {
            palette: "🍎 ★🚀".to_string(),
            ..EditorConfig::default()
        };
        let state = EditorState::with_config(100.0, 100.0, config);
        assert_eq!(state.palette(), vec!["🍎", "🚀"]);
    }

    #[test]
    fn test_drop_text_symbol_ignored() {
        let mut state = EditorState::default();
        state.drop_payload(DropPayload::Text("★ star".into()), Point::new(1.0, 1.0));
        state.drop_payload(DropPayload::Text("© 2024".into()), Point::new(1.0, 1.0));
        assert!(state.document().emojis().is_empty());
        assert_eq!(state.document().revision(), 0);
    }

    #[test]
    fn test_drop_plain_text_ignored() {
        let mut state = EditorState::default();
        state.drop_payload(DropPayload::Text("hello".into()), Point::new(1.0, 1.0));
        assert!(state.document().emojis().is_empty());
    }

    #[test]
    fn test_drop_size_compensates_zoom() {
        let mut state = EditorState::new(200.0, 200.0);
        state.pinch(GesturePhase::End, 4.0);
        state.drop_payload(DropPayload::Text("🔥".into()), Point::new(100.0, 100.0));
        assert_eq!(state.document().emojis()[0].size(), 10);
    }

    #[test]
    fn test_drop_url_returns_ticket() {
        let mut state = EditorState::default();
        let ticket = state
            .process_event(&InputEvent::Drop {
                payload: DropPayload::Url("http://img/a.png".into()),
                x: 0.0,
                y: 0.0,
            })
            .expect("ticket");
        assert_eq!(ticket.url, "http://img/a.png");
        assert!(state.document().fetch_status().is_fetching());
    }

    #[test]
    fn test_tap_toggles_and_canvas_tap_clears() {
        let mut state = EditorState::new(200.0, 200.0);
        let a = state.add_emoji_at("😀", Point::new(100.0, 100.0)).expect("add");
        let b = state.add_emoji_at("🚀", Point::new(160.0, 100.0)).expect("add");

        state.tap(Point::new(100.0, 100.0));
        state.tap(Point::new(160.0, 100.0));
        assert!(state.selection().contains(a) && state.selection().contains(b));

        state.tap(Point::new(100.0, 100.0));
        assert!(!state.selection().contains(a));

        state.tap(Point::new(10.0, 10.0));
        assert!(state.selection().is_empty());
    }

    #[test]
    fn test_delete_selection() {
        let mut state = EditorState::new(200.0, 200.0);
        let a = state.add_emoji_at("😀", Point::new(100.0, 100.0)).expect("add");
        state.add_emoji_at("🚀", Point::new(160.0, 100.0)).expect("add");
        state.tap(Point::new(100.0, 100.0));

        state.process_event(&InputEvent::DeleteSelection);
        assert!(state.selection().is_empty());
        assert!(state.document().emoji(a).expect("kept").is_removed());
        assert_eq!(state.document().visible_count(), 1);
        // Removed emojis are no longer hit.
        assert_eq!(state.emoji_at(Point::new(100.0, 100.0)), None);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut state = EditorState::default();
        state.remove_emoji(EmojiId::from_raw(12));
        assert_eq!(state.document().revision(), 0);
    }

    #[test]
    fn test_resize_keeps_content() {
        let mut state = EditorState::new(200.0, 200.0);
        let id = state.add_emoji_at("🌎", Point::new(110.0, 100.0)).expect("add");
        state.resize(400.0, 300.0);
        let emoji = state.document().emoji(id).expect("present");
        assert_eq!(emoji.location(), EmojiPoint::new(10, 0));
        assert_eq!(state.frame().items[0].position, Point::new(210.0, 150.0));
    }

    #[test]
    fn test_double_tap_without_image_is_noop() {
        let mut state = EditorState::default();
        state.pinch(GesturePhase::End, 3.0);
        state.double_tap(Point::new(1.0, 1.0));
        assert!((state.gestures().steady_zoom() - 3.0).abs() < f64::EPSILON);
        assert_eq!(state.document().fetch_status(), &FetchStatus::Idle);
    }
}
