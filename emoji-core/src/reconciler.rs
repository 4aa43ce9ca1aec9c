//! # Gesture Reconciliation
//!
//! Pan, magnify and per-emoji drag gestures run concurrently. Rather than a
//! single exclusive state machine, every view quantity is composed from a
//! *steady* (committed) part and a *live* (in-progress) part:
//!
//! ```text
//! effective_zoom  = steady_zoom * (selection empty ? live_zoom : 1)
//! effective_pan   = (steady_pan + live_pan) * effective_zoom
//! emoji scale     = selected ? live_zoom : 1
//! emoji position  = base + (selected ? live_drag : 0)
//! ```
//!
//! When a gesture ends its live part is folded into the steady state (or
//! into the document, for selection moves and scales) exactly once.

use serde::{Deserialize, Serialize};

use crate::transform::clamp_zoom;
use crate::{
    Document, EditorError, EditorResult, EmojiId, GesturePhase, Offset, Projection,
    Selection, Size,
};

/// Where a drag gesture's translation goes. Decided once, at gesture start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragRoute {
    /// Pan the whole canvas.
    Pan,
    /// Move the selected emojis.
    Selection,
}

/// Which gesture contributions are currently live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ActiveGestures {
    /// A drag is panning the canvas.
    pub panning: bool,
    /// A magnify gesture is in progress.
    pub zooming: bool,
    /// A drag is moving the selection.
    pub dragging_selection: bool,
}

impl ActiveGestures {
    /// Whether no gesture is live.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        !(self.panning || self.zooming || self.dragging_selection)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LiveDrag {
    route: DragRoute,
    /// Translation divided by the zoom in effect, i.e. in unscaled units.
    delta: Offset,
}

/// Composes concurrent gestures into view state and commits them on release.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureReconciler {
    steady_zoom: f64,
    /// Committed pan in unscaled units; multiplied by the effective zoom.
    steady_pan: Offset,
    live_zoom: Option<f64>,
    live_drag: Option<LiveDrag>,
}

impl Default for GestureReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureReconciler {
    /// Create a reconciler at 100% zoom with no pan.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            steady_zoom: 1.0,
            steady_pan: Offset::ZERO,
            live_zoom: None,
            live_drag: None,
        }
    }

    /// Committed zoom scale.
    #[must_use]
    pub const fn steady_zoom(&self) -> f64 {
        self.steady_zoom
    }

    /// Committed pan, in unscaled units.
    #[must_use]
    pub const fn steady_pan(&self) -> Offset {
        self.steady_pan
    }

    /// In-progress magnification (1.0 when no magnify gesture is live).
    #[must_use]
    pub fn live_zoom(&self) -> f64 {
        self.live_zoom.unwrap_or(1.0)
    }

    /// In-progress drag translation in unscaled units, with its route.
    #[must_use]
    pub fn live_drag(&self) -> Option<(DragRoute, Offset)> {
        self.live_drag.map(|d| (d.route, d.delta))
    }

    /// The set of live gesture contributions.
    #[must_use]
    pub fn active(&self) -> ActiveGestures {
        ActiveGestures {
            panning: matches!(self.live_drag, Some(LiveDrag { route: DragRoute::Pan, .. })),
            zooming: self.live_zoom.is_some(),
            dragging_selection: matches!(
                self.live_drag,
                Some(LiveDrag {
                    route: DragRoute::Selection,
                    ..
                })
            ),
        }
    }

    /// Zoom applied to the whole canvas.
    ///
    /// A live magnification only zooms the canvas when nothing is selected;
    /// otherwise it scales the selection instead.
    #[must_use]
    pub fn effective_zoom(&self, selection: &Selection) -> f64 {
        if selection.is_empty() {
            self.steady_zoom * self.live_zoom()
        } else {
            self.steady_zoom
        }
    }

    /// Pan offset in screen pixels.
    #[must_use]
    pub fn effective_pan(&self, selection: &Selection) -> Offset {
        (self.steady_pan + self.live_pan()) * self.effective_zoom(selection)
    }

    /// Extra scale applied to one emoji while a magnify gesture is live.
    #[must_use]
    pub fn emoji_scale(&self, id: EmojiId, selection: &Selection) -> f64 {
        if selection.contains(id) {
            self.live_zoom()
        } else {
            1.0
        }
    }

    /// Extra emoji-space displacement of one emoji while the selection is dragged.
    #[must_use]
    pub fn emoji_offset(&self, id: EmojiId, selection: &Selection) -> Offset {
        match self.live_drag {
            Some(LiveDrag {
                route: DragRoute::Selection,
                delta,
            }) if selection.contains(id) => delta,
            _ => Offset::ZERO,
        }
    }

    /// The projection for a viewport of the given size.
    #[must_use]
    pub fn projection(&self, viewport: Size, selection: &Selection) -> Projection {
        Projection::new(
            viewport.center(),
            self.effective_pan(selection),
            self.effective_zoom(selection),
        )
    }

    fn live_pan(&self) -> Offset {
        match self.live_drag {
            Some(LiveDrag {
                route: DragRoute::Pan,
                delta,
            }) => delta,
            _ => Offset::ZERO,
        }
    }

    /// Feed a magnify gesture event.
    ///
    /// On `End` the final scale is committed: to the global zoom if nothing is
    /// selected, otherwise to the size of every selected emoji.
    pub fn pinch(
        &mut self,
        phase: GesturePhase,
        scale: f64,
        document: &mut Document,
        selection: &Selection,
    ) {
        if !(scale.is_finite() && scale > 0.0) && phase != GesturePhase::Cancel {
            tracing::warn!(scale, ?phase, "ignoring pinch with invalid scale");
            return;
        }

        match phase {
            GesturePhase::Start | GesturePhase::Move => {
                self.live_zoom = Some(scale);
            }
            GesturePhase::End => {
                self.live_zoom = None;
                if selection.is_empty() {
                    self.steady_zoom = clamp_zoom(self.steady_zoom * scale);
                    tracing::debug!(zoom = self.steady_zoom, "zoom committed");
                } else {
                    tracing::debug!(scale, count = selection.len(), "scaling selection");
                    for id in selection.iter() {
                        if let Err(err) = document.scale_emoji(id, scale) {
                            tracing::warn!(%id, error = %err, "selected emoji not in document");
                        }
                    }
                }
            }
            GesturePhase::Cancel => {
                self.live_zoom = None;
            }
        }
    }

    /// Feed a drag gesture event.
    ///
    /// `target` is the emoji under the drag's start point, if any. The route
    /// is chosen from it on the first event of the gesture and kept until the
    /// gesture ends.
    pub fn drag(
        &mut self,
        phase: GesturePhase,
        translation: Offset,
        target: Option<EmojiId>,
        document: &mut Document,
        selection: &Selection,
    ) {
        if phase == GesturePhase::Cancel {
            if self.live_drag.take().is_some() {
                tracing::debug!("drag cancelled");
            }
            return;
        }

        let route = match (phase, self.live_drag) {
            (GesturePhase::Start, previous) => {
                if previous.is_some() {
                    tracing::debug!("drag restarted; dropping uncommitted translation");
                }
                Self::route_for(target, selection)
            }
            (_, Some(live)) => live.route,
            (_, None) => Self::route_for(target, selection),
        };
        let delta = translation / self.effective_zoom(selection);

        if phase != GesturePhase::End {
            self.live_drag = Some(LiveDrag { route, delta });
            return;
        }

        self.live_drag = None;
        match route {
            DragRoute::Pan => {
                self.steady_pan += delta;
                tracing::debug!(dx = self.steady_pan.dx, dy = self.steady_pan.dy, "pan committed");
            }
            DragRoute::Selection => {
                tracing::debug!(dx = delta.dx, dy = delta.dy, count = selection.len(), "moving selection");
                for id in selection.iter() {
                    if let Err(err) = document.move_emoji(id, delta) {
                        tracing::warn!(%id, error = %err, "selected emoji not in document");
                    }
                }
            }
        }
    }

    fn route_for(target: Option<EmojiId>, selection: &Selection) -> DragRoute {
        let route = match target {
            Some(id) if selection.contains(id) => DragRoute::Selection,
            _ => DragRoute::Pan,
        };
        tracing::debug!(?target, ?route, "drag routed");
        route
    }

    /// Fit an image of `image` pixels into `viewport`, resetting the pan.
    ///
    /// Returns `Ok(false)` without changes when there is no image.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::DegenerateViewport`] if either size has a zero
    /// dimension; the view is left unchanged.
    pub fn zoom_to_fit(&mut self, image: Option<Size>, viewport: Size) -> EditorResult<bool> {
        let Some(image) = image else {
            return Ok(false);
        };
        if image.is_degenerate() || viewport.is_degenerate() {
            return Err(EditorError::DegenerateViewport {
                image_width: image.width,
                image_height: image.height,
                viewport_width: viewport.width,
                viewport_height: viewport.height,
            });
        }

        let horizontal = viewport.width / image.width;
        let vertical = viewport.height / image.height;
        self.steady_pan = Offset::ZERO;
        self.steady_zoom = clamp_zoom(horizontal.min(vertical));
        tracing::debug!(zoom = self.steady_zoom, "zoomed to fit");
        Ok(true)
    }
}
