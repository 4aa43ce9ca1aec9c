//! Input events for canvas interaction.
//!
//! Platform gesture recognizers report *recognized* gestures; the editor
//! never sees raw touches. Coordinates are in screen space.

use serde::{Deserialize, Serialize};

use crate::{DropPayload, Offset, Point};

/// Phase of a continuous gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    /// Gesture recognized (finger down and moving / pinch started).
    Start,
    /// Gesture value changed.
    Move,
    /// Gesture finished; its final value is committed.
    End,
    /// Gesture cancelled by the platform; nothing is committed.
    Cancel,
}

/// Recognized gestures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", content = "data", rename_all = "snake_case")]
pub enum Gesture {
    /// Single tap at a point.
    Tap {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },

    /// Double tap at a point.
    DoubleTap {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },

    /// Drag from a start point by a cumulative translation.
    Drag {
        /// Gesture phase.
        phase: GesturePhase,
        /// X coordinate where the drag started.
        start_x: f64,
        /// Y coordinate where the drag started.
        start_y: f64,
        /// Cumulative horizontal translation since start.
        translation_x: f64,
        /// Cumulative vertical translation since start.
        translation_y: f64,
    },

    /// Pinch/magnify gesture.
    Pinch {
        /// Gesture phase.
        phase: GesturePhase,
        /// Cumulative scale factor since start (1.0 = no change).
        scale: f64,
    },
}

impl Gesture {
    /// Drag gesture helper.
    #[must_use]
    pub fn drag(phase: GesturePhase, start: Point, translation: Offset) -> Self {
        Self::Drag {
            phase,
            start_x: start.x,
            start_y: start.y,
            translation_x: translation.dx,
            translation_y: translation.dy,
        }
    }

    /// Pinch gesture helper.
    #[must_use]
    pub const fn pinch(phase: GesturePhase, scale: f64) -> Self {
        Self::Pinch { phase, scale }
    }

    /// Tap gesture helper.
    #[must_use]
    pub const fn tap(at: Point) -> Self {
        Self::Tap { x: at.x, y: at.y }
    }

    /// Double tap gesture helper.
    #[must_use]
    pub const fn double_tap(at: Point) -> Self {
        Self::DoubleTap { x: at.x, y: at.y }
    }
}

/// All input events the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum InputEvent {
    /// Recognized gesture.
    Gesture(Gesture),

    /// Something was dropped or pasted onto the canvas.
    Drop {
        /// The extracted payload.
        payload: DropPayload,
        /// Drop X coordinate.
        x: f64,
        /// Drop Y coordinate.
        y: f64,
    },

    /// The viewport changed size.
    Resize {
        /// New width in pixels.
        width: f64,
        /// New height in pixels.
        height: f64,
    },

    /// Remove every selected emoji.
    DeleteSelection,
}

impl From<Gesture> for InputEvent {
    fn from(gesture: Gesture) -> Self {
        Self::Gesture(gesture)
    }
}
