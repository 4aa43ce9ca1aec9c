//! Coordinate spaces.
//!
//! Emoji positions are stored in *emoji space*: integer offsets from the
//! canvas center that do not depend on the current pan or zoom. *Screen
//! space* is the pixel space of the viewport after pan and zoom have been
//! applied. Changing the view only changes the projection, never the stored
//! content.
//!
//! ```text
//! screen = center + emoji * zoom + pan
//! emoji  = round((screen - pan - center) / zoom)
//! ```

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::{EditorError, EditorResult};

/// Smallest zoom scale the editor will commit.
pub const MIN_ZOOM: f64 = 0.01;

/// A point in screen space (pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add<Offset> for Point {
    type Output = Self;

    fn add(self, rhs: Offset) -> Self {
        Self::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl Sub for Point {
    type Output = Offset;

    fn sub(self, rhs: Self) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A 2D displacement (pan offsets, drag translations).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    /// Horizontal component.
    pub dx: f64,
    /// Vertical component.
    pub dy: f64,
}

impl Offset {
    /// The zero offset.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new offset.
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Whether both components are zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

impl Add for Offset {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, rhs: Self) {
        self.dx += rhs.dx;
        self.dy += rhs.dy;
    }
}

impl Neg for Offset {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.dx, -self.dy)
    }
}

impl Mul<f64> for Offset {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.dx * rhs, self.dy * rhs)
    }
}

impl Div<f64> for Offset {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.dx / rhs, self.dy / rhs)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Center point of a rectangle of this size anchored at the origin.
    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether either dimension is zero, negative or not finite.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// A position in emoji space (integer offsets from the canvas center).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmojiPoint {
    /// Horizontal offset.
    pub x: i32,
    /// Vertical offset.
    pub y: i32,
}

impl EmojiPoint {
    /// Canvas center.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Create a new emoji-space point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Round to the nearest integer, saturating at the `i32` bounds.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // `as` saturates; NaN maps to 0
pub fn round_to_i32(value: f64) -> i32 {
    value.round() as i32
}

/// Clamp a zoom scale into the committed range.
///
/// Non-finite values fall back to `1.0`.
#[must_use]
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.max(MIN_ZOOM)
    } else {
        1.0
    }
}

fn check_zoom(zoom: f64) -> EditorResult<()> {
    if zoom.is_finite() && zoom > 0.0 {
        Ok(())
    } else {
        Err(EditorError::InvalidZoom(zoom))
    }
}

/// Convert a screen point to emoji space.
///
/// # Errors
///
/// Returns [`EditorError::InvalidZoom`] if `zoom` is zero, negative or not finite.
pub fn to_emoji_space(
    screen: Point,
    view_center: Point,
    pan: Offset,
    zoom: f64,
) -> EditorResult<EmojiPoint> {
    check_zoom(zoom)?;
    Ok(EmojiPoint::new(
        round_to_i32((screen.x - pan.dx - view_center.x) / zoom),
        round_to_i32((screen.y - pan.dy - view_center.y) / zoom),
    ))
}

/// Convert an emoji-space point to screen space.
///
/// # Errors
///
/// Returns [`EditorError::InvalidZoom`] if `zoom` is zero, negative or not finite.
pub fn to_screen_space(
    location: EmojiPoint,
    view_center: Point,
    pan: Offset,
    zoom: f64,
) -> EditorResult<Point> {
    check_zoom(zoom)?;
    Ok(project(
        f64::from(location.x),
        f64::from(location.y),
        view_center,
        pan,
        zoom,
    ))
}

fn project(x: f64, y: f64, view_center: Point, pan: Offset, zoom: f64) -> Point {
    Point::new(view_center.x + x * zoom + pan.dx, view_center.y + y * zoom + pan.dy)
}

/// A snapshot of the view: where the canvas center is and how it is panned
/// and zoomed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Center of the viewport in screen space.
    pub view_center: Point,
    /// Pan offset in screen pixels (already multiplied by zoom).
    pub pan: Offset,
    /// Zoom scale (1.0 = 100%).
    pub zoom: f64,
}

impl Projection {
    /// Create a projection, clamping the zoom into the valid range.
    #[must_use]
    pub fn new(view_center: Point, pan: Offset, zoom: f64) -> Self {
        Self {
            view_center,
            pan,
            zoom: clamp_zoom(zoom),
        }
    }

    /// Identity projection for a viewport of the given size.
    #[must_use]
    pub fn for_viewport(viewport: Size) -> Self {
        Self::new(viewport.center(), Offset::ZERO, 1.0)
    }

    /// Screen to emoji space.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidZoom`] if the zoom was set out of range.
    pub fn to_emoji(&self, screen: Point) -> EditorResult<EmojiPoint> {
        to_emoji_space(screen, self.view_center, self.pan, self.zoom)
    }

    /// Emoji to screen space.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidZoom`] if the zoom was set out of range.
    pub fn to_screen(&self, location: EmojiPoint) -> EditorResult<Point> {
        to_screen_space(location, self.view_center, self.pan, self.zoom)
    }

    /// Emoji to screen space for a location displaced by a fractional
    /// emoji-space offset (a selection drag in progress).
    #[must_use]
    pub fn to_screen_displaced(&self, location: EmojiPoint, offset: Offset) -> Point {
        project(
            f64::from(location.x) + offset.dx,
            f64::from(location.y) + offset.dy,
            self.view_center,
            self.pan,
            self.zoom,
        )
    }

    /// Screen position of the emoji space origin.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.to_screen_displaced(EmojiPoint::ORIGIN, Offset::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_to_screen_space_applies_zoom_then_pan() {
        let screen = to_screen_space(
            EmojiPoint::new(5, 5),
            Point::new(100.0, 100.0),
            Offset::new(10.0, 10.0),
            2.0,
        )
        .expect("valid zoom");
        assert_eq!(screen, Point::new(120.0, 120.0));
    }

    #[test]
    fn test_displaced_matches_to_screen() {
        let projection = Projection::new(Point::new(100.0, 100.0), Offset::new(10.0, 10.0), 2.0);
        let location = EmojiPoint::new(5, 5);
        assert_eq!(
            projection.to_screen_displaced(location, Offset::ZERO),
            projection.to_screen(location).expect("valid zoom")
        );
        assert_eq!(
            projection.to_screen_displaced(location, Offset::new(0.5, -1.0)),
            Point::new(121.0, 118.0)
        );
        assert_eq!(projection.origin(), Point::new(110.0, 110.0));
    }

    #[test]
    fn test_to_emoji_space_rounds_to_nearest() {
        let p = to_emoji_space(Point::new(103.6, 96.4), Point::new(100.0, 100.0), Offset::ZERO, 1.0)
            .expect("valid zoom");
        assert_eq!(p, EmojiPoint::new(4, -4));
    }

    #[test]
    fn test_zero_zoom_is_domain_error() {
        let err = to_emoji_space(Point::default(), Point::default(), Offset::ZERO, 0.0);
        assert!(matches!(err, Err(EditorError::InvalidZoom(z)) if z == 0.0));
        assert!(to_screen_space(EmojiPoint::ORIGIN, Point::default(), Offset::ZERO, -1.0).is_err());
        assert!(to_screen_space(EmojiPoint::ORIGIN, Point::default(), Offset::ZERO, f64::NAN).is_err());
    }

    #[test]
    fn test_clamp_zoom() {
        assert!((clamp_zoom(0.0) - MIN_ZOOM).abs() < f64::EPSILON);
        assert!((clamp_zoom(-3.0) - MIN_ZOOM).abs() < f64::EPSILON);
        assert!((clamp_zoom(f64::INFINITY) - 1.0).abs() < f64::EPSILON);
        assert!((clamp_zoom(2.5) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_projection_clamps_zoom() {
        let projection = Projection::new(Point::default(), Offset::ZERO, 0.0);
        assert!(projection.to_emoji(Point::new(1.0, 1.0)).is_ok());
    }

    #[test]
    fn test_degenerate_size() {
        assert!(Size::new(0.0, 10.0).is_degenerate());
        assert!(Size::new(10.0, f64::NAN).is_degenerate());
        assert!(!Size::new(10.0, 10.0).is_degenerate());
    }

    proptest! {
        #[test]
        fn prop_round_trip_within_one(
            x in -100_000i32..100_000,
            y in -100_000i32..100_000,
            cx in -2000.0f64..2000.0,
            cy in -2000.0f64..2000.0,
            px in -5000.0f64..5000.0,
            py in -5000.0f64..5000.0,
            zoom in 0.01f64..50.0,
        ) {
            let center = Point::new(cx, cy);
            let pan = Offset::new(px, py);
            let p = EmojiPoint::new(x, y);
            let screen = to_screen_space(p, center, pan, zoom).expect("valid zoom");
            let back = to_emoji_space(screen, center, pan, zoom).expect("valid zoom");
            prop_assert!((back.x - p.x).abs() <= 1, "x: {} vs {}", back.x, p.x);
            prop_assert!((back.y - p.y).abs() <= 1, "y: {} vs {}", back.y, p.y);
        }
    }
}
