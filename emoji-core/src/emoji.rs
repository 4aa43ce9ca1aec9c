//! Emoji placements - the building blocks of a document.

use serde::{Deserialize, Serialize};

use crate::EmojiPoint;

/// Unique identifier for an emoji placement.
///
/// Ids are assigned by the [`Document`](crate::Document) in insertion order
/// and are never reused, so they stay valid as selection keys even after the
/// placement is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmojiId(u64);

impl EmojiId {
    /// Wrap a raw id value.
    ///
    /// Only useful for addressing placements that already exist; new ids are
    /// handed out by [`Document::add_emoji`](crate::Document::add_emoji).
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EmojiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An emoji glyph placed on the canvas.
///
/// Position and size are stored in emoji space (offsets from the canvas
/// center, independent of pan and zoom). Serializable for frames and
/// logs, but never deserialized: placements only come from the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Emoji {
    id: EmojiId,
    text: String,
    /// Horizontal offset from canvas center.
    pub(crate) x: i32,
    /// Vertical offset from canvas center.
    pub(crate) y: i32,
    /// Base font size, always at least 1.
    pub(crate) size: i32,
    pub(crate) is_removed: bool,
}

impl Emoji {
    /// Only the document creates placements.
    pub(crate) fn new(id: EmojiId, text: String, location: EmojiPoint, size: i32) -> Self {
        Self {
            id,
            text,
            x: location.x,
            y: location.y,
            size: size.max(1),
            is_removed: false,
        }
    }

    /// Identifier of this placement.
    #[must_use]
    pub const fn id(&self) -> EmojiId {
        self.id
    }

    /// The glyph string.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Horizontal offset from canvas center in emoji space.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical offset from canvas center in emoji space.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Position in emoji space.
    #[must_use]
    pub const fn location(&self) -> EmojiPoint {
        EmojiPoint::new(self.x, self.y)
    }

    /// Base font size in emoji space.
    #[must_use]
    pub const fn size(&self) -> i32 {
        self.size
    }

    /// Whether the placement has been soft-deleted.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        self.is_removed
    }

    /// Whether the placement takes part in rendering and hit-testing.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !self.is_removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_size() {
        let emoji = Emoji::new(EmojiId::from_raw(1), "🔥".to_string(), EmojiPoint::new(3, -4), 0);
        assert_eq!(emoji.size(), 1);
        assert_eq!(emoji.location(), EmojiPoint::new(3, -4));
        assert!(emoji.is_visible());
    }

    #[test]
    fn test_id_ordering_follows_raw_value() {
        assert!(EmojiId::from_raw(1) < EmojiId::from_raw(2));
        assert_eq!(EmojiId::from_raw(7).to_string(), "7");
    }
}
