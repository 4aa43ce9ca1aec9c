//! The emoji art document: background plus an ordered list of placements.

use serde::{Deserialize, Serialize};

use crate::background::decode_image_size;
use crate::transform::round_to_i32;
use crate::{
    Background, EditorError, EditorResult, Emoji, EmojiId, EmojiPoint, FetchStatus, FetchTicket,
    Offset, Size,
};

/// A mutation observed on the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum DocumentChange {
    /// A placement was appended.
    EmojiAdded {
        /// New placement id.
        id: EmojiId,
    },
    /// A placement was soft-deleted.
    EmojiRemoved {
        /// Removed placement id.
        id: EmojiId,
    },
    /// A placement moved.
    EmojiMoved {
        /// Moved placement id.
        id: EmojiId,
    },
    /// A placement changed size.
    EmojiScaled {
        /// Scaled placement id.
        id: EmojiId,
    },
    /// The background was replaced.
    BackgroundChanged,
    /// The background fetch status changed.
    FetchStatusChanged,
}

/// A document containing emoji placements over a background.
///
/// Placements are only created through [`Document::add_emoji`]. Removal is a
/// soft delete: the placement keeps its slot and id, it just stops being
/// visible.
#[derive(Debug, Clone, Default)]
pub struct Document {
    background: Background,
    fetch_status: FetchStatus,
    /// Generation of the most recent background request.
    background_generation: u64,
    background_size: Option<Size>,
    /// Insertion order is z-order.
    emojis: Vec<Emoji>,
    next_id: u64,
    revision: u64,
    changes: Vec<DocumentChange>,
}

impl Document {
    /// Create a new empty document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Append an emoji at `location` with the given base size.
    ///
    /// Sizes below 1 are clamped to 1.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOperation`] if `text` is empty.
    pub fn add_emoji(&mut self, text: &str, location: EmojiPoint, size: i32) -> EditorResult<EmojiId> {
        if text.is_empty() {
            return Err(EditorError::InvalidOperation(
                "emoji text must not be empty".to_string(),
            ));
        }

        // Default-constructed documents start the counter at 0.
        let id = EmojiId::from_raw(self.next_id.max(1));
        self.next_id = id.get() + 1;
        self.emojis.push(Emoji::new(id, text.to_string(), location, size));
        tracing::debug!(%id, text, x = location.x, y = location.y, size, "emoji added");
        self.record(DocumentChange::EmojiAdded { id });
        Ok(id)
    }

    /// Soft-delete the emoji with the given id.
    ///
    /// Removing an already removed emoji is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownEmojiId`] if no emoji has this id.
    pub fn remove_emoji(&mut self, id: EmojiId) -> EditorResult<()> {
        let emoji = self.emoji_slot(id)?;
        if emoji.is_removed {
            return Ok(());
        }
        emoji.is_removed = true;
        tracing::debug!(%id, "emoji removed");
        self.record(DocumentChange::EmojiRemoved { id });
        Ok(())
    }

    /// Multiply the emoji's size by `factor`, rounding to the nearest integer
    /// and never going below 1.
    ///
    /// A non-finite factor leaves the size unchanged. Removed emojis are not
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownEmojiId`] if no emoji has this id.
    pub fn scale_emoji(&mut self, id: EmojiId, factor: f64) -> EditorResult<()> {
        let emoji = self.emoji_slot(id)?;
        if emoji.is_removed {
            return Ok(());
        }
        if !factor.is_finite() {
            tracing::warn!(%id, factor, "ignoring non-finite scale factor");
            return Ok(());
        }
        let size = round_to_i32(f64::from(emoji.size) * factor).max(1);
        if size == emoji.size {
            return Ok(());
        }
        emoji.size = size;
        tracing::debug!(%id, factor, size, "emoji scaled");
        self.record(DocumentChange::EmojiScaled { id });
        Ok(())
    }

    /// Move the emoji by `delta` (emoji space), rounded to whole units.
    /// Removed emojis stay where they were.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownEmojiId`] if no emoji has this id.
    pub fn move_emoji(&mut self, id: EmojiId, delta: Offset) -> EditorResult<()> {
        let emoji = self.emoji_slot(id)?;
        if emoji.is_removed {
            return Ok(());
        }
        let dx = round_to_i32(delta.dx);
        let dy = round_to_i32(delta.dy);
        if dx == 0 && dy == 0 {
            return Ok(());
        }
        emoji.x = emoji.x.saturating_add(dx);
        emoji.y = emoji.y.saturating_add(dy);
        tracing::debug!(%id, dx, dy, x = emoji.x, y = emoji.y, "emoji moved");
        self.record(DocumentChange::EmojiMoved { id });
        Ok(())
    }

    /// Replace the background.
    ///
    /// A URL background starts a new fetch generation and returns the ticket
    /// the host should fetch; any earlier in-flight fetch becomes stale.
    /// Image data is accepted immediately.
    pub fn set_background(&mut self, background: Background) -> Option<FetchTicket> {
        self.background_generation += 1;
        self.background_size = None;
        let ticket = match &background {
            Background::Blank => {
                self.set_status(FetchStatus::Idle);
                None
            }
            Background::ImageData(bytes) => {
                self.accept_image(bytes, "");
                None
            }
            Background::Url(url) => {
                self.set_status(FetchStatus::Fetching { url: url.clone() });
                Some(FetchTicket {
                    generation: self.background_generation,
                    url: url.clone(),
                })
            }
        };
        tracing::debug!(
            generation = self.background_generation,
            background = ?background,
            "background set"
        );
        self.background = background;
        self.record(DocumentChange::BackgroundChanged);
        ticket
    }

    /// Apply the result of a background fetch.
    ///
    /// Returns `false` and changes nothing if `generation` is not the current
    /// background request (a newer background was set in the meantime).
    pub fn complete_fetch(&mut self, generation: u64, result: EditorResult<Vec<u8>>) -> bool {
        if generation != self.background_generation || !self.fetch_status.is_fetching() {
            tracing::debug!(
                generation,
                current = self.background_generation,
                "discarding stale background fetch"
            );
            return false;
        }

        let url = self.background.url().unwrap_or_default().to_string();
        match result {
            Ok(bytes) => {
                if self.accept_image(&bytes, &url) {
                    self.background = Background::ImageData(bytes);
                    self.record(DocumentChange::BackgroundChanged);
                }
            }
            Err(err) => {
                tracing::warn!(%url, error = %err, "background fetch failed");
                self.set_status(FetchStatus::Failed {
                    url,
                    reason: err.to_string(),
                });
            }
        }
        true
    }

    /// Decode the image header and move to `Ready`, or `Failed` if the bytes
    /// are not an image.
    fn accept_image(&mut self, bytes: &[u8], url: &str) -> bool {
        self.background_size = decode_image_size(bytes);
        if cfg!(feature = "images") && self.background_size.is_none() {
            tracing::warn!(len = bytes.len(), "background bytes are not a decodable image");
            self.set_status(FetchStatus::Failed {
                url: url.to_string(),
                reason: "not a decodable image".to_string(),
            });
            return false;
        }
        self.set_status(FetchStatus::Ready);
        true
    }

    fn set_status(&mut self, status: FetchStatus) {
        if self.fetch_status != status {
            self.fetch_status = status;
            self.record(DocumentChange::FetchStatusChanged);
        }
    }

    fn emoji_slot(&mut self, id: EmojiId) -> EditorResult<&mut Emoji> {
        self.emojis
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or(EditorError::UnknownEmojiId(id))
    }

    fn record(&mut self, change: DocumentChange) {
        self.revision += 1;
        self.changes.push(change);
    }

    /// Get an emoji by id (including removed ones).
    #[must_use]
    pub fn emoji(&self, id: EmojiId) -> Option<&Emoji> {
        self.emojis.iter().find(|e| e.id() == id)
    }

    /// All placements in z-order, including removed ones.
    #[must_use]
    pub fn emojis(&self) -> &[Emoji] {
        &self.emojis
    }

    /// Placements that are rendered and hit-tested, in z-order.
    pub fn visible_emojis(&self) -> impl DoubleEndedIterator<Item = &Emoji> {
        self.emojis.iter().filter(|e| e.is_visible())
    }

    /// Number of visible placements.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible_emojis().count()
    }

    /// The current background.
    #[must_use]
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Status of the background image.
    #[must_use]
    pub fn fetch_status(&self) -> &FetchStatus {
        &self.fetch_status
    }

    /// Generation of the latest background request.
    #[must_use]
    pub const fn background_generation(&self) -> u64 {
        self.background_generation
    }

    /// Pixel size of the background image, once one is available.
    #[must_use]
    pub const fn background_image_size(&self) -> Option<Size> {
        self.background_size
    }

    /// Monotonic counter bumped by every mutation.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Changes recorded and not yet drained.
    #[must_use]
    pub fn pending_changes(&self) -> &[DocumentChange] {
        &self.changes
    }

    /// Drain the changes recorded since the last call.
    pub fn take_changes(&mut self) -> Vec<DocumentChange> {
        std::mem::take(&mut self.changes)
    }
}
