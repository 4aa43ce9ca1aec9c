//! Selection of emoji placements, held as ids.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Document, EmojiId};

/// The set of currently selected emoji ids.
///
/// Holds ids rather than references so the selection never borrows from the
/// document it points into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: BTreeSet<EmojiId>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, id: EmojiId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Add `id` to the selection.
    pub fn insert(&mut self, id: EmojiId) {
        self.ids.insert(id);
    }

    /// Remove `id` from the selection.
    pub fn remove(&mut self, id: EmojiId) -> bool {
        self.ids.remove(&id)
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: EmojiId) -> bool {
        self.ids.contains(&id)
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of selected ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Selected ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = EmojiId> + '_ {
        self.ids.iter().copied()
    }

    /// Drop ids that no longer refer to a visible placement.
    pub fn retain_visible(&mut self, document: &Document) {
        self.ids
            .retain(|id| document.emoji(*id).is_some_and(crate::Emoji::is_visible));
    }
}

impl FromIterator<EmojiId> for Selection {
    fn from_iter<T: IntoIterator<Item = EmojiId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EmojiPoint;
    use proptest::prelude::*;

    #[test]
    fn test_toggle() {
        let mut selection = Selection::new();
        let id = EmojiId::from_raw(3);
        assert!(selection.toggle(id));
        assert!(selection.contains(id));
        assert!(!selection.toggle(id));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_retain_visible_drops_removed() {
        let mut doc = Document::new();
        let a = doc.add_emoji("👻", EmojiPoint::ORIGIN, 40).expect("add");
        let b = doc.add_emoji("👀", EmojiPoint::ORIGIN, 40).expect("add");
        let mut selection: Selection = [a, b, EmojiId::from_raw(42)].into_iter().collect();

        doc.remove_emoji(a).expect("remove");
        selection.retain_visible(&doc);

        assert_eq!(selection.iter().collect::<Vec<_>>(), vec![b]);
    }

    proptest! {
        #[test]
        fn prop_double_toggle_is_identity(
            initial in prop::collection::btree_set(0u64..50, 0..20),
            id in 0u64..50,
        ) {
            let mut selection: Selection = initial.iter().copied().map(EmojiId::from_raw).collect();
            let before = selection.clone();
            selection.toggle(EmojiId::from_raw(id));
            selection.toggle(EmojiId::from_raw(id));
            prop_assert_eq!(selection, before);
        }
    }
}
