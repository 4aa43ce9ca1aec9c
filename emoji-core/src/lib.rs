//! # EmojiArt Core
//!
//! Document model and gesture logic for an emoji art canvas editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 emoji-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Document        │  Gesture Reconciler      │
//! │  - Emojis        │  - Steady + live zoom    │
//! │  - Background    │  - Pan / selection drag  │
//! │  - Change log    │  - Zoom to fit           │
//! ├─────────────────────────────────────────────┤
//! │  Transform       │  Editor State            │
//! │  - Emoji space   │  - Selection by id       │
//! │  - Screen space  │  - Hit testing, frames   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Fetching background images is left to the host: the document hands out
//! [`FetchTicket`]s and accepts their results through
//! [`Document::complete_fetch`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod background;
pub mod document;
pub mod emoji;
pub mod error;
pub mod event;
pub mod palette;
pub mod payload;
pub mod reconciler;
pub mod render;
pub mod selection;
pub mod state;
pub mod transform;

pub use background::{Background, FetchStatus, FetchTicket};
pub use document::{Document, DocumentChange};
pub use emoji::{Emoji, EmojiId};
pub use error::{EditorError, EditorResult};
pub use event::{Gesture, GesturePhase, InputEvent};
pub use payload::{extract_payload, DropPayload, PayloadProvider};
pub use reconciler::{ActiveGestures, DragRoute, GestureReconciler};
pub use render::{BackgroundPlacement, Frame, RenderItem};
pub use selection::Selection;
pub use state::{EditorConfig, EditorState};
pub use transform::{
    clamp_zoom, to_emoji_space, to_screen_space, EmojiPoint, Offset, Point, Projection, Size,
    MIN_ZOOM,
};

/// Emoji core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
