//! Editing session: the serial context that owns the editor state.
//!
//! Input events are applied in arrival order on the session's owner. Image
//! fetches run on tokio tasks and never touch the document directly; they
//! post their results back over a channel and the session applies them
//! between events.

use std::sync::Arc;

use emoji_core::{
    Background, DocumentChange, DropPayload, EditorConfig, EditorError, EditorState, FetchTicket,
    Frame, InputEvent,
};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use crate::fetch::{image_url, FetchError, ImageFetcher};

/// A finished fetch, posted back to the session.
#[derive(Debug)]
pub struct FetchCompletion {
    /// Generation of the request this result belongs to.
    pub generation: u64,
    /// Fetched bytes or the failure.
    pub result: Result<Vec<u8>, FetchError>,
}

/// One editing session: an [`EditorState`] plus its background fetcher.
pub struct EditorSession<F: ImageFetcher> {
    state: EditorState,
    fetcher: Arc<F>,
    completions_tx: mpsc::UnboundedSender<FetchCompletion>,
    completions_rx: mpsc::UnboundedReceiver<FetchCompletion>,
    /// The fetch for the current background generation, if in flight.
    current_fetch: Option<(u64, JoinHandle<()>)>,
}

impl<F: ImageFetcher> EditorSession<F> {
    /// Create a session with an empty document.
    #[must_use]
    pub fn new(fetcher: F, width: f64, height: f64, config: EditorConfig) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            state: EditorState::with_config(width, height, config),
            fetcher: Arc::new(fetcher),
            completions_tx,
            completions_rx,
            current_fetch: None,
        }
    }

    /// The editor state.
    #[must_use]
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Compose the current frame.
    #[must_use]
    pub fn frame(&self) -> Frame {
        self.state.frame()
    }

    /// Whether a background fetch is outstanding.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.state.document().fetch_status().is_fetching()
    }

    /// Apply one input event, then any fetch results that have arrived.
    /// Returns the document changes this caused, in order.
    ///
    /// Must be called from within a tokio runtime: URL drops spawn a fetch.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<DocumentChange> {
        let event = match event {
            InputEvent::Drop {
                payload: DropPayload::Url(url),
                x,
                y,
            } => InputEvent::Drop {
                payload: DropPayload::Url(resolve_image_url(url)),
                x: *x,
                y: *y,
            },
            other => other.clone(),
        };

        let replaces_background = matches!(
            event,
            InputEvent::Drop {
                payload: DropPayload::Url(_) | DropPayload::Image(_),
                ..
            }
        );
        let ticket = self.state.process_event(&event);
        if replaces_background {
            self.cancel_stale_fetch();
        }
        if let Some(ticket) = ticket {
            self.spawn_fetch(ticket);
        }
        self.apply_arrived();
        self.drain_changes()
    }

    /// Replace the background with the image at `url`.
    ///
    /// Returns immediately; the status is `fetching` until the result is
    /// applied by [`pump`](Self::pump) or [`settle`](Self::settle).
    pub fn set_background_url(&mut self, url: &str) -> Vec<DocumentChange> {
        self.set_background(Background::Url(resolve_image_url(url)))
    }

    /// Replace the background. URL backgrounds are fetched in the background.
    pub fn set_background(&mut self, background: Background) -> Vec<DocumentChange> {
        let ticket = self.state.set_background(background);
        self.cancel_stale_fetch();
        if let Some(ticket) = ticket {
            self.spawn_fetch(ticket);
        }
        self.drain_changes()
    }

    /// Apply every fetch result that has already arrived. Stale results are
    /// dropped and contribute no changes.
    pub fn pump(&mut self) -> Vec<DocumentChange> {
        self.apply_arrived();
        self.drain_changes()
    }

    /// Wait until no background fetch is outstanding.
    pub async fn settle(&mut self) -> Vec<DocumentChange> {
        while self.is_fetching() {
            let Some(completion) = self.completions_rx.recv().await else {
                break;
            };
            self.apply(completion);
        }
        self.drain_changes()
    }

    fn apply_arrived(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply(completion);
        }
    }

    fn drain_changes(&mut self) -> Vec<DocumentChange> {
        let changes = self.state.document_mut().take_changes();
        for change in &changes {
            tracing::debug!(?change, "document changed");
        }
        changes
    }

    fn apply(&mut self, completion: FetchCompletion) {
        let FetchCompletion { generation, result } = completion;
        if matches!(self.current_fetch, Some((g, _)) if g == generation) {
            self.current_fetch = None;
        }
        let result = result.map_err(|e| EditorError::FetchFailure(e.to_string()));
        if self.state.complete_fetch(generation, result) {
            tracing::info!(
                generation,
                status = ?self.state.document().fetch_status(),
                "background fetch applied"
            );
        }
    }

    /// Abort the in-flight fetch if it no longer matches the current background.
    fn cancel_stale_fetch(&mut self) {
        let current = self.state.document().background_generation();
        if let Some((generation, handle)) = self.current_fetch.take() {
            if generation == current {
                self.current_fetch = Some((generation, handle));
            } else {
                tracing::debug!(generation, current, "aborting superseded fetch");
                handle.abort();
            }
        }
    }

    fn spawn_fetch(&mut self, ticket: FetchTicket) {
        let FetchTicket { generation, url } = ticket;
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.completions_tx.clone();
        tracing::info!(generation, %url, "starting background fetch");

        let handle = tokio::spawn(async move {
            let fetch_url = url.clone();
            let mut fetch = AbortOnDrop(tokio::spawn(async move {
                fetcher.fetch(&fetch_url).await
            }));
            let result = match (&mut fetch.0).await {
                Ok(result) => result,
                Err(err) => Err(task_failure(&err)),
            };
            if let Err(err) = &result {
                tracing::warn!(generation, %url, error = %err, "background fetch failed");
            }
            // The session may be gone; nothing to deliver to then.
            let _ = tx.send(FetchCompletion { generation, result });
        });
        self.current_fetch = Some((generation, handle));
    }
}

/// Aborts the wrapped task when dropped, so aborting the reporting task also
/// stops the fetch it waits on.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn task_failure(err: &JoinError) -> FetchError {
    if err.is_panic() {
        FetchError::TaskFailed("fetch task panicked".to_string())
    } else {
        FetchError::TaskFailed("fetch task was cancelled".to_string())
    }
}

/// Resolve search-result links; unparsable input is kept so the fetch
/// itself reports the failure.
fn resolve_image_url(raw: &str) -> String {
    if raw.starts_with("data:") {
        return raw.to_string();
    }
    image_url(raw).map_or_else(|_| raw.to_string(), |url| url.to_string())
}

impl<F: ImageFetcher> Drop for EditorSession<F> {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.current_fetch.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use emoji_core::FetchStatus;

    struct FailingFetcher;

    struct PanickingFetcher;

    #[async_trait]
    impl ImageFetcher for PanickingFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            panic!("decoder blew up on {url}");
        }
    }

    #[async_trait]
    impl ImageFetcher for FailingFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
            Err(FetchError::Status(500))
        }
    }

    #[test]
    fn test_resolve_image_url() {
        assert_eq!(
            resolve_image_url("https://x.test/imgres?imgurl=https://img.test/a.png"),
            "https://img.test/a.png"
        );
        assert_eq!(resolve_image_url("garbage"), "garbage");
        assert_eq!(resolve_image_url("data:,abc"), "data:,abc");
    }

    #[tokio::test]
    async fn test_failed_fetch_sets_failed_status() {
        let mut session = EditorSession::new(FailingFetcher, 400.0, 300.0, EditorConfig::default());
        session.set_background_url("https://img.test/a.png");
        assert!(session.is_fetching());

        session.settle().await;
        match session.state().document().fetch_status() {
            FetchStatus::Failed { url, reason } => {
                assert_eq!(url, "https://img.test/a.png");
                assert!(reason.contains("500"), "reason: {reason}");
            }
            other => panic!("Expected Failed status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_panicking_fetch_is_reported_as_failure() {
        let mut session =
            EditorSession::new(PanickingFetcher, 400.0, 300.0, EditorConfig::default());
        session.set_background_url("https://img.test/a.png");

        tokio::time::timeout(std::time::Duration::from_secs(5), session.settle())
            .await
            .expect("settle returns after a panicked fetch");
        match session.state().document().fetch_status() {
            FetchStatus::Failed { url, reason } => {
                assert_eq!(url, "https://img.test/a.png");
                assert!(reason.contains("panicked"), "reason: {reason}");
            }
            other => panic!("Expected Failed status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_changes_are_returned_in_order_and_drained() {
        use emoji_core::{DropPayload, EmojiId, Gesture, Point};

        let mut session = EditorSession::new(FailingFetcher, 400.0, 300.0, EditorConfig::default());
        let added = session.handle(&InputEvent::Drop {
            payload: DropPayload::Text("🍎".into()),
            x: 200.0,
            y: 150.0,
        });
        let id = EmojiId::from_raw(1);
        assert_eq!(added, vec![DocumentChange::EmojiAdded { id }]);
        assert!(session.state().document().pending_changes().is_empty());

        session.handle(&Gesture::tap(Point::new(200.0, 150.0)).into());
        let removed = session.handle(&InputEvent::DeleteSelection);
        assert_eq!(removed, vec![DocumentChange::EmojiRemoved { id }]);

        let started = session.set_background_url("https://img.test/a.png");
        assert_eq!(
            started,
            vec![
                DocumentChange::FetchStatusChanged,
                DocumentChange::BackgroundChanged
            ]
        );
        let settled = session.settle().await;
        assert_eq!(settled, vec![DocumentChange::FetchStatusChanged]);
        assert!(session.state().document().pending_changes().is_empty());
    }

    #[tokio::test]
    async fn test_image_drop_cancels_pending_fetch() {
        let mut session = EditorSession::new(FailingFetcher, 400.0, 300.0, EditorConfig::default());
        session.set_background_url("https://img.test/a.png");
        session.set_background(Background::Blank);

        assert!(session.current_fetch.is_none());
        assert!(!session.is_fetching());
        session.settle().await;
        assert_eq!(session.state().document().fetch_status(), &FetchStatus::Idle);
    }
}
