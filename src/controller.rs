/// Extraction flow: one user action in, one request out, results or an error rendered

use crate::api::Backend;
use crate::error::AppError;
use crate::media::ResultSet;
use std::cell::Cell;
use std::rc::Rc;
use uuid::Uuid;

/// What the extraction flow needs from the page
pub trait ExtractView {
    fn set_loading(&self, loading: bool);
    fn show_error(&self, message: &str);
    fn clear_error(&self);
    fn hide_results(&self);
    /// Replace whatever is rendered with `results` and bring it into view
    fn show_results(&self, results: ResultSet);
}

/// Shared flag set once the liveness probe fails; clones see the same flag
#[derive(Debug, Clone, Default)]
pub struct BackendStatus {
    down: Rc<Cell<bool>>,
}

impl BackendStatus {
    pub fn mark_down(&self) {
        self.down.set(true);
    }

    pub fn is_down(&self) -> bool {
        self.down.get()
    }
}

/// Wraps a view so the connectivity error stays on screen once the backend
/// is marked down, even for requests that were already in flight.
pub struct ConnectivityGuardedView<V> {
    inner: V,
    status: BackendStatus,
}

impl<V: ExtractView> ConnectivityGuardedView<V> {
    pub fn new(inner: V, status: BackendStatus) -> Self {
        ConnectivityGuardedView { inner, status }
    }
}

impl<V: ExtractView> ExtractView for ConnectivityGuardedView<V> {
    fn set_loading(&self, loading: bool) {
        self.inner.set_loading(loading);
    }

    fn show_error(&self, message: &str) {
        if !self.status.is_down() {
            self.inner.show_error(message);
        }
    }

    fn clear_error(&self) {
        if !self.status.is_down() {
            self.inner.clear_error();
        }
    }

    fn hide_results(&self) {
        self.inner.hide_results();
    }

    fn show_results(&self, results: ResultSet) {
        self.inner.show_results(results);
    }
}

/// Holds the view in its loading state until dropped
pub struct LoadingGuard<'a, V: ExtractView> {
    view: &'a V,
}

impl<'a, V: ExtractView> LoadingGuard<'a, V> {
    pub fn enter(view: &'a V) -> Self {
        view.set_loading(true);
        LoadingGuard { view }
    }
}

impl<V: ExtractView> Drop for LoadingGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_loading(false);
    }
}

/// Run one extraction for the raw input text.
///
/// Overlapping calls are independent: nothing is de-duplicated or cancelled,
/// and whichever response resolves last owns the rendered results.
pub async fn extract<B, V>(backend: &B, view: &V, raw_input: &str) -> Result<ResultSet, AppError>
where
    B: Backend,
    V: ExtractView,
{
    let url = raw_input.trim();
    if url.is_empty() {
        let err = AppError::EmptyInput;
        view.show_error(&err.user_message());
        return Err(err);
    }

    let request_id = Uuid::new_v4();
    view.clear_error();
    let _loading = LoadingGuard::enter(view);
    view.hide_results();

    log::info!("[{}] Extracting {}", request_id, url);

    match backend.extract(url).await {
        Ok(items) => {
            log::info!("[{}] Received {} media item(s)", request_id, items.len());
            let results = ResultSet::new(request_id, items);
            view.show_results(results.clone());
            Ok(results)
        }
        Err(e) => {
            log::warn!("[{}] Extraction failed: {}", request_id, e);
            let err = AppError::Api(e);
            view.show_error(&err.user_message());
            Err(err)
        }
    }
}

/// One-shot liveness check run at page load; never retried
pub async fn probe_backend<B: Backend>(backend: &B) -> Result<(), AppError> {
    match backend.ping().await {
        Ok(()) => {
            log::info!("Backend is reachable");
            Ok(())
        }
        Err(e) => {
            log::error!("Backend liveness check failed: {}", e);
            Err(AppError::BackendUnavailable(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, HttpReply, interpret_extract};
    use crate::error::{BACKEND_DOWN_MESSAGE, EMPTY_INPUT_MESSAGE, REJECTED_FALLBACK_MESSAGE};
    use crate::media::MediaDescriptor;
    use futures::executor::block_on;
    use std::cell::RefCell;

    /// Replays a canned HTTP reply and records every submitted url
    struct CannedBackend {
        reply: HttpReply,
        calls: RefCell<Vec<String>>,
        pings: RefCell<usize>,
    }

    impl CannedBackend {
        fn new(ok: bool, status: u16, body: &str) -> Self {
            CannedBackend {
                reply: HttpReply {
                    ok,
                    status,
                    body: body.to_string(),
                },
                calls: RefCell::new(Vec::new()),
                pings: RefCell::new(0),
            }
        }
    }

    impl Backend for CannedBackend {
        async fn ping(&self) -> Result<(), ApiError> {
            *self.pings.borrow_mut() += 1;
            crate::api::interpret_ping(&self.reply)
        }

        async fn extract(&self, url: &str) -> Result<Vec<MediaDescriptor>, ApiError> {
            self.calls.borrow_mut().push(url.to_string());
            interpret_extract(&self.reply)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Loading(bool),
        Error(String),
        ClearError,
        HideResults,
        Results(usize),
    }

    #[derive(Default)]
    struct RecordingView {
        events: RefCell<Vec<Event>>,
        rendered: RefCell<Option<ResultSet>>,
    }

    impl RecordingView {
        fn events(&self) -> Vec<Event> {
            self.events.borrow().clone()
        }
    }

    impl ExtractView for RecordingView {
        fn set_loading(&self, loading: bool) {
            self.events.borrow_mut().push(Event::Loading(loading));
        }

        fn show_error(&self, message: &str) {
            self.events.borrow_mut().push(Event::Error(message.to_string()));
        }

        fn clear_error(&self) {
            self.events.borrow_mut().push(Event::ClearError);
        }

        fn hide_results(&self) {
            self.events.borrow_mut().push(Event::HideResults);
        }

        fn show_results(&self, results: ResultSet) {
            self.events.borrow_mut().push(Event::Results(results.len()));
            *self.rendered.borrow_mut() = Some(results);
        }
    }

    #[test]
    fn test_extract_sends_trimmed_url_once() {
        let backend = CannedBackend::new(true, 200, r#"{"type":"image"}"#);
        let view = RecordingView::default();

        block_on(extract(&backend, &view, "  https://www.instagram.com/p/abc/  ")).unwrap();

        assert_eq!(*backend.calls.borrow(), vec!["https://www.instagram.com/p/abc/"]);
    }

    #[test]
    fn test_empty_input_never_hits_network() {
        for input in ["", "   ", "\t\n"] {
            let backend = CannedBackend::new(true, 200, "{}");
            let view = RecordingView::default();

            let result = block_on(extract(&backend, &view, input));

            assert!(matches!(result, Err(AppError::EmptyInput)));
            assert!(backend.calls.borrow().is_empty());
            assert_eq!(view.events(), vec![Event::Error(EMPTY_INPUT_MESSAGE.to_string())]);
        }
    }

    #[test]
    fn test_success_event_order() {
        let backend = CannedBackend::new(
            true,
            200,
            r#"{"filename":"a.mp4","type":"video","size":"3 MB","stream_url":"https://x/s","proxy_download":"https://x/d"}"#,
        );
        let view = RecordingView::default();

        let results = block_on(extract(&backend, &view, "https://x/p")).unwrap();

        assert_eq!(
            view.events(),
            vec![
                Event::ClearError,
                Event::Loading(true),
                Event::HideResults,
                Event::Results(1),
                Event::Loading(false),
            ]
        );
        assert_eq!(results.items[0].download_href(), "https://x/d");
    }

    #[test]
    fn test_rejected_request_shows_server_message() {
        let backend = CannedBackend::new(false, 400, r#"{"error":"bad link"}"#);
        let view = RecordingView::default();

        let result = block_on(extract(&backend, &view, "https://x/p"));

        assert!(result.is_err());
        assert_eq!(
            view.events(),
            vec![
                Event::ClearError,
                Event::Loading(true),
                Event::HideResults,
                Event::Error("bad link".to_string()),
                Event::Loading(false),
            ]
        );
        assert!(view.rendered.borrow().is_none());
    }

    #[test]
    fn test_rejected_without_message_uses_fallback() {
        let backend = CannedBackend::new(false, 500, r#"{"detail":"oops"}"#);
        let view = RecordingView::default();

        let _ = block_on(extract(&backend, &view, "https://x/p"));

        assert!(view.events().contains(&Event::Error(REJECTED_FALLBACK_MESSAGE.to_string())));
    }

    #[test]
    fn test_loading_exits_exactly_once() {
        let cases = [
            CannedBackend::new(true, 200, r#"{"media":[]}"#),
            CannedBackend::new(false, 500, "{}"),
            CannedBackend::new(true, 200, "not json"),
        ];

        for backend in cases {
            let view = RecordingView::default();
            let _ = block_on(extract(&backend, &view, "https://x/p"));

            let loading: Vec<Event> = view
                .events()
                .into_iter()
                .filter(|e| matches!(e, Event::Loading(_)))
                .collect();
            assert_eq!(loading, vec![Event::Loading(true), Event::Loading(false)]);
        }
    }

    #[test]
    fn test_each_extraction_replaces_results() {
        let view = RecordingView::default();

        let two = CannedBackend::new(true, 200, r#"{"media":[{"type":"image"},{"type":"video"}]}"#);
        block_on(extract(&two, &view, "https://x/1")).unwrap();
        let first_id = view.rendered.borrow().as_ref().unwrap().id;

        let one = CannedBackend::new(true, 200, r#"{"type":"image"}"#);
        block_on(extract(&one, &view, "https://x/2")).unwrap();

        let rendered = view.rendered.borrow();
        let rendered = rendered.as_ref().unwrap();
        assert_eq!(rendered.len(), 1);
        assert_ne!(rendered.id, first_id);
    }

    #[test]
    fn test_backend_down_keeps_connectivity_error() {
        let status = BackendStatus::default();
        let view = ConnectivityGuardedView::new(RecordingView::default(), status.clone());

        // probe fails while the request below is still pending
        status.mark_down();
        let backend = CannedBackend::new(false, 400, r#"{"error":"bad link"}"#);
        let _ = block_on(extract(&backend, &view, "https://x/p"));
        let _ = block_on(extract(&backend, &view, "   "));

        let events = view.inner.events();
        assert!(!events.contains(&Event::ClearError));
        assert!(!events.iter().any(|e| matches!(e, Event::Error(_))));
        assert_eq!(events.first(), Some(&Event::Loading(true)));
        assert_eq!(events.last(), Some(&Event::Loading(false)));
    }

    #[test]
    fn test_guarded_view_passes_through_while_backend_up() {
        let view = ConnectivityGuardedView::new(RecordingView::default(), BackendStatus::default());
        let backend = CannedBackend::new(false, 400, r#"{"error":"bad link"}"#);

        let _ = block_on(extract(&backend, &view, "https://x/p"));

        let events = view.inner.events();
        assert!(events.contains(&Event::ClearError));
        assert!(events.contains(&Event::Error("bad link".to_string())));
    }

    #[test]
    fn test_probe_backend() {
        let healthy = CannedBackend::new(true, 200, r#"{"status":"ok"}"#);
        assert!(block_on(probe_backend(&healthy)).is_ok());

        let down = CannedBackend::new(false, 503, "");
        let err = block_on(probe_backend(&down)).unwrap_err();
        assert_eq!(err.user_message(), BACKEND_DOWN_MESSAGE);
        assert_eq!(*down.pings.borrow(), 1);
    }
}
