use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, instrument};

use shelf_core::{BookSource, BookView, ExplanationSource, PresentationSink};

use crate::history::HistoryStack;
use crate::memo::MemoStore;
use crate::picker::{Picker, RandomSource, ThreadRandom};

/// Construction-time options for a [`Navigator`].
#[derive(Clone, Debug)]
pub struct NavigatorConfig {
    pub start_index: usize,
    /// Warm the next random book in the background after each render.
    pub prefetch: bool,
    pub loading_title: String,
    pub loading_description: String,
    pub pending_description: String,
    pub fallback_description: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            start_index: 0,
            prefetch: true,
            loading_title: "LOADING...".to_string(),
            loading_description: "Loading story...".to_string(),
            pending_description: "Reading the story...".to_string(),
            fallback_description: "Something went wrong while loading the description."
                .to_string(),
        }
    }
}

/// How a single render ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The book at `index` is on display.
    Displayed { index: usize },
    /// The book could not be resolved; the previous display stays.
    Aborted,
    /// A newer render was issued while this one was suspended.
    Superseded,
}

struct NavState {
    current_index: usize,
    total_books: usize,
    next_random: Option<usize>,
    history: HistoryStack,
    /// What the sink last showed for a completed book, restored when a
    /// later render aborts after showing the placeholder.
    shown: Option<(BookView, String)>,
}

/// Drives backward/forward navigation over a circular collection.
///
/// Each render is stamped with a generation number. After every suspension
/// point a render checks that it is still the latest one and otherwise
/// returns [`RenderOutcome::Superseded`] without making further writes.
/// State locks are never held across an await.
pub struct Navigator {
    books: Arc<dyn BookSource>,
    explanations: Arc<dyn ExplanationSource>,
    sink: Arc<dyn PresentationSink>,
    memo: Arc<MemoStore>,
    picker: Picker,
    config: NavigatorConfig,
    state: Mutex<NavState>,
    generation: AtomicU64,
}

impl Navigator {
    pub fn new(
        books: Arc<dyn BookSource>,
        explanations: Arc<dyn ExplanationSource>,
        sink: Arc<dyn PresentationSink>,
        config: NavigatorConfig,
    ) -> Self {
        Self {
            books,
            explanations,
            sink,
            memo: Arc::new(MemoStore::new()),
            picker: Picker::new(Arc::new(ThreadRandom)),
            state: Mutex::new(NavState {
                current_index: config.start_index,
                total_books: 0,
                next_random: None,
                history: HistoryStack::new(),
                shown: None,
            }),
            config,
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the randomness behind index selection and page numbers.
    pub fn with_random(mut self, rng: Arc<dyn RandomSource>) -> Self {
        self.picker = Picker::new(rng);
        self
    }

    /// Initial render of the configured start index, without history.
    pub async fn start(&self) -> RenderOutcome {
        self.render(self.config.start_index, false).await
    }

    /// Go to the prefetched random book, or a fresh random one if none is
    /// ready yet.
    pub async fn navigate_forward(&self) -> RenderOutcome {
        let target = {
            let state = self.state.lock();
            state
                .next_random
                .unwrap_or_else(|| self.picker.index(state.total_books))
        };
        debug!(target, "navigate forward");
        self.render(target, true).await
    }

    /// Return to the most recent history entry without recording the move.
    /// With empty history, jump to a fresh random book so the control never
    /// dead-ends; history stays empty in that case.
    pub async fn navigate_backward(&self) -> RenderOutcome {
        let (popped, total) = {
            let mut state = self.state.lock();
            (state.history.pop(), state.total_books)
        };
        match popped {
            Some(previous) => {
                debug!(target = previous, "navigate backward");
                self.render(previous, false).await
            }
            None => {
                let target = self.picker.index(total);
                debug!(target, "navigate backward with empty history");
                self.render(target, false).await
            }
        }
    }

    /// Resolve and display the book at `index`.
    ///
    /// With `record_history`, the previous current index is pushed when the
    /// resolved book differs from it.
    #[instrument(skip(self))]
    pub async fn render(&self, index: usize, record_history: bool) -> RenderOutcome {
        let stamp = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let placeholder = !self.memo.has_book(index);
        if placeholder {
            self.sink
                .show_loading(&self.config.loading_title, &self.config.loading_description);
        }

        let Some(book) = self.memo.book(index, self.books.as_ref()).await else {
            if placeholder && !self.is_stale(stamp) {
                self.restore_shown();
            }
            return RenderOutcome::Aborted;
        };
        if self.is_stale(stamp) {
            debug!(stamp, index = book.index, "render superseded after book fetch");
            return RenderOutcome::Superseded;
        }

        {
            let mut state = self.state.lock();
            if record_history && state.current_index != book.index {
                let previous = state.current_index;
                state.history.push(previous);
            }
            state.current_index = book.index;
            state.total_books = book.total;
        }

        let view = BookView {
            title: book.title.clone(),
            issue_number: book.index + 1,
            page_number: self.picker.page_number(),
            cover_url: book.image_url.clone(),
        };
        self.sink.show_book(&view);
        self.sink.show_description(&self.config.pending_description);

        let explanation = self
            .memo
            .explanation(
                &book,
                self.explanations.as_ref(),
                &self.config.fallback_description,
            )
            .await;
        if self.is_stale(stamp) {
            debug!(stamp, index = book.index, "render superseded after explanation");
            return RenderOutcome::Superseded;
        }
        self.sink.show_description(&explanation);

        let next = self.picker.next_index(book.total, book.index);
        {
            let mut state = self.state.lock();
            state.next_random = Some(next);
            state.shown = Some((view, explanation));
        }
        info!(current = book.index, next_random = next, total = book.total, "displayed book");

        if self.config.prefetch {
            self.prefetch(next);
        }

        RenderOutcome::Displayed { index: book.index }
    }

    /// Put the last completed book back on the sink, replacing the placeholder.
    fn restore_shown(&self) {
        let shown = self.state.lock().shown.clone();
        if let Some((view, description)) = shown {
            debug!(index = view.issue_number - 1, "restoring previous display");
            self.sink.show_book(&view);
            self.sink.show_description(&description);
        }
    }

    fn is_stale(&self, stamp: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != stamp
    }

    /// Fire-and-forget warm-up of the memo store for `index`.
    fn prefetch(&self, index: usize) {
        if self.memo.has_book(index) && self.memo.has_explanation(index) {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(index, "no runtime, skipping prefetch");
            return;
        };
        let memo = Arc::clone(&self.memo);
        let books = Arc::clone(&self.books);
        let explanations = Arc::clone(&self.explanations);

        let _ = handle.spawn(async move {
            if let Some(book) = memo.book(index, books.as_ref()).await {
                if memo.try_explanation(&book, explanations.as_ref()).await.is_ok() {
                    debug!(index, "prefetched book and explanation");
                }
            }
        });
    }

    pub fn current_index(&self) -> usize {
        self.state.lock().current_index
    }

    pub fn total_books(&self) -> usize {
        self.state.lock().total_books
    }

    /// `None` until the first render completes.
    pub fn next_random_index(&self) -> Option<usize> {
        self.state.lock().next_random
    }

    pub fn history(&self) -> Vec<usize> {
        self.state.lock().history.as_slice().to_vec()
    }

    pub fn memo(&self) -> &MemoStore {
        &self.memo
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::picker::ScriptedRandom;
    use crate::recording::{RecordingSink, SinkEvent};
    use shelf_core::BookRecord;
    use shelf_sources::{MockBookSource, MockExplanationSource};

    struct Harness {
        nav: Navigator,
        books: Arc<MockBookSource>,
        explanations: Arc<MockExplanationSource>,
        sink: Arc<RecordingSink>,
    }

    fn harness_with(
        books: MockBookSource,
        explanations: MockExplanationSource,
        script: &[usize],
        prefetch: bool,
    ) -> Harness {
        let books = Arc::new(books);
        let explanations = Arc::new(explanations);
        let sink = Arc::new(RecordingSink::new());
        let config = NavigatorConfig {
            prefetch,
            fallback_description: "fallback".into(),
            ..NavigatorConfig::default()
        };
        let nav = Navigator::new(books.clone(), explanations.clone(), sink.clone(), config)
            .with_random(Arc::new(ScriptedRandom::new(script.iter().copied())));
        Harness {
            nav,
            books,
            explanations,
            sink,
        }
    }

    fn harness(count: usize, script: &[usize]) -> Harness {
        harness_with(
            MockBookSource::with_count(count),
            MockExplanationSource::new(),
            script,
            false,
        )
    }

    #[tokio::test]
    async fn start_displays_first_book() {
        let h = harness(5, &[4, 3]);
        assert_eq!(h.nav.next_random_index(), None);

        assert_eq!(h.nav.start().await, RenderOutcome::Displayed { index: 0 });
        assert_eq!(h.nav.current_index(), 0);
        assert_eq!(h.nav.total_books(), 5);
        assert_eq!(h.nav.next_random_index(), Some(3));
        assert!(h.nav.history().is_empty());

        assert_eq!(
            h.sink.events(),
            vec![
                SinkEvent::Loading {
                    title: "LOADING...".into(),
                    description: "Loading story...".into(),
                },
                SinkEvent::Book(BookView {
                    title: "Book 0".into(),
                    issue_number: 1,
                    page_number: 5,
                    cover_url: "https://covers.example/0.jpg".into(),
                }),
                SinkEvent::Description("Reading the story...".into()),
                SinkEvent::Description("About Book 0".into()),
            ]
        );
    }

    #[tokio::test]
    async fn forward_uses_prepared_index_and_records_history() {
        let h = harness(5, &[4, 3, 9, 1]);
        h.nav.start().await;

        assert_eq!(h.nav.navigate_forward().await, RenderOutcome::Displayed { index: 3 });
        assert_eq!(h.nav.history(), vec![0]);
        assert_eq!(h.nav.next_random_index(), Some(1));
        assert_eq!(h.sink.last_book().unwrap().issue_number, 4);
    }

    #[tokio::test]
    async fn forward_before_first_render_picks_fresh_index() {
        let h = harness(5, &[2, 0, 1]);
        // total is still unknown, so the fresh pick resolves to 0
        assert_eq!(h.nav.navigate_forward().await, RenderOutcome::Displayed { index: 0 });
        assert!(h.nav.history().is_empty());
    }

    #[tokio::test]
    async fn forward_to_same_index_does_not_push() {
        let h = harness(5, &[0, 0, 0]);
        h.nav.start().await;
        assert_eq!(h.nav.next_random_index(), Some(0));

        assert_eq!(h.nav.navigate_forward().await, RenderOutcome::Displayed { index: 0 });
        assert!(h.nav.history().is_empty());
    }

    #[tokio::test]
    async fn backward_pops_without_recording() {
        let h = harness(5, &[0, 3, 0, 2, 0, 4]);
        h.nav.start().await;
        h.nav.navigate_forward().await;
        assert_eq!(h.nav.history(), vec![0]);

        assert_eq!(h.nav.navigate_backward().await, RenderOutcome::Displayed { index: 0 });
        assert!(h.nav.history().is_empty());
        assert_eq!(h.nav.current_index(), 0);
    }

    #[tokio::test]
    async fn backward_on_empty_history_picks_random() {
        let h = harness(5, &[0, 1, 3, 0, 2]);
        h.nav.start().await;

        assert_eq!(h.nav.navigate_backward().await, RenderOutcome::Displayed { index: 3 });
        assert!(h.nav.history().is_empty());
    }

    #[tokio::test]
    async fn book_failure_aborts_and_keeps_state() {
        let h = harness_with(
            MockBookSource::with_count(5).failing_on(2),
            MockExplanationSource::new(),
            &[0, 2],
            false,
        );
        h.nav.start().await;

        let before = h.sink.last_book().unwrap();
        h.sink.clear();

        assert_eq!(h.nav.navigate_forward().await, RenderOutcome::Aborted);
        assert_eq!(h.nav.current_index(), 0);
        assert!(h.nav.history().is_empty());

        // placeholder, then the previous book and its description come back
        let events = h.sink.events();
        assert!(matches!(events.first(), Some(SinkEvent::Loading { .. })));
        assert_eq!(
            &events[1..],
            &[
                SinkEvent::Book(before),
                SinkEvent::Description("About Book 0".into()),
            ]
        );
    }

    #[tokio::test]
    async fn abort_before_anything_shown_leaves_placeholder() {
        let h = harness_with(
            MockBookSource::with_count(3).failing_on(0),
            MockExplanationSource::new(),
            &[],
            false,
        );
        assert_eq!(h.nav.start().await, RenderOutcome::Aborted);
        assert_eq!(h.sink.book_count(), 0);
        assert!(matches!(
            h.sink.events().last(),
            Some(SinkEvent::Loading { .. })
        ));
    }

    #[tokio::test]
    async fn explanation_failure_shows_fallback() {
        let h = harness_with(
            MockBookSource::with_count(5),
            MockExplanationSource::new().failing_on(2),
            &[0, 0],
            false,
        );
        assert_eq!(h.nav.render(2, true).await, RenderOutcome::Displayed { index: 2 });
        assert_eq!(h.sink.last_description().as_deref(), Some("fallback"));
    }

    #[tokio::test]
    async fn cached_book_skips_loading_placeholder() {
        let h = harness(5, &[0, 3, 0, 0, 0, 0]);
        h.nav.start().await;
        h.nav.navigate_forward().await;
        h.sink.clear();

        h.nav.navigate_backward().await;
        assert!(!h
            .sink
            .events()
            .iter()
            .any(|e| matches!(e, SinkEvent::Loading { .. })));
        assert_eq!(h.books.call_count(), 2);
        assert_eq!(h.explanations.call_count(), 2);
    }

    #[tokio::test]
    async fn growing_collection_updates_total() {
        let h = harness(2, &[0, 1]);
        h.nav.start().await;
        assert_eq!(h.nav.total_books(), 2);

        h.books.push(BookRecord::new(0, 0, "Book 2"));
        assert_eq!(h.nav.render(2, true).await, RenderOutcome::Displayed { index: 2 });
        assert_eq!(h.nav.total_books(), 3);
    }

    #[tokio::test]
    async fn wrapped_index_becomes_current() {
        let h = harness(3, &[]);
        assert_eq!(h.nav.render(7, false).await, RenderOutcome::Displayed { index: 1 });
        assert_eq!(h.nav.current_index(), 1);
        assert_eq!(h.sink.last_book().unwrap().issue_number, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_book_render_is_superseded() {
        let h = harness_with(
            MockBookSource::with_count(5).delayed_on(1, Duration::from_millis(100)),
            MockExplanationSource::new(),
            &[],
            false,
        );

        let (slow, fast) = tokio::join!(h.nav.render(1, true), h.nav.render(2, true));
        assert_eq!(slow, RenderOutcome::Superseded);
        assert_eq!(fast, RenderOutcome::Displayed { index: 2 });
        assert_eq!(h.nav.current_index(), 2);
        assert_eq!(h.nav.history(), vec![0]);
        assert_eq!(h.sink.book_count(), 1);
        assert_eq!(h.sink.last_book().unwrap().title, "Book 2");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_explanation_does_not_overwrite_newer_render() {
        let h = harness_with(
            MockBookSource::with_count(5),
            MockExplanationSource::new().delayed_on(1, Duration::from_millis(100)),
            &[],
            false,
        );

        let (slow, fast) = tokio::join!(h.nav.render(1, true), h.nav.render(2, true));
        assert_eq!(slow, RenderOutcome::Superseded);
        assert_eq!(fast, RenderOutcome::Displayed { index: 2 });
        assert_eq!(h.nav.history(), vec![0, 1]);
        assert_eq!(h.sink.last_description().as_deref(), Some("About Book 2"));
        assert!(!h
            .sink
            .events()
            .contains(&SinkEvent::Description("About Book 1".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn prefetch_warms_next_book() {
        let h = harness_with(
            MockBookSource::with_count(5),
            MockExplanationSource::new(),
            &[0, 3],
            true,
        );
        h.nav.start().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(h.nav.memo().has_book(3));
        assert!(h.nav.memo().has_explanation(3));
        assert_eq!(h.books.call_count(), 2);
        assert_eq!(h.explanations.call_count(), 2);

        assert_eq!(h.nav.navigate_forward().await, RenderOutcome::Displayed { index: 3 });
        assert_eq!(h.books.call_count(), 2);
        assert_eq!(h.explanations.call_count(), 2);
    }

    #[tokio::test]
    async fn next_index_rerolls_on_repeat() {
        let h = harness(5, &[0, 0, 2]);
        h.nav.start().await;
        assert_eq!(h.nav.next_random_index(), Some(2));
    }

    #[tokio::test]
    async fn single_book_collection() {
        let h = harness(1, &[0, 0]);
        h.nav.start().await;
        assert_eq!(h.nav.next_random_index(), Some(0));
        assert_eq!(h.nav.navigate_forward().await, RenderOutcome::Displayed { index: 0 });
        assert!(h.nav.history().is_empty());
    }
}
