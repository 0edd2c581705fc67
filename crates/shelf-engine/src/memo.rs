use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use shelf_core::{BookRecord, BookSource, ExplanationSource, SourceError};

#[derive(Default)]
struct MemoEntry {
    book: Arc<OnceCell<BookRecord>>,
    explanation: Arc<OnceCell<String>>,
}

/// Per-index cache of resolved books and explanations.
///
/// A populated slot is never overwritten or evicted. Each slot admits one
/// in-flight fetch at a time; concurrent callers for the same slot wait on
/// it. Failures leave the slot empty, so the next request fetches again.
#[derive(Default)]
pub struct MemoStore {
    entries: Mutex<HashMap<usize, MemoEntry>>,
}

impl MemoStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn book_slot(&self, index: usize) -> Arc<OnceCell<BookRecord>> {
        self.entries.lock().entry(index).or_default().book.clone()
    }

    fn explanation_slot(&self, index: usize) -> Arc<OnceCell<String>> {
        self.entries.lock().entry(index).or_default().explanation.clone()
    }

    /// Cached book for `index`, fetching it on first use.
    ///
    /// `None` when the source fails; the failure is logged here.
    pub async fn book(&self, index: usize, source: &dyn BookSource) -> Option<BookRecord> {
        let slot = self.book_slot(index);
        if let Some(book) = slot.get() {
            debug!(index, "book cache hit");
            return Some(book.clone());
        }

        match slot.get_or_try_init(|| source.book(index)).await {
            Ok(book) => {
                let book = book.clone();
                if book.index != index {
                    // Seed the authoritative position too; first writer wins.
                    let _ = self.book_slot(book.index).set(book.clone());
                }
                Some(book)
            }
            Err(e) => {
                warn!(
                    index,
                    source = source.name(),
                    error_kind = e.error_kind(),
                    error = %e,
                    "failed to fetch book"
                );
                None
            }
        }
    }

    /// Cached explanation for `book.index`, fetching it on first use.
    pub async fn try_explanation(
        &self,
        book: &BookRecord,
        source: &dyn ExplanationSource,
    ) -> Result<String, SourceError> {
        let slot = self.explanation_slot(book.index);
        if let Some(text) = slot.get() {
            debug!(index = book.index, "explanation cache hit");
            return Ok(text.clone());
        }
        slot.get_or_try_init(|| source.explain(book))
            .await
            .cloned()
    }

    /// Like [`try_explanation`](Self::try_explanation), but a failure is
    /// logged and replaced by `fallback`. The fallback is not cached.
    pub async fn explanation(
        &self,
        book: &BookRecord,
        source: &dyn ExplanationSource,
        fallback: &str,
    ) -> String {
        match self.try_explanation(book, source).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    index = book.index,
                    source = source.name(),
                    error_kind = e.error_kind(),
                    error = %e,
                    "failed to fetch explanation"
                );
                fallback.to_string()
            }
        }
    }

    pub fn has_book(&self, index: usize) -> bool {
        self.entries
            .lock()
            .get(&index)
            .is_some_and(|e| e.book.initialized())
    }

    pub fn has_explanation(&self, index: usize) -> bool {
        self.entries
            .lock()
            .get(&index)
            .is_some_and(|e| e.explanation.initialized())
    }

    /// Number of indices with at least a slot allocated.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
