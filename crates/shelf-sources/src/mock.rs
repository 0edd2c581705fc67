use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use shelf_core::{BookRecord, BookSource, ExplanationSource, SourceError};

/// In-memory book source for deterministic tests.
///
/// Resolves indices modulo its current length, counts every call, and can
/// be told to fail or stall on specific resolved indices. The collection may
/// grow mid-session via [`push`](Self::push).
pub struct MockBookSource {
    books: Mutex<Vec<BookRecord>>,
    failures: HashSet<usize>,
    delays: HashMap<usize, Duration>,
    call_count: AtomicUsize,
}

impl MockBookSource {
    pub fn new(books: Vec<BookRecord>) -> Self {
        Self {
            books: Mutex::new(books),
            failures: HashSet::new(),
            delays: HashMap::new(),
            call_count: AtomicUsize::new(0),
        }
    }

    /// `count` books titled "Book 0", "Book 1", ...
    pub fn with_count(count: usize) -> Self {
        Self::new(
            (0..count)
                .map(|i| {
                    BookRecord::new(i, count, format!("Book {i}"))
                        .with_image_url(format!("https://covers.example/{i}.jpg"))
                })
                .collect(),
        )
    }

    pub fn failing_on(mut self, index: usize) -> Self {
        self.failures.insert(index);
        self
    }

    pub fn delayed_on(mut self, index: usize, delay: Duration) -> Self {
        self.delays.insert(index, delay);
        self
    }

    pub fn push(&self, book: BookRecord) {
        self.books.lock().push(book);
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    fn resolve(&self, index: usize) -> Result<BookRecord, SourceError> {
        let books = self.books.lock();
        if books.is_empty() {
            return Err(SourceError::EmptyCatalog);
        }
        let total = books.len();
        let resolved = index % total;
        if self.failures.contains(&resolved) {
            return Err(SourceError::Network(format!("mock failure for book {resolved}")));
        }
        let mut book = books[resolved].clone();
        book.index = resolved;
        book.total = total;
        Ok(book)
    }
}

#[async_trait]
impl BookSource for MockBookSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn book(&self, index: usize) -> Result<BookRecord, SourceError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        let len = self.books.lock().len();
        if len > 0 {
            if let Some(delay) = self.delays.get(&(index % len)) {
                tokio::time::sleep(*delay).await;
            }
        }
        self.resolve(index)
    }
}

/// Explanation source answering `"About <title>"`, with scripted failures.
#[derive(Default)]
pub struct MockExplanationSource {
    failures: HashSet<usize>,
    delays: HashMap<usize, Duration>,
    call_count: AtomicUsize,
}

impl MockExplanationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, index: usize) -> Self {
        self.failures.insert(index);
        self
    }

    pub fn delayed_on(mut self, index: usize, delay: Duration) -> Self {
        self.delays.insert(index, delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn text_for(book: &BookRecord) -> String {
        format!("About {}", book.title)
    }
}

#[async_trait]
impl ExplanationSource for MockExplanationSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn explain(&self, book: &BookRecord) -> Result<String, SourceError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if let Some(delay) = self.delays.get(&book.index) {
            tokio::time::sleep(*delay).await;
        }
        if self.failures.contains(&book.index) {
            return Err(SourceError::Status {
                status: 500,
                body: "mock explanation failure".into(),
            });
        }
        Ok(Self::text_for(book))
    }
}
