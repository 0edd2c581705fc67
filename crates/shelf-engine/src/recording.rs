use parking_lot::Mutex;

use shelf_core::{BookView, PresentationSink};

/// One write made to a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkEvent {
    Loading { title: String, description: String },
    Book(BookView),
    Description(String),
    Error(String),
}

/// Sink that keeps every write in memory, for tests and headless runs.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    pub fn last_book(&self) -> Option<BookView> {
        self.events.lock().iter().rev().find_map(|e| match e {
            SinkEvent::Book(view) => Some(view.clone()),
            _ => None,
        })
    }

    pub fn last_description(&self) -> Option<String> {
        self.events.lock().iter().rev().find_map(|e| match e {
            SinkEvent::Description(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn book_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, SinkEvent::Book(_)))
            .count()
    }

    fn record(&self, event: SinkEvent) {
        self.events.lock().push(event);
    }
}

impl PresentationSink for RecordingSink {
    fn show_loading(&self, title: &str, description: &str) {
        self.record(SinkEvent::Loading {
            title: title.to_string(),
            description: description.to_string(),
        });
    }

    fn show_book(&self, view: &BookView) {
        self.record(SinkEvent::Book(view.clone()));
    }

    fn show_description(&self, text: &str) {
        self.record(SinkEvent::Description(text.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.record(SinkEvent::Error(message.to_string()));
    }
}
