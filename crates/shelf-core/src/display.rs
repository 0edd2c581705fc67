/// Everything the sink needs to draw the header and cover of a book.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookView {
    pub title: String,
    /// 1-based position in the collection.
    pub issue_number: usize,
    /// Cosmetic, in `[1, 30]`.
    pub page_number: u32,
    pub cover_url: String,
}

/// Display surface the navigator writes into.
///
/// The sink owns the cover spinner: it shows the spinner on
/// [`show_loading`](Self::show_loading) and swaps it for the image once the
/// cover passed to [`show_book`](Self::show_book) has loaded.
pub trait PresentationSink: Send + Sync {
    fn show_loading(&self, title: &str, description: &str);

    fn show_book(&self, view: &BookView);

    fn show_description(&self, text: &str);

    /// Static error screen, used when the collection itself is unavailable.
    fn show_error(&self, message: &str);
}
