use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use shelf_core::{BookRecord, BookSource, ExplanationSource, SourceError};

/// A whole collection read once at startup.
///
/// The collection size is fixed for the session, and every stored record
/// carries its own position and that size.
#[derive(Clone, Debug)]
pub struct PreloadedCatalog {
    books: Vec<BookRecord>,
}

impl PreloadedCatalog {
    /// Read a JSON array of books from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let catalog = Self::from_slice(&bytes)?;
        info!(path = %path.display(), books = catalog.len(), "loaded dataset");
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        Self::from_slice(json.as_bytes())
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, SourceError> {
        let books: Vec<BookRecord> = serde_json::from_slice(bytes)?;
        Ok(Self::from_books(books))
    }

    pub fn from_books(mut books: Vec<BookRecord>) -> Self {
        let total = books.len();
        for (i, book) in books.iter_mut().enumerate() {
            book.index = i;
            book.total = total;
        }
        Self { books }
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Look up `index` modulo the collection size.
    pub fn get(&self, index: usize) -> Option<&BookRecord> {
        if self.books.is_empty() {
            return None;
        }
        self.books.get(index % self.books.len())
    }
}

#[async_trait]
impl BookSource for PreloadedCatalog {
    fn name(&self) -> &str {
        "preloaded"
    }

    async fn book(&self, index: usize) -> Result<BookRecord, SourceError> {
        self.get(index).cloned().ok_or(SourceError::EmptyCatalog)
    }
}

/// Reads the explanation already stored on each record.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedExplanations;

#[async_trait]
impl ExplanationSource for EmbeddedExplanations {
    fn name(&self) -> &str {
        "embedded"
    }

    async fn explain(&self, book: &BookRecord) -> Result<String, SourceError> {
        book.explanation
            .clone()
            .filter(|text| !text.is_empty())
            .ok_or(SourceError::MissingExplanation(book.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DATASET: &str = r#"[
        {"title": "Maus", "image_url": "maus.jpg", "explanation": "A survivor's story."},
        {"title": "Persepolis", "image_url": "persepolis.jpg", "explanation": "Growing up in Tehran."},
        {"title": "Watchmen", "image_url": "watchmen.jpg", "total": 0}
    ]"#;

    #[test]
    fn positions_are_rewritten() {
        let catalog = PreloadedCatalog::from_json(DATASET).unwrap();
        assert_eq!(catalog.len(), 3);
        let watchmen = catalog.get(2).unwrap();
        assert_eq!(watchmen.index, 2);
        assert_eq!(watchmen.total, 3);
    }

    #[tokio::test]
    async fn index_wraps_around() {
        let catalog = PreloadedCatalog::from_json(DATASET).unwrap();
        let book = catalog.book(4).await.unwrap();
        assert_eq!(book.index, 1);
        assert_eq!(book.title, "Persepolis");
    }

    #[tokio::test]
    async fn empty_catalog_yields_error() {
        let catalog = PreloadedCatalog::from_json("[]").unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.book(0).await.unwrap_err(), SourceError::EmptyCatalog);
    }

    #[test]
    fn malformed_dataset_is_decode_error() {
        let err = PreloadedCatalog::from_json("{\"title\": 1}").unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[tokio::test]
    async fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DATASET.as_bytes()).unwrap();

        let catalog = PreloadedCatalog::load(file.path()).await.unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PreloadedCatalog::load(dir.path().join("books.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }

    #[tokio::test]
    async fn embedded_explanations() {
        let catalog = PreloadedCatalog::from_json(DATASET).unwrap();
        let maus = catalog.book(0).await.unwrap();
        assert_eq!(
            EmbeddedExplanations.explain(&maus).await.unwrap(),
            "A survivor's story."
        );

        let watchmen = catalog.book(2).await.unwrap();
        assert_eq!(
            EmbeddedExplanations.explain(&watchmen).await.unwrap_err(),
            SourceError::MissingExplanation(2)
        );
    }
}
