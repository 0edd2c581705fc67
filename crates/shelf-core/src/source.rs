use async_trait::async_trait;

use crate::book::BookRecord;
use crate::errors::SourceError;

/// Resolves one book by raw index.
///
/// Implementations wrap the index into the collection themselves and report
/// the resolved position in [`BookRecord::index`].
#[async_trait]
pub trait BookSource: Send + Sync {
    fn name(&self) -> &str;

    async fn book(&self, index: usize) -> Result<BookRecord, SourceError>;
}

/// Produces the descriptive text shown under a book.
#[async_trait]
pub trait ExplanationSource: Send + Sync {
    fn name(&self) -> &str;

    async fn explain(&self, book: &BookRecord) -> Result<String, SourceError>;
}
