use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use shelf_core::{BookRecord, BookSource, ExplanationSource, SourceError};

const USER_AGENT: &str = "shelf/0.1";

/// HTTP catalog serving `/api/book/{index}` and `/api/explain`.
///
/// One client is shared by both capabilities, so the same value can be
/// handed to the navigator as its book source and its explanation source.
pub struct RemoteCatalog {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ExplainResponse {
    description: String,
}

impl RemoteCatalog {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SourceError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn book_url(&self, index: usize) -> String {
        format!("{}/api/book/{index}", self.base_url)
    }

    fn explain_url(&self) -> String {
        format!("{}/api/explain", self.base_url)
    }

    /// Query parameters for an explanation request. Absent and empty values
    /// are left out, as is a zero `page_per_cost`.
    pub fn explain_query(book: &BookRecord) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(original) = book.original_title.as_deref().filter(|s| !s.is_empty()) {
            params.push(("original_title", original.to_string()));
        }
        if !book.title.is_empty() {
            params.push(("title", book.title.clone()));
        }
        if let Some(status) = book.stock_status.as_deref().filter(|s| !s.is_empty()) {
            params.push(("stock_status", status.to_string()));
        }
        if let Some(ppc) = book.page_per_cost.as_ref().filter(|p| p.is_present()) {
            params.push(("page_per_cost", ppc.to_string()));
        }
        params
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SourceError> {
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::from_status(status.as_u16(), body));
        }

        response.json::<T>().await.map_err(map_reqwest_error)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> SourceError {
    if e.is_decode() {
        SourceError::Decode(e.to_string())
    } else {
        SourceError::Network(e.to_string())
    }
}

#[async_trait]
impl BookSource for RemoteCatalog {
    fn name(&self) -> &str {
        "remote"
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn book(&self, index: usize) -> Result<BookRecord, SourceError> {
        let book: BookRecord = self.get_json(self.client.get(self.book_url(index))).await?;
        debug!(requested = index, resolved = book.index, total = book.total, "fetched book");
        Ok(book)
    }
}

#[async_trait]
impl ExplanationSource for RemoteCatalog {
    fn name(&self) -> &str {
        "remote"
    }

    #[instrument(skip(self, book), fields(index = book.index))]
    async fn explain(&self, book: &BookRecord) -> Result<String, SourceError> {
        let request = self
            .client
            .get(self.explain_url())
            .query(&Self::explain_query(book));
        let response: ExplainResponse = self.get_json(request).await?;
        Ok(response.description)
    }
}
