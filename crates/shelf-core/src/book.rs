use std::fmt;

use serde::{Deserialize, Serialize};

/// One entry of the collection as returned by a [`BookSource`](crate::BookSource).
///
/// `index` and `total` are authoritative: the navigator trusts them over its
/// own belief about the collection, so `total` may change between calls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default = "unknown_title")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_per_cost: Option<PagePerCost>,
    /// Only present in preloaded datasets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

fn unknown_title() -> String {
    "Unknown Title".to_string()
}

impl BookRecord {
    pub fn new(index: usize, total: usize, title: impl Into<String>) -> Self {
        Self {
            index,
            total,
            title: title.into(),
            original_title: None,
            image_url: String::new(),
            stock_status: None,
            page_per_cost: None,
            explanation: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }

    pub fn with_original_title(mut self, title: impl Into<String>) -> Self {
        self.original_title = Some(title.into());
        self
    }

    pub fn with_stock_status(mut self, status: impl Into<String>) -> Self {
        self.stock_status = Some(status.into());
        self
    }

    pub fn with_page_per_cost(mut self, ppc: PagePerCost) -> Self {
        self.page_per_cost = Some(ppc);
        self
    }

    pub fn with_explanation(mut self, text: impl Into<String>) -> Self {
        self.explanation = Some(text.into());
        self
    }

    /// The title used when asking for an explanation: `original_title` when
    /// it is non-empty, otherwise `title`.
    pub fn lookup_title(&self) -> &str {
        self.original_title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.title)
    }
}

/// Advisory pages-per-price ratio. Datasets carry it as a number, but older
/// exports stored it as text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PagePerCost {
    Number(f64),
    Text(String),
}

impl PagePerCost {
    /// Zero, NaN and empty text count as "no value".
    pub fn is_present(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for PagePerCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}
