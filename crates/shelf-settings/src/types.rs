//! Settings type definitions.
//!
//! Field names are camelCase on the wire. Every section is
//! `#[serde(default)]`, so a partial file only overrides what it names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root settings type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShelfSettings {
    pub source: SourceSettings,
    pub navigator: NavigatorSettings,
    pub display: DisplaySettings,
    pub logging: LoggingSettings,
}

/// Where books and explanations come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Fetch each book and explanation lazily over HTTP.
    #[default]
    Remote,
    /// Load one JSON dataset with embedded explanations at startup.
    Preloaded,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub base_url: String,
    pub dataset_path: String,
    pub request_timeout_ms: u64,
    /// Warm the next random book in the background. Unset means "on for
    /// remote, off for preloaded".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetch: Option<bool>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            kind: SourceKind::Remote,
            base_url: "http://127.0.0.1:8000".to_string(),
            dataset_path: "books.json".to_string(),
            request_timeout_ms: 30_000,
            prefetch: None,
        }
    }
}

impl SourceSettings {
    pub fn prefetch_enabled(&self) -> bool {
        self.prefetch.unwrap_or(self.kind == SourceKind::Remote)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigatorSettings {
    pub start_index: usize,
    /// Fixed RNG seed for reproducible sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Text shown while loading and on failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    pub loading_title: String,
    pub loading_description: String,
    pub pending_description: String,
    pub fallback_description: String,
    pub dataset_error_message: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            loading_title: "LOADING...".to_string(),
            loading_description: "Loading story...".to_string(),
            pending_description: "Reading the story...".to_string(),
            fallback_description: "Something went wrong while loading the description."
                .to_string(),
            dataset_error_message: "Could not load the book collection.".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
    /// Per-module level overrides, e.g. `{"shelf_engine": "debug"}`.
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            modules: BTreeMap::new(),
        }
    }
}
