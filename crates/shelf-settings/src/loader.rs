//! Builds [`ShelfSettings`] from compiled defaults, the JSON settings file
//! and `SHELF_*` environment variables, in that order.
//!
//! Loading never validates: the binary still has its command-line layer to
//! apply, so it calls [`validate`] once everything is merged. Loading also
//! never logs, because it runs before telemetry exists. What happened is
//! kept on [`LoadedSettings`] and emitted by [`LoadedSettings::report`].

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::{ShelfSettings, SourceKind};

const SETTINGS_DIR: &str = ".shelf";
const SETTINGS_FILE: &str = "settings.json";

/// `$HOME/.shelf/settings.json`, or the same under the temp dir when `HOME`
/// is unset.
pub fn settings_path() -> PathBuf {
    home_dir().join(SETTINGS_DIR).join(SETTINGS_FILE)
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

/// An environment value that failed to parse and was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedOverride {
    pub key: &'static str,
    pub value: String,
}

/// Merged settings and a record of how they were layered.
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: ShelfSettings,
    /// The file that was merged, if one existed.
    pub file: Option<PathBuf>,
    pub rejected: Vec<RejectedOverride>,
}

impl LoadedSettings {
    /// Log the layering outcome. Call after telemetry is initialised.
    pub fn report(&self) {
        match &self.file {
            Some(path) => debug!(?path, "merged settings file"),
            None => debug!("no settings file, using defaults"),
        }
        for rejected in &self.rejected {
            warn!(key = rejected.key, value = %rejected.value, "invalid env var, ignoring");
        }
    }
}

pub fn load_settings() -> Result<LoadedSettings> {
    load_settings_from_path(&settings_path())
}

/// Defaults, then `path` if it exists, then the process environment.
///
/// Fails only on an unreadable file or malformed JSON.
pub fn load_settings_from_path(path: &Path) -> Result<LoadedSettings> {
    let (mut settings, file) = load_file_layer(path)?;
    let rejected = apply_env_overrides(&mut settings);
    Ok(LoadedSettings {
        settings,
        file,
        rejected,
    })
}

fn load_file_layer(path: &Path) -> Result<(ShelfSettings, Option<PathBuf>)> {
    let defaults = serde_json::to_value(ShelfSettings::default())?;
    if !path.exists() {
        return Ok((serde_json::from_value(defaults)?, None));
    }
    let user: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    let settings = serde_json::from_value(deep_merge(defaults, user))?;
    Ok((settings, Some(path.to_path_buf())))
}

/// Overlay `patch` onto `base`.
///
/// Objects merge key by key. A `null` in `patch` leaves `base` alone; any
/// other value in `patch` wins outright, arrays included.
pub fn deep_merge(base: Value, patch: Value) -> Value {
    let (mut base, patch) = match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => (base, patch),
        (_, patch) => return patch,
    };
    for (key, value) in patch.into_iter().filter(|(_, v)| !v.is_null()) {
        let merged = match base.remove(&key) {
            Some(old) => deep_merge(old, value),
            None => value,
        };
        base.insert(key, merged);
    }
    Value::Object(base)
}

/// Reject settings the rest of the program cannot work with.
pub fn validate(settings: &ShelfSettings) -> Result<()> {
    if settings.source.request_timeout_ms == 0 {
        return Err(SettingsError::InvalidValue(
            "source.requestTimeoutMs must be greater than zero".into(),
        ));
    }
    if settings.source.kind == SourceKind::Remote && settings.source.base_url.is_empty() {
        return Err(SettingsError::InvalidValue(
            "source.baseUrl is required for the remote source".into(),
        ));
    }
    if settings.source.kind == SourceKind::Preloaded && settings.source.dataset_path.is_empty() {
        return Err(SettingsError::InvalidValue(
            "source.datasetPath is required for the preloaded source".into(),
        ));
    }
    Ok(())
}

pub fn apply_env_overrides(settings: &mut ShelfSettings) -> Vec<RejectedOverride> {
    apply_overrides(settings, |name| std::env::var(name).ok())
}

/// Apply `SHELF_*` values from `lookup`. Unparseable values leave the
/// setting untouched and are returned.
pub fn apply_overrides<F>(settings: &mut ShelfSettings, lookup: F) -> Vec<RejectedOverride>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env = Overrides {
        lookup,
        rejected: Vec::new(),
    };

    // ── Source ──────────────────────────────────────────────────────
    if let Some(kind) = env.parsed("SHELF_SOURCE", parse_source_kind) {
        settings.source.kind = kind;
    }
    if let Some(v) = env.string("SHELF_BASE_URL") {
        settings.source.base_url = v;
    }
    if let Some(v) = env.string("SHELF_DATASET") {
        settings.source.dataset_path = v;
    }
    if let Some(v) = env.parsed("SHELF_TIMEOUT_MS", |s| parse_u64_range(s, 1, 600_000)) {
        settings.source.request_timeout_ms = v;
    }
    if let Some(v) = env.parsed("SHELF_PREFETCH", parse_bool) {
        settings.source.prefetch = Some(v);
    }

    // ── Navigator ───────────────────────────────────────────────────
    if let Some(v) = env.parsed("SHELF_SEED", |s| s.parse::<u64>().ok()) {
        settings.navigator.seed = Some(v);
    }
    if let Some(v) = env.parsed("SHELF_START_INDEX", |s| s.parse::<usize>().ok()) {
        settings.navigator.start_index = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = env.string("SHELF_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.parsed("SHELF_LOG_JSON", parse_bool) {
        settings.logging.json = v;
    }

    env.rejected
}

struct Overrides<F> {
    lookup: F,
    rejected: Vec<RejectedOverride>,
}

impl<F> Overrides<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Empty values count as unset.
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.is_empty())
    }

    fn parsed<T>(&mut self, key: &'static str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let value = self.string(key)?;
        let parsed = parse(&value);
        if parsed.is_none() {
            self.rejected.push(RejectedOverride { key, value });
        }
        parsed
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

pub fn parse_source_kind(val: &str) -> Option<SourceKind> {
    match val.to_lowercase().as_str() {
        "remote" | "http" => Some(SourceKind::Remote),
        "preloaded" | "static" | "file" => Some(SourceKind::Preloaded),
        _ => None,
    }
}
