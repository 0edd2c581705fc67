//! # shelf-settings
//!
//! Layered configuration for the shelf browser.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`ShelfSettings::default()`]
//! 2. **User file** — `~/.shelf/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `SHELF_*` overrides (highest priority)
//!
//! There is no global instance: the binary loads settings once, applies its
//! command-line flags on top, validates, and passes them down explicitly.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    deep_merge, load_settings, load_settings_from_path, settings_path, validate, LoadedSettings,
    RejectedOverride,
};
pub use types::*;
