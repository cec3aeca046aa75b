//! # documenter-settings
//!
//! Layered configuration for the document governance engine.
//!
//! Settings are loaded from four layers (in priority order):
//! 1. **Compiled defaults**: [`DocumenterSettings::default()`]
//! 2. **Settings file**: `~/.documenter/settings.json`, merged key-by-key over defaults
//! 3. **`DOCUMENTER_*` environment**: nested keys separated by `__`
//!    (e.g. `DOCUMENTER_BUDGET__MONTHLY_BUDGET=75`)
//! 4. **Legacy environment**: `MONTHLY_BUDGET` and `OPENAI_MODEL`, parsed strictly
//!
//! There is no global settings singleton. The process entry point loads a
//! [`DocumenterSettings`] value once and hands the relevant sections to each
//! component it constructs.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path, settings_path};
pub use types::*;
