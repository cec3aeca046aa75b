//! Settings loading with layered providers and legacy environment overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`DocumenterSettings::default()`]
//! 2. Merge the JSON settings file if it exists (missing file is not an error)
//! 3. Merge `DOCUMENTER_*` environment variables (`__` separates nested keys)
//! 4. Apply the legacy `MONTHLY_BUDGET` / `OPENAI_MODEL` overrides
//! 5. Validate the result

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized};
use tracing::debug;

use crate::errors::Result;
use crate::types::DocumenterSettings;

/// Prefix for structured environment overrides.
pub const ENV_PREFIX: &str = "DOCUMENTER_";

/// Resolve the default settings file path (`~/.documenter/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".documenter").join("settings.json")
}

/// Load settings from the default path.
pub fn load_settings() -> Result<DocumenterSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific file, then apply environment overrides.
///
/// A missing file yields defaults. Malformed JSON, a type mismatch, or a
/// value that fails [`DocumenterSettings::validate`] is an error.
pub fn load_settings_from_path(path: &Path) -> Result<DocumenterSettings> {
    debug!(?path, exists = path.exists(), "loading settings");

    let mut settings: DocumenterSettings =
        Figment::from(Serialized::defaults(DocumenterSettings::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

    apply_legacy_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Apply the environment variables the original deployment scripts used.
///
/// Invalid values are ignored with a warning (falling back to file/default).
pub fn apply_legacy_env_overrides(settings: &mut DocumenterSettings) {
    if let Some(v) = read_env_f64("MONTHLY_BUDGET", f64::MIN_POSITIVE, 1.0e9) {
        settings.budget.monthly_budget = v;
    }
    if let Some(v) = read_env_string("OPENAI_MODEL") {
        settings.generation.model = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as an `f64` within an inclusive range.
pub fn parse_f64_range(val: &str, min: f64, max: f64) -> Option<f64> {
    let n: f64 = val.trim().parse().ok()?;
    (n.is_finite() && n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn read_env_f64(name: &str, min: f64, max: f64) -> Option<f64> {
    let val = std::env::var(name).ok()?;
    let result = parse_f64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid numeric env var, ignoring");
    }
    result
}
