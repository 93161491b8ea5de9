//! Field configuration module.
//!
//! Handles loading, validating, and merging `profile-photo.toml`. Stock
//! defaults are the base layer; a user file only needs the keys it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [crop]
//! mode = "required"          # "required" | "optional"
//!
//! [form]
//! file_field = "image"       # Name of the multipart file field
//! delete_field = "delete_image"  # Name of the boolean delete-intent field
//!
//! [processing]
//! max_processes = 4          # Max parallel workers for `batch` (omit for auto)
//! ```
//!
//! ## Crop Mode
//!
//! In `required` mode a file that cannot be opened in the crop editor is
//! reported and discarded. In `optional` mode the validated file is committed
//! to the form as-is instead, so a profile can still get a photo when the
//! editor is unavailable for that file.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE: &str = "profile-photo.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Field configuration loaded from `profile-photo.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldConfig {
    /// Crop editor policy.
    pub crop: CropConfig,
    /// Names of the submitted form fields.
    pub form: FormConfig,
    /// Parallel processing settings (CLI batch mode).
    pub processing: ProcessingConfig,
}

impl FieldConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("form.file_field", &self.form.file_field),
            ("form.delete_field", &self.form.delete_field),
        ];
        for (key, name) in names {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.form.file_field == self.form.delete_field {
            return Err(ConfigError::Validation(
                "form.file_field and form.delete_field must differ".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Whether a file must pass through the crop editor before it is committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropMode {
    #[default]
    Required,
    /// Commit the raw validated file when the editor cannot open it.
    Optional,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    pub mode: CropMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormConfig {
    pub file_field: String,
    pub delete_field: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            file_field: "image".into(),
            delete_field: "delete_image".into(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(FieldConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` when it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<FieldConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: FieldConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `profile-photo.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<FieldConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILE))
}

/// Like [`load_config`], for an explicit file path.
pub fn load_config_file(path: &Path) -> Result<FieldConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(path = %path.display(), ?config, "config resolved");
    Ok(config)
}

/// Returns a fully-commented stock `profile-photo.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Profile Photo Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Crop editor
# ---------------------------------------------------------------------------
[crop]
# "required": every file goes through the square crop editor and is
#             re-encoded as a 2048x2048 JPEG. Files the editor cannot open
#             are reported and discarded.
# "optional": files the editor cannot open are committed unchanged.
mode = "required"

# ---------------------------------------------------------------------------
# Form fields read by the server on submission
# ---------------------------------------------------------------------------
[form]
# Multipart file field holding the (single) uploaded image.
file_field = "image"
# Boolean field set when the user removes the current image.
delete_field = "delete_image"

# ---------------------------------------------------------------------------
# Parallel processing (batch command)
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers. Omit for auto (= number of CPU cores).
# Values above the core count are clamped down.
# max_processes = 4
"##
}
