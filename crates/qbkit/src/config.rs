//! Builder defaults.
//!
//! [`BuilderConfig`] carries the tunables shared by the statement builders. It
//! can be built in code or loaded from a TOML file:
//!
//! ```toml
//! insert_row_limit = 500
//! in_list_limit = 1000
//! track_columns = true
//! max_execution_time_ms = 2000
//! ```

use crate::error::{QbError, QbResult};
use serde::Deserialize;
use std::path::Path;

/// Default number of buffered INSERT rows before an automatic flush.
pub const DEFAULT_INSERT_ROW_LIMIT: usize = 558;

/// Default maximum number of items in a single `IN(...)` list.
pub const DEFAULT_IN_LIST_LIMIT: usize = 1000;

/// Configuration shared by the statement builders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    /// Buffered INSERT rows before `flush` fires.
    pub insert_row_limit: usize,
    /// Items per `IN(...)` group in `where_in` style helpers.
    pub in_list_limit: usize,
    /// Whether INSERT rows are reordered to the declared column list.
    pub track_columns: bool,
    /// SELECT execution time hint in milliseconds. `None` means no hint.
    pub max_execution_time_ms: Option<u64>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            insert_row_limit: DEFAULT_INSERT_ROW_LIMIT,
            in_list_limit: DEFAULT_IN_LIST_LIMIT,
            track_columns: false,
            max_execution_time_ms: None,
        }
    }
}

impl BuilderConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the INSERT buffer threshold.
    pub fn with_insert_row_limit(mut self, limit: usize) -> Self {
        self.insert_row_limit = limit;
        self
    }

    /// Set the `IN(...)` chunk size.
    pub fn with_in_list_limit(mut self, limit: usize) -> Self {
        self.in_list_limit = limit;
        self
    }

    /// Enable or disable INSERT column tracking.
    pub fn with_track_columns(mut self, track: bool) -> Self {
        self.track_columns = track;
        self
    }

    /// Set the SELECT execution time hint.
    pub fn with_max_execution_time_ms(mut self, ms: u64) -> Self {
        self.max_execution_time_ms = if ms == 0 { None } else { Some(ms) };
        self
    }

    /// Reject values the builders cannot work with.
    pub fn validate(&self) -> QbResult<()> {
        if self.insert_row_limit == 0 {
            return Err(QbError::invalid_config(
                "insert_row_limit must be greater than 0",
            ));
        }
        if self.in_list_limit == 0 {
            return Err(QbError::invalid_config(
                "in_list_limit must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> QbResult<Self> {
        let config: BuilderConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> QbResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            QbError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }
}
