//! Workbench configuration via `conform.toml`
//!
//! One file describes a run: who calls the connector, how many instances are
//! sampled per type, how large history pages are, how many test cases run at
//! once, and (optionally) which types to exercise. Values absent from the
//! file fall back to the defaults below.

use conform_core::{StaticTypeCatalog, Timestamp, TypeDescriptor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{HarnessError, HarnessResult};

/// Config file name used when no path is given.
pub const CONFIG_FILE_NAME: &str = "conform.toml";

fn default_user_id() -> String {
    "conformance-workbench".to_string()
}

fn default_instances_per_type() -> usize {
    5
}

fn default_max_page_size() -> usize {
    100
}

fn default_workers() -> usize {
    4
}

/// Workbench configuration loaded from `conform.toml`.
///
/// # Example
///
/// ```toml
/// user_id = "conformance-workbench"
/// instances_per_type = 5
/// max_page_size = 100
/// workers = 4
/// call_timeout_ms = 30000
///
/// [[types]]
/// guid = "0799569f-0c16-4a1f-86d9-e2e89568f7fd"
/// name = "Project"
/// category = "entity"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkbenchConfig {
    /// Calling identity passed to every contract call.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Instances sampled per type by the discovery step.
    #[serde(default = "default_instances_per_type")]
    pub instances_per_type: usize,
    /// Page size of history requests.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    /// Test cases run concurrently.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Per-call timeout; absent means calls are never abandoned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_timeout_ms: Option<u64>,
    /// How far before the run start the historical test cases look.
    #[serde(default)]
    pub history_lookback_ms: u64,
    /// Types to exercise; empty means "ask the connector's catalog".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeDescriptor>,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            instances_per_type: default_instances_per_type(),
            max_page_size: default_max_page_size(),
            workers: default_workers(),
            call_timeout_ms: None,
            history_lookback_ms: 0,
            types: Vec::new(),
        }
    }
}

impl WorkbenchConfig {
    /// Check limits before a run starts.
    ///
    /// # Errors
    ///
    /// Returns an error if any limit is zero or the user id is blank.
    pub fn validate(&self) -> HarnessResult<()> {
        if self.user_id.trim().is_empty() {
            return Err(HarnessError::config("user_id must not be empty"));
        }
        if self.instances_per_type == 0 {
            return Err(HarnessError::config("instances_per_type must be at least 1"));
        }
        if self.max_page_size == 0 {
            return Err(HarnessError::config("max_page_size must be at least 1"));
        }
        if self.workers == 0 {
            return Err(HarnessError::config("workers must be at least 1"));
        }
        if self.call_timeout_ms == Some(0) {
            return Err(HarnessError::config(
                "call_timeout_ms must be positive; omit it to disable timeouts",
            ));
        }
        Ok(())
    }

    /// Per-call timeout as a `Duration`.
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }

    /// As-of time used by historical test cases for a run started at `started`.
    pub fn as_of_time(&self, started: Timestamp) -> Timestamp {
        started.saturating_sub(Duration::from_millis(self.history_lookback_ms))
    }

    /// Catalog over the configured types, `None` when none are listed.
    pub fn type_catalog(&self) -> Option<StaticTypeCatalog> {
        if self.types.is_empty() {
            None
        } else {
            Some(StaticTypeCatalog::new(self.types.clone()))
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Repository connector conformance workbench
#
# Identity passed as the caller on every contract call.
user_id = "conformance-workbench"

# Instances sampled per type by the discovery step.
instances_per_type = 5

# Page size used for history requests.
max_page_size = 100

# Test cases run concurrently. The connector must tolerate concurrent calls.
workers = 4

# Abandon a contract call after this many milliseconds and fail its test case.
# call_timeout_ms = 30000

# Historical test cases read the repository as of (run start - lookback).
history_lookback_ms = 0

# Types to exercise. When none are listed the connector's own catalog is used.
# [[types]]
# guid = "0799569f-0c16-4a1f-86d9-e2e89568f7fd"
# name = "Project"
# category = "entity"
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: WorkbenchConfig = toml::from_str(&content).map_err(|e| {
            HarnessError::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `true` when the file was created.
    pub fn write_default_if_missing(path: &Path) -> HarnessResult<bool> {
        if path.exists() {
            return Ok(false);
        }
        std::fs::write(path, Self::default_toml())?;
        Ok(true)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> HarnessResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HarnessError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
