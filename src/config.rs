//! Application configuration.
//!
//! DESIGN
//! ======
//! The client ships as a static WASM bundle, so there is no runtime
//! environment to read. The API base is baked in at compile time from the
//! `API_BASE` variable; everything else uses the defaults below.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

const DEFAULT_API_BASE: &str = "http://localhost:8080";

/// Fixed storage keys for the persisted session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKeys {
    pub token: String,
    pub user: String,
    pub settings: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token: "hr_system_token".to_owned(),
            user: "hr_system_user".to_owned(),
            settings: "hr_system_settings".to_owned(),
        }
    }
}

/// Client-wide settings shared through `AppContext`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Backend origin without a trailing slash.
    pub api_base: String,
    /// Upper bound for a single request before it is aborted.
    pub api_timeout: Duration,
    /// Appended to every document title.
    pub app_name: String,
    pub app_version: String,
    pub storage_keys: StorageKeys,
    /// Rows per page for paginated tables.
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            api_timeout: Duration::from_secs(30),
            app_name: "HR System".to_owned(),
            app_version: "1.0.0".to_owned(),
            storage_keys: StorageKeys::default(),
            page_size: 10,
        }
    }
}

impl AppConfig {
    /// Build the configuration, taking `API_BASE` from the build environment
    /// when it was set.
    pub fn from_build_env() -> Self {
        Self::with_api_base(option_env!("API_BASE").unwrap_or(DEFAULT_API_BASE))
    }

    /// Default configuration pointed at `api_base`.
    pub fn with_api_base(api_base: &str) -> Self {
        Self {
            api_base: normalize_api_base(api_base),
            ..Self::default()
        }
    }
}

fn normalize_api_base(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_BASE.to_owned()
    } else {
        trimmed.to_owned()
    }
}
