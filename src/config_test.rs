use super::*;

// =============================================================================
// Defaults
// =============================================================================

#[test]
fn default_timeout_is_thirty_seconds() {
    assert_eq!(AppConfig::default().api_timeout, Duration::from_secs(30));
}

#[test]
fn default_storage_keys_are_distinct() {
    let keys = StorageKeys::default();
    assert_eq!(keys.token, "hr_system_token");
    assert_eq!(keys.user, "hr_system_user");
    assert_eq!(keys.settings, "hr_system_settings");
}

#[test]
fn default_app_name_matches_title_suffix() {
    assert_eq!(AppConfig::default().app_name, "HR System");
}

// =============================================================================
// with_api_base
// =============================================================================

#[test]
fn with_api_base_trims_trailing_slash() {
    let config = AppConfig::with_api_base("https://hr.example.com/");
    assert_eq!(config.api_base, "https://hr.example.com");
}

#[test]
fn with_api_base_blank_falls_back_to_default() {
    let config = AppConfig::with_api_base("   ");
    assert_eq!(config.api_base, "http://localhost:8080");
}

#[test]
fn with_api_base_keeps_other_defaults() {
    let config = AppConfig::with_api_base("http://api");
    assert_eq!(config.page_size, 10);
    assert_eq!(config.storage_keys, StorageKeys::default());
}
