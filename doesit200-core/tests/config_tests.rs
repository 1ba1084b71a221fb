// Tests for config file loading and entry selection

use doesit200_core::config::{
    ConfigEntry, ConfigError, describe_entries, load_entries, select_entry,
};
use doesit200_scanner::ScopePolicy;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_entries_with_defaults() {
    let file = config_file(
        r#"[
            {"url": "https://example.com", "sleep": 5, "depth": 2},
            {"url": "https://example.org"}
        ]"#,
    );

    let entries = load_entries(file.path()).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].sleep, 5);
    assert_eq!(entries[0].depth, 2);
    assert_eq!(entries[1].sleep, 15);
    assert_eq!(entries[1].depth, 1);
    assert!(!entries[1].enforce_domain_wildcards);
}

#[test]
fn test_load_entries_with_domain_wildcards() {
    let file = config_file(
        r#"[{
            "url": "https://example.com",
            "include_domain_wildcards": ["*.example.com", "cdn.net"],
            "enforce_domain_wildcards": true
        }]"#,
    );

    let entries = load_entries(file.path()).unwrap();
    assert_eq!(
        entries[0].include_domain_wildcards,
        vec!["*.example.com".to_string(), "cdn.net".to_string()]
    );
    assert_eq!(entries[0].scope(), ScopePolicy::Restrict);
}

#[test]
fn test_load_entries_missing_file() {
    let result = load_entries(std::path::Path::new("/nonexistent/doesit200/config.json"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_load_entries_invalid_json() {
    let file = config_file("{ this is not json");
    assert!(matches!(
        load_entries(file.path()),
        Err(ConfigError::Json { .. })
    ));
}

#[test]
fn test_load_entries_missing_url_field() {
    let file = config_file(r#"[{"sleep": 3}]"#);
    assert!(matches!(
        load_entries(file.path()),
        Err(ConfigError::Json { .. })
    ));
}

#[test]
fn test_load_entries_empty_array() {
    let file = config_file("[]");
    assert!(matches!(load_entries(file.path()), Err(ConfigError::Empty(_))));
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_select_entry_is_one_based() {
    let entries = vec![ConfigEntry::new("https://a.com"), ConfigEntry::new("https://b.com")];
    assert_eq!(select_entry(&entries, 1).unwrap().url, "https://a.com");
    assert_eq!(select_entry(&entries, 2).unwrap().url, "https://b.com");
}

#[test]
fn test_select_entry_out_of_range() {
    let entries = vec![ConfigEntry::new("https://a.com")];
    assert!(matches!(
        select_entry(&entries, 0),
        Err(ConfigError::InvalidChoice {
            choice: 0,
            available: 1
        })
    ));
    assert!(matches!(
        select_entry(&entries, 2),
        Err(ConfigError::InvalidChoice { choice: 2, .. })
    ));
}

#[test]
fn test_describe_entries() {
    let mut second = ConfigEntry::new("https://b.com");
    second.sleep = 3;
    second.depth = 4;
    let lines = describe_entries(&[ConfigEntry::new("https://a.com"), second]);
    assert_eq!(
        lines,
        vec![
            "1: URL: https://a.com, Sleep: 15 seconds, Depth: 1".to_string(),
            "2: URL: https://b.com, Sleep: 3 seconds, Depth: 4".to_string(),
        ]
    );
}

// ============================================================================
// Conversion
// ============================================================================

#[test]
fn test_into_crawl_config_bare_host() {
    let config = ConfigEntry::new("example.com").into_crawl_config().unwrap();
    assert_eq!(config.root_url().as_str(), "https://example.com/");
    assert_eq!(config.sleep(), Duration::from_secs(15));
    assert_eq!(config.max_depth(), 1);
    assert_eq!(config.scope(), ScopePolicy::FollowAll);
}

#[test]
fn test_into_crawl_config_empty_url() {
    assert!(matches!(
        ConfigEntry::new("   ").into_crawl_config(),
        Err(ConfigError::MissingUrl)
    ));
}
