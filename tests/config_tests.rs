use std::io::Write;

use sql_review::config::{Config, ReviewConfig, Thresholds};
use tempfile::NamedTempFile;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert!(config.review.database.is_none());
    assert!(config.review.parallel);
    assert!(config.review.disabled.is_empty());
    assert!(config.review.severity.is_empty());
    assert!(config.catalog.row_counts.is_empty());
}

#[test]
fn test_default_thresholds() {
    let thresholds = Thresholds::default();

    assert_eq!(thresholds.small_table_rows, 1);
    assert_eq!(thresholds.max_join_tables, 3);
    assert_eq!(thresholds.max_offset, 1000);
    assert_eq!(thresholds.max_table_indexes, 3);
    assert_eq!(thresholds.large_table_rows, 1_000_000);
}

#[test]
fn test_disabled_lookup_ignores_case() {
    let config = ReviewConfig {
        disabled: vec!["Select-Star".to_string()],
        ..Default::default()
    };

    assert!(config.is_disabled("select-star"));
    assert!(!config.is_disabled("full-scan"));
}

#[test]
fn test_from_toml_full() {
    let config = Config::from_toml(
        r#"
        [review]
        database = "shop"
        parallel = false
        disabled = ["select-star"]

        [review.thresholds]
        max_offset = 500
        large_table_rows = 100000

        [review.severity]
        multi-join = "blocker"

        [catalog.row_counts]
        orders = 2500000
        users = 40000
        "#
    )
    .unwrap();

    assert_eq!(config.review.database.as_deref(), Some("shop"));
    assert!(!config.review.parallel);
    assert_eq!(config.review.disabled, vec!["select-star"]);
    assert_eq!(config.review.thresholds.max_offset, 500);
    assert_eq!(config.review.thresholds.large_table_rows, 100_000);
    assert_eq!(config.review.thresholds.max_join_tables, 3);
    assert_eq!(
        config.review.severity.get("multi-join").map(String::as_str),
        Some("blocker")
    );
    assert_eq!(config.catalog.row_counts.get("orders"), Some(&2_500_000));
}

#[test]
fn test_from_toml_empty() {
    let config = Config::from_toml("").unwrap();

    assert_eq!(config.review.thresholds, Thresholds::default());
    assert!(config.review.parallel);
}

#[test]
fn test_from_toml_invalid() {
    assert!(Config::from_toml("[review\nparallel = ").is_err());
    assert!(Config::from_toml("[review]\nparallel = \"yes\"").is_err());
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[review.thresholds]\nmax_join_tables = 5").unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.review.thresholds.max_join_tables, 5);
}

#[test]
fn test_from_file_missing() {
    let result = Config::from_file(std::path::Path::new("/nonexistent/config.toml"));
    assert!(result.is_err());
}
