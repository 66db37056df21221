//! Helper functions for CLI operations.
//!
//! Reading input, building the catalog with row-count statistics, and
//! deriving the process exit code.

use std::{
    collections::HashMap,
    fs::read_to_string,
    io::{self, Read}
};

use super::{convert::convert_format, types::StatementReview};
use crate::{
    catalog::InMemoryCatalog,
    cli::Format,
    error::{AppResult, file_read_error, row_count_error},
    output::OutputOptions,
    parse::SqlDialect,
    rules::Severity
};

/// Calculates the process exit code from the most severe suggestion.
///
/// - `0` - No suggestions or only minor ones
/// - `1` - At least one critical suggestion
/// - `2` - At least one blocker
///
/// # Example
///
/// ```
/// use sql_review::app::calculate_exit_code;
///
/// assert_eq!(calculate_exit_code(&[]), 0);
/// ```
pub fn calculate_exit_code(reviews: &[StatementReview]) -> i32 {
    let worst = reviews
        .iter()
        .filter_map(|review| review.report.max_severity())
        .min();
    match worst {
        Some(Severity::Blocker) => 2,
        Some(Severity::Critical) => 1,
        Some(Severity::Minor) | None => 0
    }
}

/// Reads SQL statements from a file or stdin.
///
/// Reads standard input when the path is "-".
///
/// # Errors
///
/// Returns an error if the file cannot be read or stdin fails.
pub fn read_queries_input(path: &str) -> AppResult<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| file_read_error("stdin", e))?;
        Ok(buffer)
    } else {
        read_to_string(path).map_err(|e| file_read_error(path, e))
    }
}

/// Parses `TABLE=ROWS` arguments.
///
/// # Errors
///
/// Returns an error for a missing `=`, an empty table name or a row count
/// that is not a non-negative integer.
///
/// # Example
///
/// ```
/// use sql_review::app::parse_row_overrides;
///
/// let rows = parse_row_overrides(&["orders=2500000".to_string()]).unwrap();
/// assert_eq!(rows, vec![("orders".to_string(), 2_500_000)]);
/// ```
pub fn parse_row_overrides(raw: &[String]) -> AppResult<Vec<(String, u64)>> {
    raw.iter()
        .map(|entry| {
            let (table, rows) = entry.split_once('=').ok_or_else(|| row_count_error(entry))?;
            let table = table.trim();
            if table.is_empty() {
                return Err(row_count_error(entry));
            }
            let rows = rows
                .trim()
                .replace('_', "")
                .parse::<u64>()
                .map_err(|_| row_count_error(entry))?;
            Ok((table.to_string(), rows))
        })
        .collect()
}

/// Builds the catalog from schema DDL and attaches row counts.
///
/// Configured counts are applied first, command-line overrides last. Counts
/// for tables missing from the schema are logged and ignored.
///
/// # Errors
///
/// Returns an error if the schema cannot be parsed.
pub fn build_catalog(
    schema_sql: &str,
    dialect: SqlDialect,
    configured: &HashMap<String, u64>,
    overrides: &[(String, u64)]
) -> AppResult<InMemoryCatalog> {
    let mut catalog = InMemoryCatalog::from_ddl(schema_sql, dialect)?;
    let mut configured: Vec<(&String, &u64)> = configured.iter().collect();
    configured.sort();
    let all = configured
        .into_iter()
        .map(|(table, rows)| (table.as_str(), *rows))
        .chain(overrides.iter().map(|(table, rows)| (table.as_str(), *rows)));
    for (table, rows) in all {
        if !catalog.set_row_count(table, rows) {
            tracing::warn!(table, rows, "row count given for a table missing from the schema");
        }
    }
    tracing::debug!(tables = catalog.len(), "catalog built");
    Ok(catalog)
}

/// Creates output options from CLI parameters.
pub fn create_output_options(format: Format, no_color: bool, verbose: bool) -> OutputOptions {
    OutputOptions {
        format: convert_format(format),
        colored: !no_color,
        verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::SchemaCatalog,
        output::OutputFormat,
        rules::{ReviewReport, Suggestion}
    };

    fn review_with(severity: Severity) -> StatementReview {
        StatementReview {
            index:  1,
            kind:   "SELECT",
            sql:    "SELECT 1".to_string(),
            report: ReviewReport {
                suggestions:  vec![Suggestion {
                    rule_id: "select-star",
                    severity,
                    detail: "detail".to_string()
                }],
                rules_run:    1,
                failed_rules: vec![]
            }
        }
    }

    #[test]
    fn test_exit_code_by_severity() {
        assert_eq!(calculate_exit_code(&[review_with(Severity::Minor)]), 0);
        assert_eq!(calculate_exit_code(&[review_with(Severity::Critical)]), 1);
        assert_eq!(
            calculate_exit_code(&[
                review_with(Severity::Minor),
                review_with(Severity::Blocker)
            ]),
            2
        );
    }

    #[test]
    fn test_parse_row_overrides_valid() {
        let rows = parse_row_overrides(&[" users = 1_000 ".to_string()]).unwrap();
        assert_eq!(rows, vec![("users".to_string(), 1000)]);
    }

    #[test]
    fn test_parse_row_overrides_invalid() {
        assert!(parse_row_overrides(&["users".to_string()]).is_err());
        assert!(parse_row_overrides(&["=10".to_string()]).is_err());
        assert!(parse_row_overrides(&["users=-1".to_string()]).is_err());
        assert!(parse_row_overrides(&["users=many".to_string()]).is_err());
    }

    #[test]
    fn test_build_catalog_override_wins() {
        let mut configured = HashMap::new();
        configured.insert("users".to_string(), 10);
        configured.insert("ghost".to_string(), 5);
        let catalog = build_catalog(
            "CREATE TABLE users (id INT PRIMARY KEY)",
            SqlDialect::Generic,
            &configured,
            &[("users".to_string(), 20)]
        )
        .unwrap();
        assert_eq!(catalog.find_table("users").unwrap().row_count, Some(20));
        assert!(catalog.find_table("ghost").is_none());
    }

    #[test]
    fn test_read_queries_input_missing_file() {
        assert!(read_queries_input("/nonexistent/queries.sql").is_err());
    }

    #[test]
    fn test_create_output_options() {
        let opts = create_output_options(Format::Yaml, true, false);
        assert!(matches!(opts.format, OutputFormat::Yaml));
        assert!(!opts.colored);
    }
}
