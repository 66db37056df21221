//! Error constructors for the fallible outer layers.
//!
//! The review core itself is infallible; only file access, SQL parsing and
//! configuration loading produce [`AppError`]s.

pub use masterror::{AppError, AppResult};

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create schema parse error with optional position info
pub fn schema_parse_error(message: impl Into<String>) -> AppError {
    let msg = message.into();
    AppError::bad_request(format_sql_error("Schema parse error", &msg))
}

/// Create query parse error with optional position info
pub fn query_parse_error(message: impl Into<String>) -> AppError {
    let msg = message.into();
    AppError::bad_request(format_sql_error("Query parse error", &msg))
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create error for a malformed `--rows table=N` argument
pub fn row_count_error(raw: &str) -> AppError {
    AppError::bad_request(format!(
        "Invalid row count '{}': expected TABLE=ROWS with a non-negative integer",
        raw
    ))
}

/// Create output serialization error
pub fn output_error(message: impl Into<String>) -> AppError {
    AppError::internal(format!("Failed to render report: {}", message.into()))
}

/// Prefix a parser message, surfacing its position when present
fn format_sql_error(prefix: &str, message: &str) -> String {
    match extract_position(message) {
        Some(pos) => format!(
            "{} at line {}, column {}:\n  {}",
            prefix, pos.line, pos.column, message
        ),
        None => format!("{}:\n  {}", prefix, message)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct SqlPosition {
    line:   usize,
    column: usize
}

/// sqlparser reports positions as "… at Line: X, Column: Y" (older releases
/// omit the second colon).
fn extract_position(message: &str) -> Option<SqlPosition> {
    let line_start = message.find("Line: ")? + "Line: ".len();
    let rest = &message[line_start..];
    let line_end = rest.find(|c: char| !c.is_ascii_digit())?;
    let line = rest[..line_end].parse().ok()?;

    let rest = rest[line_end..].strip_prefix(", Column")?;
    let rest = rest.strip_prefix(':').unwrap_or(rest).trim_start();
    let col_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let column = rest[..col_end].parse().ok()?;

    Some(SqlPosition {
        line,
        column
    })
}
