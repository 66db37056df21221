//! Application types for CLI commands.

use serde::Serialize;

use crate::{
    cli::{Dialect, Format},
    rules::ReviewReport
};

/// Parameters for the review command.
///
/// # Example
///
/// ```
/// use sql_review::{
///     app::ReviewParams,
///     cli::{Dialect, Format}
/// };
///
/// let params = ReviewParams {
///     schema_path:   "schema.sql".to_string(),
///     queries_path:  "queries.sql".to_string(),
///     dialect:       Dialect::Mysql,
///     database:      Some("shop".to_string()),
///     rows:          vec!["orders=2500000".to_string()],
///     output_format: Format::Text,
///     verbose:       false,
///     no_color:      true
/// };
/// assert_eq!(params.rows.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ReviewParams {
    /// Path to the SQL schema file containing table definitions.
    pub schema_path:   String,
    /// Path to statements file or "-" for stdin input.
    pub queries_path:  String,
    pub dialect:       Dialect,
    /// Current database; overrides the configured one when set.
    pub database:      Option<String>,
    /// Raw `TABLE=ROWS` overrides from the command line.
    pub rows:          Vec<String>,
    pub output_format: Format,
    pub verbose:       bool,
    pub no_color:      bool
}

/// Review of one statement of the input script.
#[derive(Debug, Clone, Serialize)]
pub struct StatementReview {
    /// 1-based position in the script
    pub index:  usize,
    /// Statement kind tag (`SELECT`, `ALTER TABLE`, ...)
    pub kind:   &'static str,
    pub sql:    String,
    #[serde(flatten)]
    pub report: ReviewReport
}

/// Result of the review command.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    /// Exit code based on the most severe suggestion (0, 1, or 2).
    pub exit_code: i32,
    /// Rendered report.
    pub output:    String,
    pub reviews:   Vec<StatementReview>
}
