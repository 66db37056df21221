//! Review engine for parsed SQL statements.
//!
//! This module provides the rule registry and the engine that evaluates every
//! enabled rule against one statement and a schema catalog. Rules are types
//! implementing the [`Reviewer`] trait.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Statement  │────▶│ ReviewEngine │────▶│ ReviewReport │
//! │  + catalog  │     └──────────────┘     └──────────────┘
//! └─────────────┘            │
//!                     ┌──────┴──────┐
//!                     │  Reviewers  │
//!                     │ (parallel)  │
//!                     └─────────────┘
//! ```
//!
//! The [`ReviewEngine`] evaluates rules on the [`rayon`] pool. A rule that
//! panics is logged, listed in [`ReviewReport::failed_rules`] and skipped.
//! Findings are ranked by severity (blockers first); equal severities keep
//! rule registration order.
//!
//! # Rules
//!
//! | ID | Severity | Trigger |
//! |----|----------|---------|
//! | `full-scan` | Critical | SELECT on a non-trivial table without a usable WHERE |
//! | `select-star` | Minor | `SELECT *` / `t.*` |
//! | `multi-join` | Critical | Too many tables in one SELECT |
//! | `limit-without-order` | Minor | LIMIT without ORDER BY |
//! | `deep-offset` | Critical | Large literal OFFSET |
//! | `having-to-where` | Critical | HAVING on non-aggregated columns |
//! | `null-comparison` | Blocker | `= NULL` / `<> NULL` |
//! | `implicit-type-conversion` | Blocker | Indexed column compared with a literal of another type |
//! | `field-arithmetic` | Blocker | Arithmetic on a column inside a comparison |
//! | `missing-primary-key` | Blocker | CREATE TABLE without a primary key |
//! | `too-many-indexes` | Minor | Too many secondary indexes in CREATE TABLE |
//! | `oversized-field-type` | Minor | TEXT/BLOB columns |
//! | `avoid-foreign-key` | Critical | Foreign key constraints |
//! | `risky-type-change` | Critical | Column type change |
//! | `add-column-large-table` | Critical | ADD COLUMN on a large table |
//! | `drop-column-with-index` | Critical | DROP COLUMN of an indexed column |
//! | `drop-index-verification` | Critical | DROP INDEX |
//!
//! # Configuration
//!
//! ```toml
//! [review]
//! disabled = ["select-star"]
//!
//! [review.severity]
//! limit-without-order = "critical"
//! ```
//!
//! # Implementing Custom Rules
//!
//! ```
//! use sql_review::{
//!     ast::Statement,
//!     context::ReviewContext,
//!     rules::{Reviewer, RuleCategory, RuleInfo, Severity, Suggestion}
//! };
//!
//! pub struct NoTruncate;
//!
//! impl Reviewer for NoTruncate {
//!     fn info(&self) -> RuleInfo {
//!         RuleInfo {
//!             id:       "no-truncate",
//!             name:     "TRUNCATE is not reviewed",
//!             severity: Severity::Critical,
//!             category: RuleCategory::Migration
//!         }
//!     }
//!
//!     fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
//!         match ctx.statement {
//!             Statement::Other(sql) if sql.starts_with("TRUNCATE") => {
//!                 vec![self.info().suggest("TRUNCATE removes every row")]
//!             }
//!             _ => vec![]
//!         }
//!     }
//! }
//! ```

mod alter;
mod create_table;
mod predicate;
mod query;
mod types;

use std::{
    collections::HashMap,
    panic::{self, AssertUnwindSafe}
};

use rayon::prelude::*;
pub use types::{ReviewReport, RuleCategory, RuleInfo, Severity, Suggestion};

use crate::{
    ast::Statement, catalog::SchemaCatalog, config::ReviewConfig, context::ReviewContext
};

/// A single review rule.
///
/// Rules are pure: they read the context, never mutate it, and return an
/// empty list for statements outside their scope. They must be
/// `Send + Sync` for parallel evaluation.
pub trait Reviewer: Send + Sync {
    /// Returns metadata about this rule.
    fn info(&self) -> RuleInfo;

    /// Inspects the statement in `ctx` and returns any findings.
    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion>;
}

/// Built-in rules in registration order
pub fn default_rules() -> Vec<Box<dyn Reviewer>> {
    vec![
        Box::new(query::FullScan),
        Box::new(query::SelectStar),
        Box::new(query::MultiJoin),
        Box::new(query::LimitWithoutOrder),
        Box::new(query::DeepOffset),
        Box::new(query::HavingToWhere),
        Box::new(predicate::NullComparison),
        Box::new(predicate::ImplicitTypeConversion),
        Box::new(predicate::FieldArithmetic),
        Box::new(create_table::MissingPrimaryKey),
        Box::new(create_table::TooManyIndexes),
        Box::new(create_table::OversizedFieldType),
        Box::new(create_table::AvoidForeignKey),
        Box::new(alter::RiskyTypeChange),
        Box::new(alter::AddColumnLargeTable),
        Box::new(alter::DropColumnWithIndex),
        Box::new(alter::DropIndexVerification),
    ]
}

/// Rule registry and evaluator.
///
/// # Example
///
/// ```
/// use sql_review::{
///     catalog::InMemoryCatalog,
///     parse::{SqlDialect, parse_statement},
///     rules::{ReviewEngine, Severity}
/// };
///
/// let catalog = InMemoryCatalog::new();
/// let stmt = parse_statement("CREATE TABLE log (msg TEXT)", SqlDialect::Generic).unwrap();
///
/// let suggestions = ReviewEngine::new().review(&stmt, &catalog);
/// assert_eq!(suggestions[0].rule_id, "missing-primary-key");
/// assert_eq!(suggestions[0].severity, Severity::Blocker);
/// ```
pub struct ReviewEngine {
    rules:          Vec<Box<dyn Reviewer>>,
    config:         ReviewConfig,
    severity_cache: HashMap<&'static str, Severity>
}

impl Default for ReviewEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewEngine {
    /// Create an engine with all built-in rules and default configuration
    pub fn new() -> Self {
        Self::with_config(ReviewConfig::default())
    }

    /// Create an engine with all built-in rules
    pub fn with_config(config: ReviewConfig) -> Self {
        Self::with_rules(default_rules(), config)
    }

    /// Create an engine from an explicit registry
    ///
    /// # Notes
    ///
    /// - Disabled rules are dropped from the registry
    /// - Unknown severity names in overrides are ignored with a warning
    pub fn with_rules(all_rules: Vec<Box<dyn Reviewer>>, config: ReviewConfig) -> Self {
        let rules: Vec<Box<dyn Reviewer>> = all_rules
            .into_iter()
            .filter(|r| !config.is_disabled(r.info().id))
            .collect();
        let mut severity_cache = HashMap::new();
        for rule in &rules {
            let rule_id = rule.info().id;
            let Some(raw) = config.severity.get(rule_id) else {
                continue;
            };
            match Severity::parse(raw) {
                Some(severity) => {
                    severity_cache.insert(rule_id, severity);
                }
                None => {
                    tracing::warn!(rule = rule_id, value = %raw, "unknown severity override ignored");
                }
            }
        }
        Self {
            rules,
            config,
            severity_cache
        }
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Metadata of the enabled rules, in registration order
    pub fn rules(&self) -> Vec<RuleInfo> {
        self.rules.iter().map(|r| r.info()).collect()
    }

    /// Review one statement and return ranked suggestions
    pub fn review(&self, statement: &Statement, catalog: &dyn SchemaCatalog) -> Vec<Suggestion> {
        self.review_report(statement, catalog).suggestions
    }

    /// Review one statement and return the full report
    pub fn review_report(
        &self,
        statement: &Statement,
        catalog: &dyn SchemaCatalog
    ) -> ReviewReport {
        let ctx = ReviewContext::new(statement, catalog, &self.config);
        let outcomes: Vec<Result<Vec<Suggestion>, &'static str>> = if self.config.parallel {
            self.rules
                .par_iter()
                .map(|rule| evaluate_isolated(rule.as_ref(), &ctx))
                .collect()
        } else {
            self.rules
                .iter()
                .map(|rule| evaluate_isolated(rule.as_ref(), &ctx))
                .collect()
        };

        let mut report = ReviewReport {
            rules_run: self.rules.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                Ok(found) => report.suggestions.extend(found),
                Err(rule_id) => report.failed_rules.push(rule_id)
            }
        }
        for suggestion in &mut report.suggestions {
            if let Some(&severity) = self.severity_cache.get(suggestion.rule_id) {
                suggestion.severity = severity;
            }
        }
        report.suggestions.sort_by_key(|s| s.severity);
        report
    }
}

/// Evaluate one rule, turning a panic into an error carrying its id
fn evaluate_isolated(
    rule: &dyn Reviewer,
    ctx: &ReviewContext<'_>
) -> Result<Vec<Suggestion>, &'static str> {
    let rule_id = rule.info().id;
    match panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(ctx))) {
        Ok(found) => {
            tracing::debug!(rule = rule_id, found = found.len(), "rule evaluated");
            Ok(found)
        }
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!(rule = rule_id, %reason, "rule panicked and was skipped");
            Err(rule_id)
        }
    }
}
