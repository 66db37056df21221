use colored::Colorize;
use serde::Serialize;

use crate::{
    app::StatementReview,
    error::{AppResult, output_error},
    rules::{RuleInfo, Severity}
};

/// Output format for results
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool,
    /// Print statement SQL and rule statistics in text output
    pub verbose: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true,
            verbose: false
        }
    }
}

/// Totals over a whole script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub statements: usize,
    pub blocker:    usize,
    pub critical:   usize,
    pub minor:      usize
}

impl ReviewSummary {
    pub fn from_reviews(reviews: &[StatementReview]) -> Self {
        reviews.iter().fold(
            Self {
                statements: reviews.len(),
                ..Default::default()
            },
            |mut acc, review| {
                acc.blocker += review.report.blocker_count();
                acc.critical += review.report.critical_count();
                acc.minor += review.report.minor_count();
                acc
            }
        )
    }
}

/// Serialized document for JSON/YAML output
#[derive(Debug, Serialize)]
pub struct ReviewDocument<'a> {
    pub statements: &'a [StatementReview],
    pub summary:    ReviewSummary
}

/// Render script reviews in the requested format
///
/// # Errors
///
/// Returns an error if JSON or YAML serialization fails
pub fn format_review(reviews: &[StatementReview], opts: &OutputOptions) -> AppResult<String> {
    let document = ReviewDocument {
        statements: reviews,
        summary:    ReviewSummary::from_reviews(reviews)
    };
    match opts.format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&document).map_err(|e| output_error(e.to_string()))
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(&document).map_err(|e| output_error(e.to_string()))
        }
        OutputFormat::Text => Ok(format_text(&document, opts))
    }
}

fn format_text(document: &ReviewDocument<'_>, opts: &OutputOptions) -> String {
    let mut out = String::new();
    for review in document.statements {
        let header = format!("Statement #{} ({}):", review.index, review.kind);
        if opts.colored {
            out.push_str(&header.cyan().bold().to_string());
        } else {
            out.push_str(&header);
        }
        out.push('\n');
        if opts.verbose {
            out.push_str(&format!("  {}\n", review.sql));
            out.push_str(&format!("  rules run: {}\n", review.report.rules_run));
        }
        if review.report.is_clean() {
            out.push_str("  no issues\n");
        }
        for suggestion in &review.report.suggestions {
            out.push_str(&format!(
                "  [{}] {}: {}\n",
                severity_label(suggestion.severity, opts.colored),
                suggestion.rule_id,
                suggestion.detail
            ));
        }
        if !review.report.failed_rules.is_empty() {
            let line = format!(
                "  rules skipped after internal failure: {}",
                review.report.failed_rules.join(", ")
            );
            if opts.colored {
                out.push_str(&line.magenta().to_string());
            } else {
                out.push_str(&line);
            }
            out.push('\n');
        }
        out.push('\n');
    }
    let s = document.summary;
    out.push_str(&format!(
        "Summary: {} statement(s), {} blocker, {} critical, {} minor\n",
        s.statements, s.blocker, s.critical, s.minor
    ));
    out
}

fn severity_label(severity: Severity, colored: bool) -> String {
    let label = severity.to_string();
    if !colored {
        return label;
    }
    match severity {
        Severity::Blocker => label.red().bold().to_string(),
        Severity::Critical => label.yellow().bold().to_string(),
        Severity::Minor => label.blue().to_string()
    }
}

/// Render the rule registry as a table
pub fn format_rules(rules: &[RuleInfo], colored: bool) -> String {
    let width = rules.iter().map(|r| r.id.len()).max().unwrap_or_default();
    let header = format!("{} enabled rule(s):", rules.len());
    let mut out = if colored {
        header.bold().to_string()
    } else {
        header
    };
    out.push('\n');
    for rule in rules {
        out.push_str(&format!(
            "  {:<width$}  {:<8}  {:<11}  {}\n",
            rule.id,
            rule.severity.to_string(),
            rule.category.to_string(),
            rule.name,
            width = width
        ));
    }
    out
}
