// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use sql_review::{
    app::StatementReview,
    output::{OutputFormat, OutputOptions, ReviewSummary, format_review, format_rules},
    rules::{ReviewEngine, ReviewReport, Severity, Suggestion}
};

fn plain(format: OutputFormat) -> OutputOptions {
    OutputOptions {
        format,
        colored: false,
        verbose: false
    }
}

fn sample_reviews() -> Vec<StatementReview> {
    vec![
        StatementReview {
            index:  1,
            kind:   "SELECT",
            sql:    "SELECT * FROM users WHERE email = NULL".to_string(),
            report: ReviewReport {
                suggestions:  vec![
                    Suggestion {
                        rule_id:  "null-comparison",
                        severity: Severity::Blocker,
                        detail:   "use IS NULL".to_string()
                    },
                    Suggestion {
                        rule_id:  "select-star",
                        severity: Severity::Minor,
                        detail:   "list the columns".to_string()
                    }
                ],
                rules_run:    17,
                failed_rules: vec![]
            }
        },
        StatementReview {
            index:  2,
            kind:   "INSERT",
            sql:    "INSERT INTO users (id) VALUES (1)".to_string(),
            report: ReviewReport {
                suggestions:  vec![],
                rules_run:    17,
                failed_rules: vec!["broken-rule"]
            }
        }
    ]
}

#[test]
fn test_output_format_default() {
    let format = OutputFormat::default();
    assert!(matches!(format, OutputFormat::Text));
}

#[test]
fn test_output_options_default() {
    let opts = OutputOptions::default();
    assert!(matches!(opts.format, OutputFormat::Text));
    assert!(opts.colored);
    assert!(!opts.verbose);
}

#[test]
fn test_summary_totals() {
    let summary = ReviewSummary::from_reviews(&sample_reviews());
    assert_eq!(
        summary,
        ReviewSummary {
            statements: 2,
            blocker:    1,
            critical:   0,
            minor:      1
        }
    );
}

#[test]
fn test_format_text() {
    let output = format_review(&sample_reviews(), &plain(OutputFormat::Text)).unwrap();

    assert!(output.contains("Statement #1 (SELECT):"));
    assert!(output.contains("  [BLOCKER] null-comparison: use IS NULL"));
    assert!(output.contains("  [MINOR] select-star: list the columns"));
    assert!(output.contains("Statement #2 (INSERT):"));
    assert!(output.contains("  no issues"));
    assert!(output.contains("broken-rule"));
    assert!(output.contains("Summary: 2 statement(s), 1 blocker, 0 critical, 1 minor"));
    assert!(!output.contains("rules run"));
}

#[test]
fn test_format_text_verbose() {
    let opts = OutputOptions {
        verbose: true,
        ..plain(OutputFormat::Text)
    };
    let output = format_review(&sample_reviews(), &opts).unwrap();

    assert!(output.contains("SELECT * FROM users WHERE email = NULL"));
    assert!(output.contains("rules run: 17"));
}

#[test]
fn test_format_text_blocker_before_minor() {
    let output = format_review(&sample_reviews(), &plain(OutputFormat::Text)).unwrap();
    let blocker = output.find("[BLOCKER]").unwrap();
    let minor = output.find("[MINOR]").unwrap();
    assert!(blocker < minor);
}

#[test]
fn test_format_json() {
    let output = format_review(&sample_reviews(), &plain(OutputFormat::Json)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["summary"]["statements"], 2);
    assert_eq!(value["summary"]["blocker"], 1);
    assert_eq!(value["statements"][0]["index"], 1);
    assert_eq!(value["statements"][0]["kind"], "SELECT");
    assert_eq!(
        value["statements"][0]["suggestions"][0]["rule_id"],
        "null-comparison"
    );
    assert_eq!(value["statements"][1]["failed_rules"][0], "broken-rule");
}

#[test]
fn test_format_yaml() {
    let output = format_review(&sample_reviews(), &plain(OutputFormat::Yaml)).unwrap();

    assert!(output.contains("statements:"));
    assert!(output.contains("summary:"));
    assert!(output.contains("rule_id: null-comparison"));
}

#[test]
fn test_format_empty_script() {
    let output = format_review(&[], &plain(OutputFormat::Text)).unwrap();
    assert!(output.contains("Summary: 0 statement(s), 0 blocker, 0 critical, 0 minor"));
}

#[test]
fn test_format_rules_table() {
    let rules = ReviewEngine::new().rules();
    let output = format_rules(&rules, false);

    assert!(output.starts_with("17 enabled rule(s):"));
    assert!(output.contains("full-scan"));
    assert!(output.contains("drop-index-verification"));
    assert_eq!(output.lines().count(), 18);
}

#[test]
fn test_format_colored_keeps_content() {
    let opts = OutputOptions {
        colored: true,
        ..plain(OutputFormat::Text)
    };
    let output = format_review(&sample_reviews(), &opts).unwrap();
    assert!(output.contains("null-comparison"));
    assert!(output.contains("BLOCKER"));
}
