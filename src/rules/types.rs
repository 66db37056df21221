//! Type definitions for the review rule system.
//!
//! - [`Severity`] - Suggestion severity levels (Blocker, Critical, Minor)
//! - [`RuleCategory`] - What a rule looks at
//! - [`Suggestion`] - One actionable finding
//! - [`ReviewReport`] - Outcome of reviewing one statement

use serde::Serialize;

/// Severity level of a suggestion.
///
/// Ordered from most to least severe; reports are sorted ascending so that
/// blockers come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    /// Statement must not run as written (exit code 2)
    Blocker,
    /// Likely production incident or heavy load (exit code 1)
    Critical,
    /// Quality issue, does not affect exit code
    Minor
}

impl Severity {
    /// Parse a configuration value (`blocker`, `critical`, `minor`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "blocker" => Some(Self::Blocker),
            "critical" => Some(Self::Critical),
            "minor" => Some(Self::Minor),
            _ => None
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocker => write!(f, "BLOCKER"),
            Self::Critical => write!(f, "CRITICAL"),
            Self::Minor => write!(f, "MINOR")
        }
    }
}

/// Category of a rule for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleCategory {
    /// Query shapes that read too much or page badly
    Performance,
    /// Predicates that are wrong or defeat indexes
    Correctness,
    /// Table design in CREATE TABLE
    Schema,
    /// Schema changes on live tables
    Migration
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Performance => write!(f, "Performance"),
            Self::Correctness => write!(f, "Correctness"),
            Self::Schema => write!(f, "Schema"),
            Self::Migration => write!(f, "Migration")
        }
    }
}

/// Metadata about a rule for identification and configuration.
#[derive(Debug, Clone, Copy)]
pub struct RuleInfo {
    /// Stable rule identifier (e.g., "full-scan")
    pub id:       &'static str,
    /// Human-readable rule name
    pub name:     &'static str,
    /// Default severity level
    pub severity: Severity,
    pub category: RuleCategory
}

impl RuleInfo {
    /// Build a suggestion carrying this rule's id and default severity
    pub fn suggest(&self, detail: impl Into<String>) -> Suggestion {
        Suggestion {
            rule_id:  self.id,
            severity: self.severity,
            detail:   detail.into()
        }
    }
}

/// A single finding produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub rule_id:  &'static str,
    pub severity: Severity,
    /// Human-readable explanation naming the offending objects
    pub detail:   String
}

/// Outcome of reviewing one statement.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewReport {
    /// Ranked suggestions, blockers first
    pub suggestions:  Vec<Suggestion>,
    /// Number of rules evaluated
    pub rules_run:    usize,
    /// Rules that panicked and were skipped
    pub failed_rules: Vec<&'static str>
}

impl ReviewReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.suggestions
            .iter()
            .filter(|s| s.severity == severity)
            .count()
    }

    pub fn blocker_count(&self) -> usize {
        self.count(Severity::Blocker)
    }

    pub fn critical_count(&self) -> usize {
        self.count(Severity::Critical)
    }

    pub fn minor_count(&self) -> usize {
        self.count(Severity::Minor)
    }

    /// Most severe finding, if any
    pub fn max_severity(&self) -> Option<Severity> {
        self.suggestions.iter().map(|s| s.severity).min()
    }

    pub fn is_clean(&self) -> bool {
        self.suggestions.is_empty()
    }
}
