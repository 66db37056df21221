//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.sql-review.toml` in current directory
//! 4. `~/.config/sql-review/config.toml`
//! 5. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [review]
//! database = "shop"
//! parallel = true
//! disabled = ["select-star"]
//!
//! [review.thresholds]
//! small_table_rows = 1
//! max_join_tables = 3
//! max_offset = 1000
//! max_table_indexes = 3
//! large_table_rows = 1000000
//!
//! [review.severity]
//! limit-without-order = "critical"
//!
//! [catalog.row_counts]
//! orders = 2500000
//! customers = 40000
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SQL_REVIEW_DATABASE` | Current database name used for qualified lookups |

use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf}
};

use serde::Deserialize;

use crate::error::{AppResult, config_error};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub review:  ReviewConfig,
    #[serde(default)]
    pub catalog: CatalogConfig
}

/// Settings consumed by the review engine
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Current database; qualified names with another qualifier are unknown
    pub database:   Option<String>,
    /// Evaluate rules on the rayon pool
    pub parallel:   bool,
    pub thresholds: Thresholds,
    /// Disabled rule IDs
    pub disabled:   Vec<String>,
    /// Severity overrides (rule_id -> "blocker" | "critical" | "minor")
    pub severity:   HashMap<String, String>
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            database:   None,
            parallel:   true,
            thresholds: Thresholds::default(),
            disabled:   Vec::new(),
            severity:   HashMap::new()
        }
    }
}

impl ReviewConfig {
    pub fn is_disabled(&self, rule_id: &str) -> bool {
        self.disabled
            .iter()
            .any(|d| d.eq_ignore_ascii_case(rule_id))
    }
}

/// Numeric limits used by the rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Tables with at most this many rows are never reported as full scans
    pub small_table_rows:  u64,
    /// Maximum tables in one SELECT block
    pub max_join_tables:   usize,
    /// Largest OFFSET accepted without a finding
    pub max_offset:        u64,
    /// Maximum secondary (INDEX/KEY/UNIQUE) indexes per table
    pub max_table_indexes: usize,
    /// Row count above which ADD COLUMN is reported
    pub large_table_rows:  u64
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            small_table_rows:  1,
            max_join_tables:   3,
            max_offset:        1000,
            max_table_indexes: 3,
            large_table_rows:  1_000_000
        }
    }
}

/// Catalog statistics supplied next to the DDL
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CatalogConfig {
    /// Estimated row counts (table -> rows)
    #[serde(default)]
    pub row_counts: HashMap<String, u64>
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.sql-review.toml)
    /// 3. Config file in home directory (~/.config/sql-review/config.toml)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sql-review")
                .join("config.toml");
            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        let local_config = PathBuf::from(".sql-review.toml");
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        if let Ok(database) = env::var("SQL_REVIEW_DATABASE")
            && !database.is_empty()
        {
            config.review.database = Some(database);
        }

        Ok(config)
    }

    /// Read one TOML config file
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }
}
