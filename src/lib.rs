//! # SQL Review Library
//!
//! Reviews one parsed SQL statement against schema metadata and returns
//! ranked suggestions.
//!
//! ```
//! use sql_review::{
//!     catalog::InMemoryCatalog,
//!     parse::{SqlDialect, parse_statement},
//!     rules::ReviewEngine
//! };
//!
//! let catalog = InMemoryCatalog::from_ddl(
//!     "CREATE TABLE users (id INT PRIMARY KEY, email VARCHAR(255))",
//!     SqlDialect::Generic
//! )
//! .unwrap();
//! let stmt = parse_statement("SELECT * FROM users WHERE email = NULL", SqlDialect::Generic).unwrap();
//!
//! let ids: Vec<_> = ReviewEngine::new()
//!     .review(&stmt, &catalog)
//!     .iter()
//!     .map(|s| s.rule_id)
//!     .collect();
//! assert_eq!(ids, vec!["null-comparison", "select-star"]);
//! ```

pub mod app;
pub mod ast;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod output;
pub mod parse;
pub mod rules;
pub mod walker;
