//! Application logic for the `sql-review` CLI.
//!
//! Kept apart from `main.rs` so the whole review pipeline (read files, build
//! the catalog, parse, review, render) can be exercised from tests.

mod convert;
mod helpers;
mod review;
mod types;

pub use convert::{convert_dialect, convert_format};
pub use helpers::{
    build_catalog, calculate_exit_code, create_output_options, parse_row_overrides,
    read_queries_input
};
pub use review::run_review;
pub use types::{ReviewOutcome, ReviewParams, StatementReview};
