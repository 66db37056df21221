use std::fs::read_to_string;

use super::{
    convert::convert_dialect,
    helpers::{
        build_catalog, calculate_exit_code, create_output_options, parse_row_overrides,
        read_queries_input
    },
    types::{ReviewOutcome, ReviewParams, StatementReview}
};
use crate::{
    config::Config,
    error::{AppResult, file_read_error},
    output::format_review,
    parse::parse_script,
    rules::ReviewEngine
};

/// Review every statement of the input script against the schema.
///
/// # Errors
///
/// Returns an error if an input file cannot be read, the schema or the
/// statements fail to parse, a row-count override is malformed, or the
/// report cannot be rendered.
pub fn run_review(params: ReviewParams, config: Config) -> AppResult<ReviewOutcome> {
    let schema_sql = read_to_string(&params.schema_path)
        .map_err(|e| file_read_error(&params.schema_path, e))?;
    let queries_sql = read_queries_input(&params.queries_path)?;
    let dialect = convert_dialect(params.dialect);

    let overrides = parse_row_overrides(&params.rows)?;
    let catalog = build_catalog(
        &schema_sql,
        dialect,
        &config.catalog.row_counts,
        &overrides
    )?;

    let mut review_config = config.review;
    if params.database.is_some() {
        review_config.database = params.database;
    }
    let engine = ReviewEngine::with_config(review_config);

    let statements = parse_script(&queries_sql, dialect)?;
    tracing::debug!(statements = statements.len(), "reviewing script");
    let reviews: Vec<StatementReview> = statements
        .into_iter()
        .enumerate()
        .map(|(i, parsed)| StatementReview {
            index:  i + 1,
            kind:   parsed.statement.kind(),
            report: engine.review_report(&parsed.statement, &catalog),
            sql:    parsed.sql
        })
        .collect();

    let opts = create_output_options(params.output_format, params.no_color, params.verbose);
    let output = format_review(&reviews, &opts)?;
    Ok(ReviewOutcome {
        exit_code: calculate_exit_code(&reviews),
        output,
        reviews
    })
}
