//! # SQL Review
//!
//! Rule-based review of SQL statements against a schema, run before the
//! statements reach a database.
//!
//! `sql-review` parses a schema file (CREATE TABLE / CREATE INDEX) into an
//! in-memory catalog, parses a script of statements, and runs every enabled
//! review rule against each statement. Findings are ranked BLOCKER, CRITICAL,
//! MINOR.
//!
//! # Quick Start
//!
//! ```bash
//! # Review a migration against the current schema
//! sql-review review -s schema.sql -q migration.sql --dialect mysql
//!
//! # Attach row-count estimates for size-dependent rules
//! sql-review review -s schema.sql -q queries.sql --rows orders=2500000 -f json
//!
//! # Stream statements from stdin
//! echo "SELECT * FROM users" | sql-review review -s schema.sql -q -
//!
//! # List enabled rules
//! sql-review rules
//! ```
//!
//! # Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | No findings above MINOR |
//! | 1 | At least one CRITICAL finding, or a fatal error |
//! | 2 | At least one BLOCKER finding |
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (default `warn`).

use std::process;

use clap::Parser;
use sql_review::{
    app::{ReviewParams, run_review},
    cli::{Cli, Commands},
    config::Config,
    error::AppResult,
    output::format_rules,
    rules::ReviewEngine
};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into())
        )
        .init();

    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e.render_message());
            process::exit(1);
        }
    }
}

fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Review {
            schema,
            queries,
            dialect,
            database,
            rows,
            output_format,
            verbose,
            no_color
        } => {
            let params = ReviewParams {
                schema_path: schema.display().to_string(),
                queries_path: queries.display().to_string(),
                dialect,
                database,
                rows,
                output_format,
                verbose,
                no_color
            };
            let outcome = run_review(params, config)?;
            print!("{}", outcome.output);
            Ok(outcome.exit_code)
        }
        Commands::Rules {
            no_color
        } => {
            let engine = ReviewEngine::with_config(config.review);
            print!("{}", format_rules(&engine.rules(), !no_color));
            Ok(0)
        }
    }
}
