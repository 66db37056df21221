// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use clap::Parser;
use sql_review::cli::{Cli, Commands, Dialect, Format};

#[test]
fn test_review_defaults() {
    let cli = Cli::try_parse_from(["sql-review", "review", "-s", "schema.sql", "-q", "q.sql"])
        .unwrap();
    let Commands::Review {
        schema,
        queries,
        dialect,
        rows,
        output_format,
        verbose,
        no_color,
        ..
    } = cli.command
    else {
        panic!("expected review command");
    };

    assert_eq!(schema.to_str(), Some("schema.sql"));
    assert_eq!(queries.to_str(), Some("q.sql"));
    assert!(matches!(dialect, Dialect::Generic));
    assert!(rows.is_empty());
    assert!(matches!(output_format, Format::Text));
    assert!(!verbose);
    assert!(!no_color);
}

#[test]
fn test_review_all_flags() {
    let cli = Cli::try_parse_from([
        "sql-review",
        "review",
        "--schema",
        "schema.sql",
        "--queries",
        "-",
        "--dialect",
        "mysql",
        "--database",
        "shop",
        "-r",
        "orders=2500000",
        "--rows",
        "users=40000",
        "-f",
        "json",
        "-v",
        "--no-color"
    ])
    .unwrap();
    let Commands::Review {
        queries,
        dialect,
        database,
        rows,
        output_format,
        verbose,
        no_color,
        ..
    } = cli.command
    else {
        panic!("expected review command");
    };

    assert_eq!(queries.to_str(), Some("-"));
    assert!(matches!(dialect, Dialect::Mysql));
    assert_eq!(database.as_deref(), Some("shop"));
    assert_eq!(rows, vec!["orders=2500000", "users=40000"]);
    assert!(matches!(output_format, Format::Json));
    assert!(verbose);
    assert!(no_color);
}

#[test]
fn test_review_requires_schema() {
    assert!(Cli::try_parse_from(["sql-review", "review", "-q", "q.sql"]).is_err());
}

#[test]
fn test_unknown_dialect_rejected() {
    let result = Cli::try_parse_from([
        "sql-review",
        "review",
        "-s",
        "schema.sql",
        "-q",
        "q.sql",
        "--dialect",
        "oracle"
    ]);
    assert!(result.is_err());
}

#[test]
fn test_rules_command() {
    let cli = Cli::try_parse_from(["sql-review", "rules", "--no-color"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Rules {
            no_color: true
        }
    ));
}

#[test]
fn test_dialect_variants() {
    let _generic = Dialect::Generic;
    let _mysql = Dialect::Mysql;
    let _postgresql = Dialect::Postgresql;
    let _sqlite = Dialect::Sqlite;
}

#[test]
fn test_format_variants() {
    let _text = Format::Text;
    let _json = Format::Json;
    let _yaml = Format::Yaml;
}
