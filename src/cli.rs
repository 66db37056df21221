use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// SQL Review - rule-based review of SQL statements against a schema
#[derive(Parser, Debug)]
#[command(name = "sql-review")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Review SQL statements against schema
    Review {
        /// Path to SQL schema file (CREATE TABLE / CREATE INDEX)
        #[arg(short, long)]
        schema: PathBuf,

        /// Path to SQL statements file (use - for stdin)
        #[arg(short, long)]
        queries: PathBuf,

        /// SQL dialect for parsing
        #[arg(long, value_enum, default_value = "generic")]
        dialect: Dialect,

        /// Current database name for qualified table names
        #[arg(long, env = "SQL_REVIEW_DATABASE")]
        database: Option<String>,

        /// Estimated row count, as TABLE=ROWS (repeatable)
        #[arg(short, long = "rows", value_name = "TABLE=ROWS")]
        rows: Vec<String>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Show statement SQL and rule statistics
        #[arg(short, long)]
        verbose: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },

    /// List the enabled review rules
    Rules {
        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Dialect {
    Generic,
    Mysql,
    Postgresql,
    Sqlite
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
