//! SQL text to statement tree, via [`sqlparser`].
//!
//! The adapter maps sqlparser's open-ended AST onto the closed tree in
//! [`crate::ast`]. Shapes the reviewers have no use for are kept as
//! `Other(..)` nodes carrying the rendered SQL.
//!
//! # Example
//!
//! ```
//! use sql_review::parse::{SqlDialect, parse_script};
//!
//! let parsed = parse_script("SELECT 1; DELETE FROM t WHERE id = 2", SqlDialect::Generic).unwrap();
//! assert_eq!(parsed.len(), 2);
//! assert_eq!(parsed[1].statement.kind(), "DELETE");
//! ```

mod ddl;
mod expr;
mod query;

use rayon::prelude::*;
use serde::Serialize;
use sqlparser::{
    ast as sql,
    dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect},
    parser::Parser
};

use crate::{
    ast::{Delete, Insert, ObjectName, Statement, Update},
    error::{AppError, AppResult, query_parse_error, schema_parse_error}
};

/// SQL dialect for parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SqlDialect {
    #[default]
    Generic,
    MySQL,
    PostgreSQL,
    SQLite
}

impl SqlDialect {
    /// Convert to sqlparser dialect for parsing
    pub fn into_parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::MySQL => Box::new(MySqlDialect {}),
            Self::PostgreSQL => Box::new(PostgreSqlDialect {}),
            Self::SQLite => Box::new(SQLiteDialect {})
        }
    }
}

/// One statement of a script with its normalized SQL text
#[derive(Debug, Clone, Serialize)]
pub struct ParsedStatement {
    pub sql:       String,
    #[serde(skip)]
    pub statement: Statement
}

/// Parse a script of `;`-separated statements, keeping the SQL text.
pub fn parse_script(sql: &str, dialect: SqlDialect) -> AppResult<Vec<ParsedStatement>> {
    let parsed = parse_raw(sql, dialect, |m| query_parse_error(m))?;
    Ok(parsed
        .par_iter()
        .map(|stmt| ParsedStatement {
            sql:       stmt.to_string(),
            statement: convert_statement(stmt)
        })
        .collect())
}

/// Parse a script of `;`-separated statements.
pub fn parse_statements(sql: &str, dialect: SqlDialect) -> AppResult<Vec<Statement>> {
    let parsed = parse_raw(sql, dialect, |m| query_parse_error(m))?;
    Ok(parsed.par_iter().map(convert_statement).collect())
}

/// Parse schema DDL; failures are reported as schema errors.
pub fn parse_schema(sql: &str, dialect: SqlDialect) -> AppResult<Vec<Statement>> {
    let parsed = parse_raw(sql, dialect, |m| schema_parse_error(m))?;
    Ok(parsed.iter().map(convert_statement).collect())
}

/// Parse exactly one statement.
pub fn parse_statement(sql: &str, dialect: SqlDialect) -> AppResult<Statement> {
    let mut statements = parse_statements(sql, dialect)?;
    if statements.len() != 1 {
        return Err(query_parse_error(format!(
            "expected exactly one statement, found {}",
            statements.len()
        )));
    }
    Ok(statements.remove(0))
}

fn parse_raw(
    sql: &str,
    dialect: SqlDialect,
    on_error: fn(String) -> AppError
) -> AppResult<Vec<sql::Statement>> {
    let parser_dialect = dialect.into_parser_dialect();
    Parser::parse_sql(parser_dialect.as_ref(), sql).map_err(|e| on_error(e.to_string()))
}

/// Convert one sqlparser statement into the review tree
pub fn convert_statement(stmt: &sql::Statement) -> Statement {
    match stmt {
        sql::Statement::Query(q) => Statement::Select(Box::new(query::convert_query(q))),
        sql::Statement::Insert(insert) => Statement::Insert(Insert {
            table:   insert_target(&insert.table),
            columns: insert
                .columns
                .iter()
                .map(|c| c.value.as_str().into())
                .collect(),
            source:  insert
                .source
                .as_ref()
                .map(|q| Box::new(query::convert_query(q)))
        }),
        sql::Statement::Update(update) => {
            if update.from.is_some() {
                tracing::debug!("UPDATE … FROM source ignored");
            }
            Statement::Update(Update {
                table:       query::convert_table_with_joins(&update.table),
                assignments: update
                    .assignments
                    .iter()
                    .map(|a| (assignment_target(&a.target), expr::convert_expr(&a.value)))
                    .collect(),
                selection:   update.selection.as_ref().map(expr::convert_expr)
            })
        }
        sql::Statement::Delete(delete) => {
            let tables = match &delete.from {
                sql::FromTable::WithFromKeyword(tables) | sql::FromTable::WithoutKeyword(tables) => {
                    tables
                }
            };
            Statement::Delete(Delete {
                from:      tables.iter().map(query::convert_table_with_joins).collect(),
                selection: delete.selection.as_ref().map(expr::convert_expr)
            })
        }
        sql::Statement::CreateTable(create) => {
            Statement::CreateTable(ddl::convert_create_table(create))
        }
        sql::Statement::CreateIndex(create) => {
            Statement::CreateIndex(ddl::convert_create_index(create))
        }
        sql::Statement::AlterTable(alter) => {
            Statement::AlterTable(ddl::convert_alter_table(&alter.name, &alter.operations))
        }
        sql::Statement::Drop {
            object_type: sql::ObjectType::Index,
            names,
            table,
            ..
        } => Statement::DropIndex(ddl::convert_drop_index(names, table.as_ref())),
        other => {
            tracing::debug!(sql = %other, "statement kept as opaque");
            Statement::Other(other.to_string())
        }
    }
}

fn insert_target(target: &sql::TableObject) -> ObjectName {
    match target {
        sql::TableObject::TableName(name) => object_name(name),
        sql::TableObject::TableFunction(func) => ObjectName::new([func.name.to_string()])
    }
}

fn assignment_target(target: &sql::AssignmentTarget) -> compact_str::CompactString {
    match target {
        sql::AssignmentTarget::ColumnName(name) => object_name(name).name().into(),
        sql::AssignmentTarget::Tuple(names) => {
            let parts: Vec<String> = names.iter().map(ToString::to_string).collect();
            format!("({})", parts.join(", ")).into()
        }
    }
}

pub(crate) fn object_name(name: &sql::ObjectName) -> ObjectName {
    ObjectName::new(name.0.iter().map(|part| match part.as_ident() {
        Some(ident) => ident.value.clone(),
        None => part.to_string()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statement_rejects_multiple() {
        assert!(parse_statement("SELECT 1; SELECT 2", SqlDialect::Generic).is_err());
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(parse_statements("SELEC 1", SqlDialect::Generic).is_err());
    }

    #[test]
    fn test_script_keeps_order() {
        let parsed = parse_script(
            "CREATE TABLE t (id INT); SELECT id FROM t; DROP INDEX idx_t",
            SqlDialect::Generic
        )
        .unwrap();
        let kinds: Vec<_> = parsed.iter().map(|p| p.statement.kind()).collect();
        assert_eq!(kinds, vec!["CREATE TABLE", "SELECT", "DROP INDEX"]);
        assert!(parsed[1].sql.starts_with("SELECT id FROM t"));
    }

    #[test]
    fn test_unsupported_statement_is_opaque() {
        let stmt = parse_statement("TRUNCATE TABLE t", SqlDialect::PostgreSQL).unwrap();
        assert!(matches!(stmt, Statement::Other(_)));
    }
}
