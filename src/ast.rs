//! Closed, typed statement tree reviewed by the rule engine.
//!
//! The tree is produced by an upstream parser (see [`crate::parse`] for the
//! `sqlparser` adapter) and is never mutated during a review. Every enum here
//! is matched exhaustively by the rules, so a new statement or expression
//! shape has to be handled explicitly wherever it matters.
//!
//! # Example
//!
//! ```
//! use sql_review::{
//!     ast::Statement,
//!     parse::{SqlDialect, parse_statement}
//! };
//!
//! let stmt = parse_statement("SELECT id FROM users LIMIT 10", SqlDialect::Generic).unwrap();
//! assert!(matches!(stmt, Statement::Select(_)));
//! assert_eq!(stmt.kind(), "SELECT");
//! ```

mod ddl;
mod expr;
mod query;

use std::fmt;

use compact_str::CompactString;
pub use ddl::{
    AlterOperation, AlterTable, ColumnDef, ColumnOption, CreateIndex, CreateTable, DropIndex,
    TableConstraint
};
pub use expr::{BinaryOperator, ColumnRef, Expr, Function, Literal, UnaryOperator};
pub use query::{
    Cte, Join, OrderByExpr, Query, Select, SelectItem, SetExpr, SetOperator, TableFactor,
    TableWithJoins
};
use serde::Serialize;

/// One parsed SQL statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Select(Box<Query>),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    CreateTable(CreateTable),
    CreateIndex(CreateIndex),
    AlterTable(AlterTable),
    DropIndex(DropIndex),
    /// Statement shape the reviewers have no opinion on (raw SQL kept for
    /// display).
    Other(String)
}

impl Statement {
    /// Short upper-case tag for the statement kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::Insert(_) => "INSERT",
            Self::Update(_) => "UPDATE",
            Self::Delete(_) => "DELETE",
            Self::CreateTable(_) => "CREATE TABLE",
            Self::CreateIndex(_) => "CREATE INDEX",
            Self::AlterTable(_) => "ALTER TABLE",
            Self::DropIndex(_) => "DROP INDEX",
            Self::Other(_) => "OTHER"
        }
    }
}

/// Possibly qualified object name (`db.table`, `table`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectName(pub Vec<CompactString>);

impl ObjectName {
    /// Build a name from dot-separated parts
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Unqualified object name (last part)
    pub fn name(&self) -> &str {
        self.0.last().map(|s| s.as_str()).unwrap_or_default()
    }

    /// Qualifier directly in front of the object name, if any
    pub fn qualifier(&self) -> Option<&str> {
        let len = self.0.len();
        if len >= 2 {
            Some(self.0[len - 2].as_str())
        } else {
            None
        }
    }
}

impl From<&str> for ObjectName {
    fn from(value: &str) -> Self {
        Self::new(value.split('.'))
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(part)?;
        }
        Ok(())
    }
}

/// `INSERT INTO table (columns) VALUES … | SELECT …`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insert {
    pub table:   ObjectName,
    pub columns: Vec<CompactString>,
    /// Source rows; a `VALUES` list is represented as [`SetExpr::Values`]
    pub source:  Option<Box<Query>>
}

/// `UPDATE table SET … WHERE …`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub table:       TableWithJoins,
    pub assignments: Vec<(CompactString, Expr)>,
    pub selection:   Option<Expr>
}

/// `DELETE FROM tables WHERE …`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delete {
    pub from:      Vec<TableWithJoins>,
    pub selection: Option<Expr>
}
