use compact_str::CompactString;
use serde::Serialize;

use super::{Expr, Literal, ObjectName};

/// A query level: optional CTEs, a body, and the ORDER BY / LIMIT / OFFSET
/// that apply to that body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub with:     Vec<Cte>,
    pub body:     SetExpr,
    pub order_by: Vec<OrderByExpr>,
    pub limit:    Option<Expr>,
    pub offset:   Option<Expr>
}

impl Query {
    /// Query consisting of a single SELECT block
    pub fn from_select(select: Select) -> Self {
        Self {
            with:     Vec::new(),
            body:     SetExpr::Select(Box::new(select)),
            order_by: Vec::new(),
            limit:    None,
            offset:   None
        }
    }

    /// LIMIT as an integer, when written as a plain number
    pub fn limit_value(&self) -> Option<u64> {
        self.limit.as_ref().and_then(literal_u64)
    }

    /// OFFSET as an integer, when written as a plain number
    pub fn offset_value(&self) -> Option<u64> {
        self.offset.as_ref().and_then(literal_u64)
    }
}

fn literal_u64(expr: &Expr) -> Option<u64> {
    match expr.as_literal()? {
        Literal::Number(n) => n.parse().ok(),
        _ => None
    }
}

/// `name AS (query)` binding of a WITH clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cte {
    pub name:  CompactString,
    pub query: Box<Query>
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderByExpr {
    pub expr: Expr,
    /// `Some(true)` for ASC, `Some(false)` for DESC
    pub asc:  Option<bool>
}

/// Body of a query level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SetExpr {
    Select(Box<Select>),
    /// Parenthesised query used as a set operand
    Query(Box<Query>),
    SetOperation {
        op:    SetOperator,
        all:   bool,
        left:  Box<SetExpr>,
        right: Box<SetExpr>
    },
    Values(Vec<Vec<Expr>>)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SetOperator {
    Union,
    Intersect,
    Except
}

impl std::fmt::Display for SetOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Union => write!(f, "UNION"),
            Self::Intersect => write!(f, "INTERSECT"),
            Self::Except => write!(f, "EXCEPT")
        }
    }
}

/// One `SELECT … FROM … WHERE … GROUP BY … HAVING …` block.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Select {
    pub distinct:   bool,
    pub projection: Vec<SelectItem>,
    pub from:       Vec<TableWithJoins>,
    pub selection:  Option<Expr>,
    pub group_by:   Vec<Expr>,
    pub having:     Option<Expr>
}

impl Select {
    /// Number of tables taking part in the block: each FROM item counts one
    /// plus one per JOIN.
    pub fn table_count(&self) -> usize {
        self.from.iter().map(TableWithJoins::table_count).sum()
    }

    /// `*` or `t.*` in the projection
    pub fn has_wildcard(&self) -> bool {
        self.projection.iter().any(|item| {
            matches!(
                item,
                SelectItem::Wildcard | SelectItem::QualifiedWildcard(_)
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SelectItem {
    Wildcard,
    QualifiedWildcard(ObjectName),
    Expr {
        expr:  Expr,
        alias: Option<CompactString>
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableWithJoins {
    pub relation: TableFactor,
    pub joins:    Vec<Join>
}

impl TableWithJoins {
    /// Plain `FROM name` without joins
    pub fn table(name: &str) -> Self {
        Self {
            relation: TableFactor::Table {
                name:  ObjectName::from(name),
                alias: None
            },
            joins:    Vec::new()
        }
    }

    pub fn table_count(&self) -> usize {
        self.relation.table_count()
            + self
                .joins
                .iter()
                .map(|join| join.relation.table_count())
                .sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Join {
    pub relation:   TableFactor,
    /// `ON` predicate; `None` for CROSS/NATURAL joins and `USING (…)`
    pub constraint: Option<Expr>
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableFactor {
    Table {
        name:  ObjectName,
        alias: Option<CompactString>
    },
    Derived {
        subquery: Box<Query>,
        alias:    Option<CompactString>
    },
    NestedJoin(Box<TableWithJoins>),
    /// Table-valued function
    Function {
        name:  CompactString,
        alias: Option<CompactString>
    }
}

impl TableFactor {
    pub fn table_count(&self) -> usize {
        match self {
            Self::Table {
                ..
            }
            | Self::Derived {
                ..
            }
            | Self::Function {
                ..
            } => 1,
            Self::NestedJoin(inner) => inner.table_count()
        }
    }
}
