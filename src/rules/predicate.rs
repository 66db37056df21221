use std::sync::LazyLock;

use regex::Regex;

use crate::{
    ast::{BinaryOperator, ColumnRef, Expr, Literal},
    catalog::TypeFamily,
    context::{ReviewContext, TableScope},
    rules::{Reviewer, RuleCategory, RuleInfo, Severity, Suggestion},
    walker::{walk_expr, walk_predicates}
};

/// `YYYY-MM-DD` with an optional time part
static DATE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}([ T]\d{1,2}:\d{2}(:\d{2}(\.\d+)?)?)?$")
        .expect("valid regex")
});

/// `= NULL` / `<> NULL` comparisons
pub struct NullComparison;

impl Reviewer for NullComparison {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "null-comparison",
            name:     "Comparison with NULL",
            severity: Severity::Blocker,
            category: RuleCategory::Correctness
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let info = self.info();
        let mut out = Vec::new();
        walk_predicates(ctx.statement, &mut |predicate| {
            walk_expr(predicate.expr, &mut |expr| {
                let Expr::BinaryOp {
                    left,
                    op,
                    right
                } = expr
                else {
                    return;
                };
                let replacement = match op {
                    BinaryOperator::Eq => "IS NULL",
                    BinaryOperator::NotEq => "IS NOT NULL",
                    _ => return
                };
                if left.is_null_literal() || right.is_null_literal() {
                    out.push(info.suggest(format!(
                        "`{}` is never true because any comparison with NULL is unknown; use {}",
                        expr, replacement
                    )));
                }
            });
        });
        out
    }
}

/// Coarse literal type guessed from its spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralKind {
    Number,
    String,
    DateString
}

impl LiteralKind {
    fn guess(literal: &Literal) -> Option<Self> {
        match literal {
            Literal::Number(_) => Some(Self::Number),
            Literal::String(s) if DATE_LITERAL.is_match(s.trim()) => Some(Self::DateString),
            Literal::String(_) => Some(Self::String),
            Literal::Boolean(_) | Literal::Null | Literal::Placeholder(_) => None
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Number => "numeric",
            Self::String => "string",
            Self::DateString => "date string"
        }
    }
}

fn incompatible(family: TypeFamily, kind: LiteralKind) -> bool {
    match family {
        TypeFamily::Numeric => kind != LiteralKind::Number,
        TypeFamily::Text => kind == LiteralKind::Number,
        TypeFamily::Temporal => kind != LiteralKind::DateString,
        TypeFamily::Other => false
    }
}

/// Indexed column compared with a literal of a different type
pub struct ImplicitTypeConversion;

impl ImplicitTypeConversion {
    fn check(
        &self,
        scope: &TableScope<'_>,
        column: &ColumnRef,
        literal: &Literal
    ) -> Option<Suggestion> {
        let (table, col) = scope.resolve_column(column)?;
        let index = table.indexes_on(&col.name).next()?;
        let kind = LiteralKind::guess(literal)?;
        if !incompatible(col.family(), kind) {
            return None;
        }
        Some(self.info().suggest(format!(
            "Column `{}.{}` ({}) is indexed by `{}` but compared with {} literal {}; \
             the implicit conversion prevents index use, write the literal as {}",
            table.name,
            col.name,
            col.data_type,
            index.name,
            kind.describe(),
            literal,
            col.data_type
        )))
    }
}

impl Reviewer for ImplicitTypeConversion {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "implicit-type-conversion",
            name:     "Implicit type conversion on indexed column",
            severity: Severity::Blocker,
            category: RuleCategory::Correctness
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let mut out = Vec::new();
        walk_predicates(ctx.statement, &mut |predicate| {
            let scope = ctx.scope(predicate.owner);
            if scope.is_empty() {
                return;
            }
            walk_expr(predicate.expr, &mut |expr| match expr {
                Expr::BinaryOp {
                    left,
                    op,
                    right
                } if op.is_comparison() => {
                    let pair = match (left.as_column(), right.as_literal()) {
                        (Some(column), Some(literal)) => Some((column, literal)),
                        _ => right.as_column().zip(left.as_literal())
                    };
                    if let Some((column, literal)) = pair
                        && let Some(found) = self.check(&scope, column, literal)
                    {
                        out.push(found);
                    }
                }
                Expr::InList {
                    expr,
                    list,
                    ..
                } => {
                    let Some(column) = expr.as_column() else {
                        return;
                    };
                    if let Some(found) = list
                        .iter()
                        .filter_map(Expr::as_literal)
                        .find_map(|literal| self.check(&scope, column, literal))
                    {
                        out.push(found);
                    }
                }
                _ => {}
            });
        });
        out
    }
}

/// Arithmetic applied to a column inside a comparison
pub struct FieldArithmetic;

impl Reviewer for FieldArithmetic {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "field-arithmetic",
            name:     "Arithmetic on column in predicate",
            severity: Severity::Blocker,
            category: RuleCategory::Correctness
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let info = self.info();
        let mut out = Vec::new();
        walk_predicates(ctx.statement, &mut |predicate| {
            walk_expr(predicate.expr, &mut |expr| {
                let Expr::BinaryOp {
                    left,
                    op,
                    right
                } = expr
                else {
                    return;
                };
                if !op.is_comparison() {
                    return;
                }
                for side in [left.as_ref(), right.as_ref()] {
                    if let Some(column) = arithmetic_column(side) {
                        out.push(info.suggest(format!(
                            "`{}` applies arithmetic to column `{}` inside `{}`, which prevents index use; \
                             move the computation to the other side of the comparison",
                            side, column, expr
                        )));
                    }
                }
            });
        });
        out
    }
}

/// First column inside an arithmetic operand
fn arithmetic_column(side: &Expr) -> Option<&ColumnRef> {
    let mut operand = side;
    while let Expr::Nested(inner) = operand {
        operand = inner;
    }
    let Expr::BinaryOp {
        op, ..
    } = operand
    else {
        return None;
    };
    if !op.is_arithmetic() {
        return None;
    }
    let mut found = None;
    walk_expr(operand, &mut |e| {
        if found.is_none() {
            found = e.as_column();
        }
    });
    found
}
