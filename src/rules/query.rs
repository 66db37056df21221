use crate::{
    ast::{BinaryOperator, ColumnRef, Expr, Literal, Select, SelectItem, TableFactor},
    context::ReviewContext,
    rules::{Reviewer, RuleCategory, RuleInfo, Severity, Suggestion},
    walker::{queries, selects, walk_expr}
};

/// SELECT reading a whole non-trivial table
pub struct FullScan;

impl Reviewer for FullScan {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "full-scan",
            name:     "Full table scan",
            severity: Severity::Critical,
            category: RuleCategory::Performance
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let info = self.info();
        let min_rows = ctx.thresholds().small_table_rows;
        let mut out = Vec::new();
        for select in selects(ctx.statement) {
            let candidates: Vec<(String, u64)> = select
                .from
                .iter()
                .flat_map(|twj| {
                    std::iter::once(&twj.relation).chain(twj.joins.iter().map(|j| &j.relation))
                })
                .filter_map(|relation| match relation {
                    TableFactor::Table {
                        name, ..
                    } => ctx
                        .find_table(name)
                        .and_then(|t| t.row_count.map(|rows| (t.name.to_string(), rows))),
                    _ => None
                })
                .filter(|(_, rows)| *rows > min_rows)
                .collect();
            if candidates.is_empty() {
                continue;
            }
            match &select.selection {
                None => {
                    for (table, rows) in candidates {
                        out.push(info.suggest(format!(
                            "Query reads every row of `{}` (~{} rows) because it has no WHERE clause; \
                             add a selective condition on an indexed column",
                            table, rows
                        )));
                    }
                }
                Some(selection) => {
                    if let Some(shape) = scan_shape(selection) {
                        let tables: Vec<&str> = candidates.iter().map(|(t, _)| t.as_str()).collect();
                        out.push(info.suggest(format!(
                            "WHERE on `{}` uses {}, which cannot use an index and scans the table; \
                             rewrite it as a positive, index-friendly condition",
                            tables.join("`, `"),
                            shape
                        )));
                    }
                }
            }
        }
        out
    }
}

/// First scan-inducing predicate shape in a WHERE tree
fn scan_shape(selection: &Expr) -> Option<String> {
    let mut found = None;
    walk_expr(selection, &mut |expr| {
        if found.is_some() {
            return;
        }
        found = match expr {
            Expr::BinaryOp {
                op: BinaryOperator::NotEq,
                ..
            } => Some(format!("a not-equal comparison `{}`", expr)),
            Expr::InList {
                negated: true,
                ..
            }
            | Expr::InSubquery {
                negated: true,
                ..
            } => Some("NOT IN".to_string()),
            Expr::Exists {
                negated: true,
                ..
            } => Some("NOT EXISTS".to_string()),
            Expr::Like {
                pattern, ..
            } => match pattern.as_literal() {
                Some(Literal::String(p)) if p.starts_with('%') || p.ends_with('%') => {
                    Some(format!("LIKE with wildcard pattern '{}'", p))
                }
                _ => None
            },
            _ => None
        };
    });
    found
}

/// `SELECT *` or `t.*` in any SELECT block
pub struct SelectStar;

impl Reviewer for SelectStar {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "select-star",
            name:     "SELECT *",
            severity: Severity::Minor,
            category: RuleCategory::Performance
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let info = self.info();
        selects(ctx.statement)
            .into_iter()
            .filter(|select| select.has_wildcard())
            .map(|select| {
                let tables = relation_names(select);
                let source = if tables.is_empty() {
                    String::new()
                } else {
                    format!(" from `{}`", tables.join("`, `"))
                };
                info.suggest(format!(
                    "SELECT * reads every column{}; list only the columns the caller needs",
                    source
                ))
            })
            .collect()
    }
}

fn relation_names(select: &Select) -> Vec<String> {
    let mut names = Vec::new();
    for twj in &select.from {
        collect_names(&twj.relation, &mut names);
        for join in &twj.joins {
            collect_names(&join.relation, &mut names);
        }
    }
    names
}

fn collect_names(factor: &TableFactor, names: &mut Vec<String>) {
    match factor {
        TableFactor::Table {
            name, ..
        } => names.push(name.to_string()),
        TableFactor::NestedJoin(inner) => {
            collect_names(&inner.relation, names);
            for join in &inner.joins {
                collect_names(&join.relation, names);
            }
        }
        TableFactor::Derived {
            ..
        }
        | TableFactor::Function {
            ..
        } => {}
    }
}

/// SELECT joining more tables than configured
pub struct MultiJoin;

impl Reviewer for MultiJoin {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "multi-join",
            name:     "Too many joined tables",
            severity: Severity::Critical,
            category: RuleCategory::Performance
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let info = self.info();
        let limit = ctx.thresholds().max_join_tables;
        selects(ctx.statement)
            .into_iter()
            .filter(|select| select.table_count() > limit)
            .map(|select| {
                info.suggest(format!(
                    "Query combines {} tables ({}), more than the limit of {}; \
                     split it or denormalize the hot path",
                    select.table_count(),
                    relation_names(select).join(", "),
                    limit
                ))
            })
            .collect()
    }
}

/// LIMIT without ORDER BY at the same query level
pub struct LimitWithoutOrder;

impl Reviewer for LimitWithoutOrder {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "limit-without-order",
            name:     "LIMIT without ORDER BY",
            severity: Severity::Minor,
            category: RuleCategory::Correctness
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let info = self.info();
        queries(ctx.statement)
            .into_iter()
            .filter(|query| query.order_by.is_empty())
            .filter_map(|query| query.limit.as_ref())
            .map(|limit| {
                info.suggest(format!(
                    "LIMIT {} without ORDER BY returns an unspecified subset of rows; \
                     add an ORDER BY on a unique key",
                    limit
                ))
            })
            .collect()
    }
}

/// Literal OFFSET beyond the pagination threshold
pub struct DeepOffset;

impl Reviewer for DeepOffset {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "deep-offset",
            name:     "Deep OFFSET pagination",
            severity: Severity::Critical,
            category: RuleCategory::Performance
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let info = self.info();
        let max = ctx.thresholds().max_offset;
        queries(ctx.statement)
            .into_iter()
            .filter_map(|query| query.offset_value())
            .filter(|offset| *offset > max)
            .map(|offset| {
                info.suggest(format!(
                    "OFFSET {} reads and discards {} rows (threshold {}); \
                     paginate with a keyset condition such as `WHERE id > last_seen_id`",
                    offset, offset, max
                ))
            })
            .collect()
    }
}

/// HAVING conditions that belong in WHERE
pub struct HavingToWhere;

impl Reviewer for HavingToWhere {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "having-to-where",
            name:     "Non-aggregate condition in HAVING",
            severity: Severity::Critical,
            category: RuleCategory::Performance
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let info = self.info();
        let mut out = Vec::new();
        for select in selects(ctx.statement) {
            let Some(having) = &select.having else {
                continue;
            };
            let aliases = aggregate_aliases(select);
            let mut columns: Vec<&ColumnRef> = Vec::new();
            non_aggregate_columns(having, &mut columns);
            let mut names: Vec<String> = Vec::new();
            for column in columns {
                if column.qualifier.is_none()
                    && aliases.iter().any(|a| a.eq_ignore_ascii_case(&column.name))
                {
                    continue;
                }
                let name = column.to_string();
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            if names.is_empty() {
                continue;
            }
            out.push(info.suggest(format!(
                "HAVING filters on non-aggregated column(s) {}; \
                 move the condition to WHERE so rows are filtered before grouping and indexes apply",
                names.join(", ")
            )));
        }
        out
    }
}

/// Aliases of projection items that contain an aggregate call
fn aggregate_aliases(select: &Select) -> Vec<&str> {
    select
        .projection
        .iter()
        .filter_map(|item| match item {
            SelectItem::Expr {
                expr,
                alias: Some(alias)
            } if contains_aggregate(expr) => Some(alias.as_str()),
            _ => None
        })
        .collect()
}

fn contains_aggregate(expr: &Expr) -> bool {
    let mut found = false;
    walk_expr(expr, &mut |e| {
        if let Expr::Function(func) = e
            && func.is_aggregate()
        {
            found = true;
        }
    });
    found
}

/// Column references outside aggregate calls
fn non_aggregate_columns<'a>(expr: &'a Expr, out: &mut Vec<&'a ColumnRef>) {
    match expr {
        Expr::Column(column) => out.push(column),
        Expr::Function(func) if func.is_aggregate() => {}
        _ => {
            for child in expr.children() {
                non_aggregate_columns(child, out);
            }
        }
    }
}
