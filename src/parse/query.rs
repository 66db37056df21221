use sqlparser::ast as sql;

use super::{expr::convert_expr, object_name};
use crate::ast::{
    Cte, Join, ObjectName, OrderByExpr, Query, Select, SelectItem, SetExpr, SetOperator,
    TableFactor, TableWithJoins
};

pub fn convert_query(query: &sql::Query) -> Query {
    let with = query
        .with
        .iter()
        .flat_map(|w| &w.cte_tables)
        .map(|cte| Cte {
            name:  cte.alias.name.value.as_str().into(),
            query: Box::new(convert_query(&cte.query))
        })
        .collect();
    let order_by = match query.order_by.as_ref().map(|ob| &ob.kind) {
        Some(sql::OrderByKind::Expressions(exprs)) => exprs
            .iter()
            .map(|o| OrderByExpr {
                expr: convert_expr(&o.expr),
                asc:  o.options.asc
            })
            .collect(),
        Some(sql::OrderByKind::All(_)) | None => Vec::new()
    };
    let (limit, offset) = match &query.limit_clause {
        Some(sql::LimitClause::LimitOffset {
            limit,
            offset,
            ..
        }) => (
            limit.as_ref().map(convert_expr),
            offset.as_ref().map(|o| convert_expr(&o.value))
        ),
        // MySQL `LIMIT offset, count`
        Some(sql::LimitClause::OffsetCommaLimit {
            offset,
            limit
        }) => (Some(convert_expr(limit)), Some(convert_expr(offset))),
        None => (None, None)
    };
    Query {
        with,
        body: convert_set_expr(&query.body),
        order_by,
        limit,
        offset
    }
}

fn convert_set_expr(body: &sql::SetExpr) -> SetExpr {
    match body {
        sql::SetExpr::Select(select) => SetExpr::Select(Box::new(convert_select(select))),
        sql::SetExpr::Query(query) => SetExpr::Query(Box::new(convert_query(query))),
        sql::SetExpr::SetOperation {
            op,
            set_quantifier,
            left,
            right
        } => SetExpr::SetOperation {
            op:    match op {
                sql::SetOperator::Union => SetOperator::Union,
                sql::SetOperator::Intersect => SetOperator::Intersect,
                _ => SetOperator::Except
            },
            all:   matches!(
                set_quantifier,
                sql::SetQuantifier::All | sql::SetQuantifier::AllByName
            ),
            left:  Box::new(convert_set_expr(left)),
            right: Box::new(convert_set_expr(right))
        },
        sql::SetExpr::Values(values) => SetExpr::Values(
            values
                .rows
                .iter()
                .map(|row| row.iter().map(convert_expr).collect())
                .collect()
        ),
        // `TABLE t` is shorthand for `SELECT * FROM t`
        sql::SetExpr::Table(table) => {
            let name = table
                .schema_name
                .iter()
                .chain(table.table_name.iter())
                .map(String::as_str);
            SetExpr::Select(Box::new(Select {
                projection: vec![SelectItem::Wildcard],
                from: vec![TableWithJoins {
                    relation: TableFactor::Table {
                        name:  ObjectName::new(name),
                        alias: None
                    },
                    joins:    Vec::new()
                }],
                ..Default::default()
            }))
        }
        other => {
            tracing::debug!(sql = %other, "query body kept as empty VALUES");
            SetExpr::Values(Vec::new())
        }
    }
}

fn convert_select(select: &sql::Select) -> Select {
    let projection = select
        .projection
        .iter()
        .map(|item| match item {
            sql::SelectItem::UnnamedExpr(expr) => SelectItem::Expr {
                expr:  convert_expr(expr),
                alias: None
            },
            sql::SelectItem::ExprWithAlias {
                expr,
                alias
            } => SelectItem::Expr {
                expr:  convert_expr(expr),
                alias: Some(alias.value.as_str().into())
            },
            sql::SelectItem::QualifiedWildcard(kind, _) => match kind {
                sql::SelectItemQualifiedWildcardKind::ObjectName(name) => {
                    SelectItem::QualifiedWildcard(object_name(name))
                }
                sql::SelectItemQualifiedWildcardKind::Expr(expr) => {
                    SelectItem::QualifiedWildcard(ObjectName::new([expr.to_string()]))
                }
            },
            sql::SelectItem::Wildcard(_) => SelectItem::Wildcard
        })
        .collect();
    let group_by = match &select.group_by {
        sql::GroupByExpr::Expressions(exprs, _) => exprs.iter().map(convert_expr).collect(),
        sql::GroupByExpr::All(_) => Vec::new()
    };
    Select {
        distinct: select.distinct.is_some(),
        projection,
        from: select.from.iter().map(convert_table_with_joins).collect(),
        selection: select.selection.as_ref().map(convert_expr),
        group_by,
        having: select.having.as_ref().map(convert_expr)
    }
}

pub fn convert_table_with_joins(twj: &sql::TableWithJoins) -> TableWithJoins {
    TableWithJoins {
        relation: convert_factor(&twj.relation),
        joins:    twj
            .joins
            .iter()
            .map(|join| Join {
                relation:   convert_factor(&join.relation),
                constraint: join_on(&join.join_operator)
            })
            .collect()
    }
}

fn join_on(op: &sql::JoinOperator) -> Option<crate::ast::Expr> {
    let constraint = match op {
        sql::JoinOperator::Join(c)
        | sql::JoinOperator::Inner(c)
        | sql::JoinOperator::Left(c)
        | sql::JoinOperator::LeftOuter(c)
        | sql::JoinOperator::Right(c)
        | sql::JoinOperator::RightOuter(c)
        | sql::JoinOperator::FullOuter(c)
        | sql::JoinOperator::CrossJoin(c)
        | sql::JoinOperator::Semi(c)
        | sql::JoinOperator::LeftSemi(c)
        | sql::JoinOperator::RightSemi(c)
        | sql::JoinOperator::Anti(c)
        | sql::JoinOperator::LeftAnti(c)
        | sql::JoinOperator::RightAnti(c)
        | sql::JoinOperator::StraightJoin(c)
        | sql::JoinOperator::AsOf {
            constraint: c, ..
        } => c,
        sql::JoinOperator::CrossApply | sql::JoinOperator::OuterApply => return None
    };
    match constraint {
        sql::JoinConstraint::On(expr) => Some(convert_expr(expr)),
        sql::JoinConstraint::Using(_) | sql::JoinConstraint::Natural | sql::JoinConstraint::None => {
            None
        }
    }
}

fn convert_factor(factor: &sql::TableFactor) -> TableFactor {
    match factor {
        sql::TableFactor::Table {
            name,
            alias,
            args,
            ..
        } => {
            let alias = alias.as_ref().map(|a| a.name.value.as_str().into());
            if args.is_some() {
                TableFactor::Function {
                    name: name.to_string().into(),
                    alias
                }
            } else {
                TableFactor::Table {
                    name: object_name(name),
                    alias
                }
            }
        }
        sql::TableFactor::Derived {
            subquery,
            alias,
            ..
        } => TableFactor::Derived {
            subquery: Box::new(convert_query(subquery)),
            alias:    alias.as_ref().map(|a| a.name.value.as_str().into())
        },
        sql::TableFactor::NestedJoin {
            table_with_joins,
            ..
        } => TableFactor::NestedJoin(Box::new(convert_table_with_joins(table_with_joins))),
        other => TableFactor::Function {
            name:  other.to_string().into(),
            alias: None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{SetExpr, Statement, TableFactor},
        parse::{SqlDialect, parse_statement}
    };

    fn query(sql: &str) -> crate::ast::Query {
        match parse_statement(sql, SqlDialect::Generic).unwrap() {
            Statement::Select(q) => *q,
            other => panic!("expected query, got {other:?}")
        }
    }

    #[test]
    fn test_limit_offset_values() {
        let q = query("SELECT id FROM t ORDER BY id LIMIT 20 OFFSET 5000");
        assert_eq!(q.limit_value(), Some(20));
        assert_eq!(q.offset_value(), Some(5000));
        assert_eq!(q.order_by.len(), 1);
    }

    #[test]
    fn test_cte_names() {
        let q = query("WITH recent AS (SELECT id FROM t) SELECT id FROM recent");
        assert_eq!(q.with[0].name, "recent");
    }

    #[test]
    fn test_join_and_alias() {
        let q = query("SELECT * FROM a x JOIN b y ON x.id = y.a_id LEFT JOIN c USING (id)");
        let SetExpr::Select(select) = &q.body else {
            panic!("expected select");
        };
        let twj = &select.from[0];
        assert!(matches!(
            &twj.relation,
            TableFactor::Table { alias: Some(a), .. } if a == "x"
        ));
        assert!(twj.joins[0].constraint.is_some());
        assert!(twj.joins[1].constraint.is_none());
        assert_eq!(select.table_count(), 3);
    }

    #[test]
    fn test_union_all_flag() {
        let q = query("SELECT a FROM t UNION ALL SELECT b FROM u");
        assert!(matches!(q.body, SetExpr::SetOperation { all: true, .. }));
    }
}
