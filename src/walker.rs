//! Shared traversal over statement trees.
//!
//! Rules never look for nested queries on their own. They ask the walker for
//! every query shape in a statement ([`walk_statement`]), every predicate site
//! ([`walk_predicates`]) or every node of one expression ([`walk_expr`]).
//!
//! Visiting order from a query level:
//!
//! ```text
//! Query ─▶ body Select ─▶ FROM subqueries ─▶ JOIN subqueries (relation, ON)
//!                      ─▶ WHERE subqueries ─▶ select-list subqueries
//!                      ─▶ GROUP BY / HAVING subqueries
//!       ─▶ set-operation branches (left, right)
//!       ─▶ CTE queries
//! ```

use crate::ast::{
    Delete, Expr, Query, Select, SelectItem, SetExpr, Statement, TableFactor, TableWithJoins,
    Update
};

/// Query shape handed to statement visitors.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// Query level, carrying ORDER BY / LIMIT / OFFSET
    Query(&'a Query),
    /// One SELECT block
    Select(&'a Select)
}

/// Where a predicate was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateSite {
    Where,
    Having,
    JoinOn
}

/// Statement part that owns a predicate and binds its tables.
#[derive(Debug, Clone, Copy)]
pub enum PredicateOwner<'a> {
    Select(&'a Select),
    Update(&'a Update),
    Delete(&'a Delete)
}

impl<'a> PredicateOwner<'a> {
    /// Tables whose columns the predicate may reference
    pub fn tables(&self) -> &'a [TableWithJoins] {
        match self {
            Self::Select(select) => &select.from,
            Self::Update(update) => std::slice::from_ref(&update.table),
            Self::Delete(delete) => &delete.from
        }
    }
}

/// A predicate expression together with its site and owner.
#[derive(Debug, Clone, Copy)]
pub struct Predicate<'a> {
    pub site:  PredicateSite,
    pub expr:  &'a Expr,
    pub owner: PredicateOwner<'a>
}

/// Visit every query level and SELECT block reachable from `statement`.
///
/// Statements without an embedded query are a no-op.
pub fn walk_statement<'a, F>(statement: &'a Statement, visit: &mut F)
where
    F: FnMut(Node<'a>)
{
    match statement {
        Statement::Select(query) => walk_query(query, visit),
        Statement::Insert(insert) => {
            if let Some(source) = &insert.source {
                walk_query(source, visit);
            }
        }
        Statement::Update(update) => {
            walk_from(std::slice::from_ref(&update.table), visit);
            for (_, value) in &update.assignments {
                walk_expr_queries(value, visit);
            }
            if let Some(selection) = &update.selection {
                walk_expr_queries(selection, visit);
            }
        }
        Statement::Delete(delete) => {
            walk_from(&delete.from, visit);
            if let Some(selection) = &delete.selection {
                walk_expr_queries(selection, visit);
            }
        }
        Statement::CreateTable(_)
        | Statement::CreateIndex(_)
        | Statement::AlterTable(_)
        | Statement::DropIndex(_)
        | Statement::Other(_) => {}
    }
}

/// Visit `query` and every query nested in it.
pub fn walk_query<'a, F>(query: &'a Query, visit: &mut F)
where
    F: FnMut(Node<'a>)
{
    visit(Node::Query(query));
    walk_set_expr(&query.body, visit);
    for cte in &query.with {
        walk_query(&cte.query, visit);
    }
}

fn walk_set_expr<'a, F>(body: &'a SetExpr, visit: &mut F)
where
    F: FnMut(Node<'a>)
{
    match body {
        SetExpr::Select(select) => walk_select(select, visit),
        SetExpr::Query(query) => walk_query(query, visit),
        SetExpr::SetOperation {
            left,
            right,
            ..
        } => {
            walk_set_expr(left, visit);
            walk_set_expr(right, visit);
        }
        SetExpr::Values(rows) => {
            for expr in rows.iter().flatten() {
                walk_expr_queries(expr, visit);
            }
        }
    }
}

fn walk_select<'a, F>(select: &'a Select, visit: &mut F)
where
    F: FnMut(Node<'a>)
{
    visit(Node::Select(select));
    walk_from(&select.from, visit);
    if let Some(selection) = &select.selection {
        walk_expr_queries(selection, visit);
    }
    for item in &select.projection {
        if let SelectItem::Expr {
            expr, ..
        } = item
        {
            walk_expr_queries(expr, visit);
        }
    }
    for expr in &select.group_by {
        walk_expr_queries(expr, visit);
    }
    if let Some(having) = &select.having {
        walk_expr_queries(having, visit);
    }
}

/// FROM relations first, then every JOIN with its ON predicate.
fn walk_from<'a, F>(from: &'a [TableWithJoins], visit: &mut F)
where
    F: FnMut(Node<'a>)
{
    for twj in from {
        walk_factor(&twj.relation, visit);
    }
    for twj in from {
        for join in &twj.joins {
            walk_factor(&join.relation, visit);
            if let Some(on) = &join.constraint {
                walk_expr_queries(on, visit);
            }
        }
    }
}

fn walk_factor<'a, F>(factor: &'a TableFactor, visit: &mut F)
where
    F: FnMut(Node<'a>)
{
    match factor {
        TableFactor::Derived {
            subquery, ..
        } => walk_query(subquery, visit),
        TableFactor::NestedJoin(inner) => walk_from(std::slice::from_ref(inner.as_ref()), visit),
        TableFactor::Table {
            ..
        }
        | TableFactor::Function {
            ..
        } => {}
    }
}

fn walk_expr_queries<'a, F>(expr: &'a Expr, visit: &mut F)
where
    F: FnMut(Node<'a>)
{
    walk_expr(expr, &mut |e| {
        for query in e.subqueries() {
            walk_query(query, visit);
        }
    });
}

/// Pre-order traversal of one expression tree.
///
/// Does not descend into subqueries.
pub fn walk_expr<'a, F>(expr: &'a Expr, visit: &mut F)
where
    F: FnMut(&'a Expr)
{
    visit(expr);
    for child in expr.children() {
        walk_expr(child, visit);
    }
}

/// Visit every predicate site of the statement: WHERE, HAVING and JOIN … ON
/// of each reachable SELECT block, plus the WHERE of UPDATE / DELETE.
pub fn walk_predicates<'a, F>(statement: &'a Statement, visit: &mut F)
where
    F: FnMut(Predicate<'a>)
{
    match statement {
        Statement::Update(update) => {
            if let Some(expr) = &update.selection {
                visit(Predicate {
                    site: PredicateSite::Where,
                    expr,
                    owner: PredicateOwner::Update(update)
                });
            }
        }
        Statement::Delete(delete) => {
            if let Some(expr) = &delete.selection {
                visit(Predicate {
                    site: PredicateSite::Where,
                    expr,
                    owner: PredicateOwner::Delete(delete)
                });
            }
        }
        _ => {}
    }
    walk_statement(statement, &mut |node| {
        let Node::Select(select) = node else {
            return;
        };
        let owner = PredicateOwner::Select(select);
        if let Some(expr) = &select.selection {
            visit(Predicate {
                site: PredicateSite::Where,
                expr,
                owner
            });
        }
        for_each_join_on(&select.from, &mut |expr| {
            visit(Predicate {
                site: PredicateSite::JoinOn,
                expr,
                owner
            })
        });
        if let Some(expr) = &select.having {
            visit(Predicate {
                site: PredicateSite::Having,
                expr,
                owner
            });
        }
    });
}

fn for_each_join_on<'a>(from: &'a [TableWithJoins], f: &mut dyn FnMut(&'a Expr)) {
    for twj in from {
        if let TableFactor::NestedJoin(inner) = &twj.relation {
            for_each_join_on(std::slice::from_ref(inner.as_ref()), f);
        }
        for join in &twj.joins {
            if let TableFactor::NestedJoin(inner) = &join.relation {
                for_each_join_on(std::slice::from_ref(inner.as_ref()), f);
            }
            if let Some(on) = &join.constraint {
                f(on);
            }
        }
    }
}

/// Collect every node of a statement in visiting order
pub fn collect_nodes(statement: &Statement) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    walk_statement(statement, &mut |node| nodes.push(node));
    nodes
}

/// Every SELECT block of a statement, in visiting order
pub fn selects(statement: &Statement) -> Vec<&Select> {
    let mut out = Vec::new();
    walk_statement(statement, &mut |node| {
        if let Node::Select(select) = node {
            out.push(select);
        }
    });
    out
}

/// Every query level of a statement, in visiting order
pub fn queries(statement: &Statement) -> Vec<&Query> {
    let mut out = Vec::new();
    walk_statement(statement, &mut |node| {
        if let Node::Query(query) = node {
            out.push(query);
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{SqlDialect, parse_statement};

    fn parse(sql: &str) -> Statement {
        parse_statement(sql, SqlDialect::Generic).unwrap()
    }

    fn select_labels(statement: &Statement) -> Vec<String> {
        collect_nodes(statement)
            .into_iter()
            .filter_map(|node| match node {
                Node::Select(select) => match select.projection.first() {
                    Some(SelectItem::Expr {
                        expr, ..
                    }) => Some(expr.to_string()),
                    _ => Some("*".to_string())
                },
                Node::Query(_) => None
            })
            .collect()
    }

    #[test]
    fn test_visit_order() {
        let stmt = parse(
            "WITH w AS (SELECT g FROM t7) \
             SELECT a, (SELECT h FROM t8) FROM (SELECT b FROM t2) d \
             JOIN t3 ON t3.x IN (SELECT c FROM t4) \
             WHERE EXISTS (SELECT e FROM t5) AND z = (SELECT f FROM t6)"
        );
        assert_eq!(
            select_labels(&stmt),
            vec!["a", "b", "c", "e", "f", "h", "g"]
        );
    }

    #[test]
    fn test_set_operation_branches() {
        let stmt = parse("SELECT a FROM t1 UNION SELECT b FROM t2 UNION ALL SELECT c FROM t3");
        assert_eq!(select_labels(&stmt), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_each_node_once() {
        let stmt = parse("SELECT a FROM (SELECT b FROM (SELECT c FROM t) x) y");
        let nodes = collect_nodes(&stmt);
        let queries = nodes
            .iter()
            .filter(|n| matches!(n, Node::Query(_)))
            .count();
        assert_eq!(queries, 3);
        assert_eq!(select_labels(&stmt), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_select_source() {
        let stmt = parse("INSERT INTO archive (id) SELECT id FROM orders WHERE id < 10");
        assert_eq!(select_labels(&stmt), vec!["id"]);
    }

    #[test]
    fn test_update_where_subquery() {
        let stmt = parse("UPDATE t SET a = 1 WHERE id IN (SELECT id FROM other)");
        assert_eq!(select_labels(&stmt), vec!["id"]);
    }

    #[test]
    fn test_ddl_is_noop() {
        let stmt = parse("CREATE TABLE t (id INT PRIMARY KEY)");
        assert!(collect_nodes(&stmt).is_empty());
    }

    #[test]
    fn test_walk_expr_skips_subqueries() {
        let stmt = parse("SELECT a FROM t WHERE x = 1 AND y IN (SELECT z FROM u WHERE z = 2)");
        let Statement::Select(query) = &stmt else {
            panic!("expected select");
        };
        let SetExpr::Select(select) = &query.body else {
            panic!("expected select body");
        };
        let mut columns = Vec::new();
        walk_expr(select.selection.as_ref().unwrap(), &mut |e| {
            if let Expr::Column(col) = e {
                columns.push(col.name.to_string());
            }
        });
        assert_eq!(columns, vec!["x", "y"]);
    }

    #[test]
    fn test_predicate_sites() {
        let stmt = parse(
            "SELECT a, COUNT(*) FROM t JOIN u ON t.id = u.tid \
             WHERE t.x = 1 GROUP BY a HAVING COUNT(*) > 1"
        );
        let mut sites = Vec::new();
        walk_predicates(&stmt, &mut |p| sites.push(p.site));
        assert_eq!(
            sites,
            vec![
                PredicateSite::Where,
                PredicateSite::JoinOn,
                PredicateSite::Having
            ]
        );
    }

    #[test]
    fn test_delete_predicates_include_nested() {
        let stmt = parse("DELETE FROM t WHERE id IN (SELECT id FROM u WHERE flag = 0)");
        let mut owners = Vec::new();
        walk_predicates(&stmt, &mut |p| {
            owners.push(matches!(p.owner, PredicateOwner::Delete(_)))
        });
        assert_eq!(owners, vec![true, false]);
    }
}
