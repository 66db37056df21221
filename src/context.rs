//! Per-review context and schema-aware lookup helpers.

use compact_str::CompactString;

use crate::{
    ast::{ColumnRef, ObjectName, Statement, TableFactor, TableWithJoins},
    catalog::{Column, SchemaCatalog, Table},
    config::{ReviewConfig, Thresholds},
    walker::PredicateOwner
};

/// Everything a reviewer may look at during one review call.
///
/// The context is immutable and shared by all rules of a review.
#[derive(Clone, Copy)]
pub struct ReviewContext<'a> {
    pub statement: &'a Statement,
    pub catalog:   &'a dyn SchemaCatalog,
    pub config:    &'a ReviewConfig
}

impl<'a> ReviewContext<'a> {
    pub fn new(
        statement: &'a Statement,
        catalog: &'a dyn SchemaCatalog,
        config: &'a ReviewConfig
    ) -> Self {
        Self {
            statement,
            catalog,
            config
        }
    }

    pub fn thresholds(&self) -> &'a Thresholds {
        &self.config.thresholds
    }

    /// Current database name, if configured
    pub fn database(&self) -> Option<&'a str> {
        self.config.database.as_deref()
    }

    /// Resolve a possibly qualified table name.
    ///
    /// A qualifier that differs from the current database makes the table
    /// unknown. Without a current database the qualifier is ignored.
    pub fn find_table(&self, name: &ObjectName) -> Option<&'a Table> {
        if let Some(qualifier) = name.qualifier()
            && let Some(database) = self.database()
            && !qualifier.eq_ignore_ascii_case(database)
        {
            return None;
        }
        self.catalog.find_table(name.name())
    }

    /// Table scope of a predicate owner
    pub fn scope(&self, owner: PredicateOwner<'a>) -> TableScope<'a> {
        TableScope::new(self, owner.tables())
    }
}

/// Tables bound by one SELECT block or UPDATE / DELETE target, keyed by
/// alias (or table name when unaliased).
#[derive(Debug, Default)]
pub struct TableScope<'a> {
    bindings: Vec<(CompactString, &'a Table)>,
    /// A derived table, table function or unknown table is in scope
    opaque:   bool
}

impl<'a> TableScope<'a> {
    pub fn new(ctx: &ReviewContext<'a>, from: &'a [TableWithJoins]) -> Self {
        let mut scope = Self::default();
        for twj in from {
            scope.bind_all(ctx, twj);
        }
        scope
    }

    fn bind_all(&mut self, ctx: &ReviewContext<'a>, twj: &'a TableWithJoins) {
        self.bind(ctx, &twj.relation);
        for join in &twj.joins {
            self.bind(ctx, &join.relation);
        }
    }

    fn bind(&mut self, ctx: &ReviewContext<'a>, factor: &'a TableFactor) {
        match factor {
            TableFactor::Table {
                name,
                alias
            } => match ctx.find_table(name) {
                Some(table) => {
                    let key = alias.as_deref().unwrap_or_else(|| name.name());
                    self.bindings.push((key.to_ascii_lowercase().into(), table));
                }
                None => self.opaque = true
            },
            TableFactor::NestedJoin(inner) => self.bind_all(ctx, inner),
            TableFactor::Derived {
                ..
            }
            | TableFactor::Function {
                ..
            } => self.opaque = true
        }
    }

    /// Catalog tables in scope, in FROM order
    pub fn tables(&self) -> impl Iterator<Item = &'a Table> + '_ {
        self.bindings.iter().map(|(_, table)| *table)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Table bound to an alias or unaliased name
    pub fn table(&self, binding: &str) -> Option<&'a Table> {
        self.bindings
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(binding))
            .map(|(_, table)| *table)
    }

    /// Resolve a column reference to its table and column.
    ///
    /// Returns `None` when the column is unknown, or when an unqualified name
    /// matches several tables or may come from a table the catalog does not
    /// describe.
    pub fn resolve_column(&self, column: &ColumnRef) -> Option<(&'a Table, &'a Column)> {
        if let Some(qualifier) = &column.qualifier {
            let table = self.table(qualifier)?;
            return table.column(&column.name).map(|c| (table, c));
        }
        if self.opaque {
            return None;
        }
        let mut found = None;
        for table in self.tables() {
            if let Some(col) = table.column(&column.name) {
                if found.is_some() {
                    return None;
                }
                found = Some((table, col));
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::Expr,
        catalog::{InMemoryCatalog, Table},
        parse::{SqlDialect, parse_statement},
        walker::walk_predicates
    };

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_table(
                Table::new("orders")
                    .with_column(Column::new("id", "INT"))
                    .with_column(Column::new("customer_id", "INT"))
                    .with_column(Column::new("status", "VARCHAR(20)"))
            )
            .with_table(
                Table::new("customers")
                    .with_column(Column::new("id", "INT"))
                    .with_column(Column::new("name", "VARCHAR(50)"))
            )
    }

    fn with_where_scope<F>(sql: &str, config: &ReviewConfig, check: F)
    where
        F: Fn(&TableScope<'_>, &Expr)
    {
        let catalog = catalog();
        let stmt = parse_statement(sql, SqlDialect::Generic).unwrap();
        let ctx = ReviewContext::new(&stmt, &catalog, config);
        let mut seen = false;
        walk_predicates(&stmt, &mut |p| {
            let scope = ctx.scope(p.owner);
            check(&scope, p.expr);
            seen = true;
        });
        assert!(seen);
    }

    fn left_column(expr: &Expr) -> &ColumnRef {
        match expr {
            Expr::BinaryOp {
                left, ..
            } => left.as_column().unwrap(),
            other => panic!("unexpected predicate {other:?}")
        }
    }

    #[test]
    fn test_find_table_respects_database() {
        let catalog = catalog();
        let stmt = Statement::Other(String::new());
        let config = ReviewConfig {
            database: Some("shop".into()),
            ..Default::default()
        };
        let ctx = ReviewContext::new(&stmt, &catalog, &config);
        assert!(ctx.find_table(&ObjectName::from("ORDERS")).is_some());
        assert!(ctx.find_table(&ObjectName::from("Shop.orders")).is_some());
        assert!(ctx.find_table(&ObjectName::from("other.orders")).is_none());
    }

    #[test]
    fn test_qualifier_ignored_without_database() {
        let catalog = catalog();
        let stmt = Statement::Other(String::new());
        let config = ReviewConfig::default();
        let ctx = ReviewContext::new(&stmt, &catalog, &config);
        assert!(ctx.find_table(&ObjectName::from("any.orders")).is_some());
    }

    #[test]
    fn test_resolve_by_alias() {
        let config = ReviewConfig::default();
        with_where_scope(
            "SELECT o.id FROM orders o JOIN customers c ON o.customer_id = c.id WHERE c.name = 'x'",
            &config,
            |scope, expr| {
                let (table, column) = scope.resolve_column(left_column(expr)).unwrap();
                assert!(matches!(table.name.as_str(), "orders" | "customers"));
                assert!(matches!(column.name.as_str(), "customer_id" | "name"));
            }
        );
    }

    #[test]
    fn test_ambiguous_unqualified_column() {
        let config = ReviewConfig::default();
        with_where_scope(
            "SELECT 1 FROM orders, customers WHERE id = 1",
            &config,
            |scope, expr| assert!(scope.resolve_column(left_column(expr)).is_none())
        );
    }

    #[test]
    fn test_unique_unqualified_column() {
        let config = ReviewConfig::default();
        with_where_scope(
            "SELECT 1 FROM orders, customers WHERE status = 'new'",
            &config,
            |scope, expr| {
                let (table, _) = scope.resolve_column(left_column(expr)).unwrap();
                assert_eq!(table.name, "orders");
            }
        );
    }

    #[test]
    fn test_unknown_table_makes_scope_opaque() {
        let config = ReviewConfig::default();
        with_where_scope(
            "SELECT 1 FROM orders, audit_log WHERE status = 'new'",
            &config,
            |scope, expr| assert!(scope.resolve_column(left_column(expr)).is_none())
        );
    }

    #[test]
    fn test_update_target_scope() {
        let config = ReviewConfig::default();
        with_where_scope("UPDATE orders SET status = 'x' WHERE id = 4", &config, |scope, expr| {
            assert_eq!(scope.tables().count(), 1);
            assert!(scope.resolve_column(left_column(expr)).is_some());
        });
    }
}
