//! Schema catalog: the table, column and index metadata rules query against.
//!
//! The review core only depends on the [`SchemaCatalog`] trait. Catalogs
//! backed by a live database belong to the caller; this module ships
//! [`InMemoryCatalog`], which can be filled programmatically or built from DDL
//! (`CREATE TABLE`, `CREATE INDEX`, `ALTER TABLE … ADD …`).
//!
//! # Example
//!
//! ```
//! use sql_review::{
//!     catalog::{InMemoryCatalog, IndexKind, SchemaCatalog},
//!     parse::SqlDialect
//! };
//!
//! let sql = r#"
//!     CREATE TABLE users (
//!         id INT PRIMARY KEY,
//!         email VARCHAR(255) NOT NULL
//!     );
//!     CREATE INDEX idx_email ON users(email);
//! "#;
//!
//! let mut catalog = InMemoryCatalog::from_ddl(sql, SqlDialect::Generic).unwrap();
//! catalog.set_row_count("users", 50_000);
//!
//! let users = catalog.find_table("USERS").unwrap();
//! assert_eq!(users.columns.len(), 2);
//! assert_eq!(users.columns[1].data_type, "VARCHAR");
//! assert_eq!(users.indexes[1].kind, IndexKind::Normal);
//! assert_eq!(users.row_count, Some(50_000));
//! ```

use compact_str::{CompactString, ToCompactString};
use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;

use crate::{
    ast::{AlterOperation, ColumnDef, ColumnOption, CreateTable, Statement, TableConstraint},
    error::AppResult,
    parse::{SqlDialect, parse_schema}
};

/// Index column list (typically one to three columns)
pub type IndexColumns = SmallVec<[CompactString; 4]>;

/// Lookup capability the review core needs from a schema source.
///
/// Implementations must match table names case-insensitively and must not
/// change their answers while a review is running.
pub trait SchemaCatalog: Send + Sync {
    /// Find a table by unqualified name
    fn find_table(&self, name: &str) -> Option<&Table>;
}

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name:      CompactString,
    /// Estimated row count; `None` when the catalog has no statistics
    pub row_count: Option<u64>,
    /// Ordered list of columns
    pub columns:   Vec<Column>,
    pub indexes:   Vec<Index>
}

impl Table {
    pub fn new(name: &str) -> Self {
        Self {
            name:      name.into(),
            row_count: None,
            columns:   Vec::new(),
            indexes:   Vec::new()
        }
    }

    pub fn with_row_count(mut self, rows: u64) -> Self {
        self.row_count = Some(rows);
        self
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Case-insensitive column lookup
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Indexes whose column list contains `column`
    pub fn indexes_on<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Index> + 'a {
        self.indexes.iter().filter(move |idx| idx.covers(column))
    }

    pub fn is_indexed(&self, column: &str) -> bool {
        self.indexes_on(column).next().is_some()
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name:      CompactString,
    /// Normalized upper-case base type (see [`normalize_type`])
    pub data_type: CompactString,
    pub nullable:  bool
}

impl Column {
    /// Create a nullable column; the declared type is normalized
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name:      name.into(),
            data_type: normalize_type(data_type),
            nullable:  true
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn family(&self) -> TypeFamily {
        type_family(&self.data_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndexKind {
    Normal,
    Unique,
    PrimaryKey,
    ForeignKey
}

/// Index metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Index {
    pub name:    CompactString,
    /// Ordered list of indexed columns
    pub columns: IndexColumns,
    pub kind:    IndexKind
}

impl Index {
    pub fn new<I, S>(name: &str, kind: IndexKind, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            kind
        }
    }

    pub fn covers(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    }
}

/// Coarse type classes used by conversion heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeFamily {
    Numeric,
    Text,
    Temporal,
    Other
}

/// Normalize a declared SQL type to its upper-case base name.
///
/// Length/precision arguments and modifiers are dropped and common aliases
/// are folded: `varchar(255)` → `VARCHAR`, `integer unsigned` → `INT`,
/// `character varying(10)` → `VARCHAR`, `timestamp with time zone` →
/// `TIMESTAMP`.
pub fn normalize_type(raw: &str) -> CompactString {
    let upper = raw.to_ascii_uppercase();
    let base = upper.split('(').next().unwrap_or_default();
    let words: Vec<&str> = base.split_whitespace().collect();
    let joined = words.join(" ");
    let folded = match joined.as_str() {
        "CHARACTER VARYING" | "CHAR VARYING" | "NATIONAL CHARACTER VARYING" => "VARCHAR",
        "DOUBLE PRECISION" => "DOUBLE",
        _ => {
            let first = words.first().copied().unwrap_or_default();
            match first {
                "INTEGER" | "INT4" => "INT",
                "INT8" => "BIGINT",
                "INT2" => "SMALLINT",
                "BOOL" => "BOOLEAN",
                "NUMERIC" => "DECIMAL",
                "CHARACTER" => "CHAR",
                "FLOAT8" => "DOUBLE",
                "FLOAT4" => "REAL",
                "TIMESTAMPTZ" => "TIMESTAMP",
                other => other
            }
        }
    };
    folded.to_compact_string()
}

/// Classify a normalized type name.
pub fn type_family(normalized: &str) -> TypeFamily {
    match normalized {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "DECIMAL" | "DEC" | "FLOAT"
        | "DOUBLE" | "REAL" | "NUMBER" | "SERIAL" | "BIGSERIAL" | "SMALLSERIAL" => {
            TypeFamily::Numeric
        }
        "CHAR" | "VARCHAR" | "NCHAR" | "NVARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT"
        | "LONGTEXT" | "CLOB" | "STRING" | "ENUM" | "SET" => TypeFamily::Text,
        "DATE" | "DATETIME" | "TIMESTAMP" | "TIME" | "YEAR" => TypeFamily::Temporal,
        _ => TypeFamily::Other
    }
}

/// TEXT/BLOB family members that are stored off-row by most engines.
pub fn is_large_object_type(normalized: &str) -> bool {
    matches!(
        normalized,
        "TINYTEXT"
            | "TEXT"
            | "MEDIUMTEXT"
            | "LONGTEXT"
            | "TINYBLOB"
            | "BLOB"
            | "MEDIUMBLOB"
            | "LONGBLOB"
            | "CLOB"
    )
}

/// Catalog held in memory, keyed by lower-cased table name.
///
/// Tables are kept in declaration order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    tables: IndexMap<CompactString, Table>
}

impl SchemaCatalog for InMemoryCatalog {
    fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name.to_ascii_lowercase().as_str())
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a table
    pub fn insert(&mut self, table: Table) {
        self.tables
            .insert(table.name.to_ascii_lowercase().into(), table);
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.insert(table);
        self
    }

    /// Attach an estimated row count; returns `false` for unknown tables
    pub fn set_row_count(&mut self, table: &str, rows: u64) -> bool {
        match self.tables.get_mut(table.to_ascii_lowercase().as_str()) {
            Some(t) => {
                t.row_count = Some(rows);
                true
            }
            None => false
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Build a catalog from DDL statements
    ///
    /// # Errors
    ///
    /// Returns error if SQL parsing fails
    pub fn from_ddl(sql: &str, dialect: SqlDialect) -> AppResult<Self> {
        let mut catalog = Self::default();
        for statement in parse_schema(sql, dialect)? {
            catalog.apply(&statement);
        }
        Ok(catalog)
    }

    fn apply(&mut self, statement: &Statement) {
        match statement {
            Statement::CreateTable(create) => self.insert(table_from_create(create)),
            Statement::CreateIndex(create) => {
                let key = create.table.name().to_ascii_lowercase();
                match self.tables.get_mut(key.as_str()) {
                    Some(table) => {
                        let kind = if create.unique {
                            IndexKind::Unique
                        } else {
                            IndexKind::Normal
                        };
                        let name = create
                            .name
                            .clone()
                            .or_else(|| create.columns.first().cloned())
                            .unwrap_or_default();
                        table
                            .indexes
                            .push(Index::new(&name, kind, create.columns.iter().cloned()));
                    }
                    None => {
                        tracing::debug!(table = %create.table, "CREATE INDEX on unknown table ignored");
                    }
                }
            }
            Statement::AlterTable(alter) => {
                let key = alter.name.name().to_ascii_lowercase();
                let Some(table) = self.tables.get_mut(key.as_str()) else {
                    tracing::debug!(table = %alter.name, "ALTER TABLE on unknown table ignored");
                    return;
                };
                for op in &alter.operations {
                    match op {
                        AlterOperation::AddColumn(def) => {
                            add_column(table, def);
                        }
                        AlterOperation::DropColumn(name) => {
                            table.columns.retain(|c| !c.name.eq_ignore_ascii_case(name));
                        }
                        AlterOperation::ModifyColumn {
                            column,
                            data_type
                        } => {
                            if let Some(col) = table
                                .columns
                                .iter_mut()
                                .find(|c| c.name.eq_ignore_ascii_case(column))
                            {
                                col.data_type = normalize_type(data_type);
                            }
                        }
                        AlterOperation::ChangeColumn {
                            old_name,
                            new_name,
                            data_type
                        } => {
                            if let Some(col) = table
                                .columns
                                .iter_mut()
                                .find(|c| c.name.eq_ignore_ascii_case(old_name))
                            {
                                col.name = new_name.clone();
                                col.data_type = normalize_type(data_type);
                            }
                        }
                        AlterOperation::RenameColumn {
                            old_name,
                            new_name
                        } => {
                            if let Some(col) = table
                                .columns
                                .iter_mut()
                                .find(|c| c.name.eq_ignore_ascii_case(old_name))
                            {
                                col.name = new_name.clone();
                            }
                        }
                        AlterOperation::AddConstraint(constraint) => {
                            if let Some(index) = index_from_constraint(&table.name, constraint) {
                                table.indexes.push(index);
                            }
                        }
                        AlterOperation::DropIndex(name) | AlterOperation::DropConstraint(name) => {
                            table.indexes.retain(|i| !i.name.eq_ignore_ascii_case(name));
                        }
                        AlterOperation::Other(_) => {}
                    }
                }
            }
            Statement::DropIndex(drop) => {
                if let Some(target) = &drop.table
                    && let Some(table) = self
                        .tables
                        .get_mut(target.name().to_ascii_lowercase().as_str())
                {
                    for name in &drop.names {
                        table
                            .indexes
                            .retain(|i| !i.name.eq_ignore_ascii_case(name.name()));
                    }
                }
            }
            Statement::Select(_)
            | Statement::Insert(_)
            | Statement::Update(_)
            | Statement::Delete(_)
            | Statement::Other(_) => {}
        }
    }
}

fn table_from_create(create: &CreateTable) -> Table {
    let mut table = Table::new(create.name.name());
    for def in &create.columns {
        add_column(&mut table, def);
    }
    for constraint in &create.constraints {
        if let Some(index) = index_from_constraint(&table.name, constraint) {
            table.indexes.push(index);
        }
    }
    table
}

fn add_column(table: &mut Table, def: &ColumnDef) {
    let mut column = Column::new(&def.name, &def.data_type);
    for option in &def.options {
        match option {
            ColumnOption::NotNull => column.nullable = false,
            ColumnOption::PrimaryKey => {
                column.nullable = false;
                table
                    .indexes
                    .push(Index::new("PRIMARY", IndexKind::PrimaryKey, [def.name.clone()]));
            }
            ColumnOption::Unique => {
                table
                    .indexes
                    .push(Index::new(&def.name, IndexKind::Unique, [def.name.clone()]));
            }
            ColumnOption::ForeignKey {
                ..
            } => {
                let name = format!("fk_{}_{}", table.name, def.name);
                table
                    .indexes
                    .push(Index::new(&name, IndexKind::ForeignKey, [def.name.clone()]));
            }
            ColumnOption::Null | ColumnOption::Default(_) | ColumnOption::Other(_) => {}
        }
    }
    table.columns.push(column);
}

fn index_from_constraint(table: &str, constraint: &TableConstraint) -> Option<Index> {
    let (kind, columns) = match constraint {
        TableConstraint::PrimaryKey {
            columns, ..
        } => (IndexKind::PrimaryKey, columns),
        TableConstraint::Unique {
            columns, ..
        } => (IndexKind::Unique, columns),
        TableConstraint::Index {
            columns, ..
        } => (IndexKind::Normal, columns),
        TableConstraint::ForeignKey {
            columns, ..
        } => (IndexKind::ForeignKey, columns),
        TableConstraint::Check {
            ..
        } => return None
    };
    let name = match (kind, constraint.name()) {
        (IndexKind::PrimaryKey, _) => CompactString::const_new("PRIMARY"),
        (_, Some(name)) => name.into(),
        (IndexKind::ForeignKey, None) => {
            let cols: Vec<&str> = columns.iter().map(CompactString::as_str).collect();
            format!("fk_{}_{}", table, cols.join("_")).into()
        }
        (_, None) => columns.first().cloned().unwrap_or_default()
    };
    Some(Index::new(&name, kind, columns.iter().cloned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_common_spellings() {
        assert_eq!(normalize_type("varchar(255)"), "VARCHAR");
        assert_eq!(normalize_type("INTEGER UNSIGNED"), "INT");
        assert_eq!(normalize_type("character varying(10)"), "VARCHAR");
        assert_eq!(normalize_type("timestamp with time zone"), "TIMESTAMP");
        assert_eq!(normalize_type("Double Precision"), "DOUBLE");
        assert_eq!(normalize_type("numeric(10,2)"), "DECIMAL");
    }

    #[test]
    fn test_type_families() {
        assert_eq!(type_family("BIGINT"), TypeFamily::Numeric);
        assert_eq!(type_family("VARCHAR"), TypeFamily::Text);
        assert_eq!(type_family("DATETIME"), TypeFamily::Temporal);
        assert_eq!(type_family("JSON"), TypeFamily::Other);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = InMemoryCatalog::new().with_table(
            Table::new("Orders")
                .with_column(Column::new("Customer_Id", "int"))
                .with_index(Index::new("idx_customer", IndexKind::Normal, ["customer_id"]))
        );
        let table = catalog.find_table("ORDERS").unwrap();
        assert!(table.column("customer_id").is_some());
        assert!(table.is_indexed("CUSTOMER_ID"));
        assert!(catalog.find_table("customers").is_none());
    }

    #[test]
    fn test_set_row_count_unknown_table() {
        let mut catalog = InMemoryCatalog::new().with_table(Table::new("t"));
        assert!(catalog.set_row_count("T", 10));
        assert!(!catalog.set_row_count("missing", 10));
        assert_eq!(catalog.find_table("t").unwrap().row_count, Some(10));
    }
}
