// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use sql_review::{
    catalog::{InMemoryCatalog, IndexKind, SchemaCatalog, TypeFamily},
    parse::SqlDialect
};

const SCHEMA: &str = r#"
CREATE TABLE users (
    id INT PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    created_at TIMESTAMP
);
CREATE INDEX idx_created ON users (created_at);

CREATE TABLE orders (
    id BIGINT,
    user_id INT,
    status VARCHAR(20),
    PRIMARY KEY (id),
    INDEX idx_user_status (user_id, status),
    FOREIGN KEY (user_id) REFERENCES users(id)
);
"#;

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::from_ddl(SCHEMA, SqlDialect::MySQL).unwrap()
}

#[test]
fn test_tables_in_declaration_order() {
    let catalog = catalog();
    let names: Vec<&str> = catalog.tables().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["users", "orders"]);
    assert_eq!(catalog.len(), 2);
    assert!(!catalog.is_empty());
}

#[test]
fn test_columns_and_types() {
    let catalog = catalog();
    let users = catalog.find_table("users").unwrap();

    let email = users.column("email").unwrap();
    assert_eq!(email.data_type, "VARCHAR");
    assert!(!email.nullable);
    assert_eq!(email.family(), TypeFamily::Text);

    let created = users.column("created_at").unwrap();
    assert!(created.nullable);
    assert_eq!(created.family(), TypeFamily::Temporal);

    assert!(!users.column("id").unwrap().nullable);
}

#[test]
fn test_column_level_indexes() {
    let catalog = catalog();
    let users = catalog.find_table("users").unwrap();

    let pk = users.indexes_on("id").next().unwrap();
    assert_eq!(pk.name, "PRIMARY");
    assert_eq!(pk.kind, IndexKind::PrimaryKey);

    let unique = users.indexes_on("email").next().unwrap();
    assert_eq!(unique.kind, IndexKind::Unique);

    let created = users.indexes_on("created_at").next().unwrap();
    assert_eq!(created.name, "idx_created");
    assert_eq!(created.kind, IndexKind::Normal);
}

#[test]
fn test_table_level_constraints() {
    let catalog = catalog();
    let orders = catalog.find_table("orders").unwrap();

    assert!(orders.is_indexed("id"));
    assert!(orders.is_indexed("status"));
    let on_user: Vec<&str> = orders
        .indexes_on("user_id")
        .map(|idx| idx.name.as_str())
        .collect();
    assert_eq!(on_user, vec!["idx_user_status", "fk_orders_user_id"]);
}

#[test]
fn test_alter_table_updates_catalog() {
    let sql = format!(
        "{}\nALTER TABLE users ADD COLUMN nickname VARCHAR(40);\nALTER TABLE users DROP COLUMN created_at;",
        SCHEMA
    );
    let catalog = InMemoryCatalog::from_ddl(&sql, SqlDialect::MySQL).unwrap();
    let users = catalog.find_table("users").unwrap();

    assert!(users.column("nickname").is_some());
    assert!(users.column("created_at").is_none());
}

#[test]
fn test_dropped_indexes_leave_catalog() {
    let sql = format!(
        "{}\nDROP INDEX idx_created ON users;\nALTER TABLE orders DROP INDEX idx_user_status;",
        SCHEMA
    );
    let catalog = InMemoryCatalog::from_ddl(&sql, SqlDialect::MySQL).unwrap();

    let users = catalog.find_table("users").unwrap();
    assert!(users.indexes.iter().all(|i| i.name != "idx_created"));
    let orders = catalog.find_table("orders").unwrap();
    assert!(orders.indexes.iter().all(|i| i.name != "idx_user_status"));
    assert!(orders.indexes_on("id").next().is_some());
}

#[test]
fn test_index_on_unknown_table_ignored() {
    let catalog = InMemoryCatalog::from_ddl(
        "CREATE INDEX idx_x ON ghosts (x); CREATE TABLE t (id INT PRIMARY KEY);",
        SqlDialect::Generic
    )
    .unwrap();
    assert_eq!(catalog.len(), 1);
}

#[test]
fn test_row_counts_start_unknown() {
    let mut catalog = catalog();
    assert_eq!(catalog.find_table("orders").unwrap().row_count, None);

    assert!(catalog.set_row_count("Orders", 2_500_000));
    assert_eq!(
        catalog.find_table("orders").unwrap().row_count,
        Some(2_500_000)
    );
}

#[test]
fn test_invalid_schema_is_error() {
    let result = InMemoryCatalog::from_ddl("CREATE TABLE (", SqlDialect::Generic);
    assert!(result.is_err());
}

#[test]
fn test_postgres_schema() {
    let catalog = InMemoryCatalog::from_ddl(
        "CREATE TABLE events (id SERIAL PRIMARY KEY, payload TEXT, at TIMESTAMPTZ NOT NULL);",
        SqlDialect::PostgreSQL
    )
    .unwrap();
    let events = catalog.find_table("events").unwrap();
    assert_eq!(events.column("at").unwrap().data_type, "TIMESTAMP");
    assert_eq!(events.column("id").unwrap().family(), TypeFamily::Numeric);
}
