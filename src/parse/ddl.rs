use compact_str::CompactString;
use sqlparser::ast as sql;

use super::object_name;
use crate::ast::{
    AlterOperation, AlterTable, ColumnDef, ColumnOption, CreateIndex, CreateTable, DropIndex,
    TableConstraint
};

pub fn convert_create_table(create: &sql::CreateTable) -> CreateTable {
    CreateTable {
        name:        object_name(&create.name),
        columns:     create.columns.iter().map(convert_column_def).collect(),
        constraints: create
            .constraints
            .iter()
            .filter_map(convert_constraint)
            .collect()
    }
}

fn convert_column_def(def: &sql::ColumnDef) -> ColumnDef {
    ColumnDef {
        name:      def.name.value.as_str().into(),
        data_type: def.data_type.to_string().into(),
        options:   def
            .options
            .iter()
            .map(|opt| convert_column_option(&opt.option))
            .collect()
    }
}

fn convert_column_option(option: &sql::ColumnOption) -> ColumnOption {
    match option {
        sql::ColumnOption::Null => ColumnOption::Null,
        sql::ColumnOption::NotNull => ColumnOption::NotNull,
        sql::ColumnOption::PrimaryKey(_) => ColumnOption::PrimaryKey,
        sql::ColumnOption::Unique(_) => ColumnOption::Unique,
        sql::ColumnOption::ForeignKey(fk) => ColumnOption::ForeignKey {
            foreign_table:    object_name(&fk.foreign_table),
            referred_columns: idents(&fk.referred_columns)
        },
        sql::ColumnOption::Default(expr) => ColumnOption::Default(expr.to_string()),
        other => ColumnOption::Other(other.to_string())
    }
}

fn convert_constraint(constraint: &sql::TableConstraint) -> Option<TableConstraint> {
    let converted = match constraint {
        sql::TableConstraint::PrimaryKey(pk) => TableConstraint::PrimaryKey {
            name:    ident_opt(pk.name.as_ref()),
            columns: index_columns(&pk.columns)
        },
        sql::TableConstraint::Unique(unique) => TableConstraint::Unique {
            name:    ident_opt(unique.name.as_ref().or(unique.index_name.as_ref())),
            columns: index_columns(&unique.columns)
        },
        sql::TableConstraint::Index(index) => TableConstraint::Index {
            name:    ident_opt(index.name.as_ref()),
            columns: index_columns(&index.columns)
        },
        sql::TableConstraint::ForeignKey(fk) => TableConstraint::ForeignKey {
            name:             ident_opt(fk.name.as_ref()),
            columns:          idents(&fk.columns),
            foreign_table:    object_name(&fk.foreign_table),
            referred_columns: idents(&fk.referred_columns)
        },
        sql::TableConstraint::Check(check) => TableConstraint::Check {
            name: ident_opt(check.name.as_ref()),
            expr: check.expr.to_string()
        },
        other => {
            tracing::debug!(sql = %other, "table constraint ignored");
            return None;
        }
    };
    Some(converted)
}

pub fn convert_create_index(create: &sql::CreateIndex) -> CreateIndex {
    CreateIndex {
        name:    create
            .name
            .as_ref()
            .map(|n| object_name(n).name().into()),
        table:   object_name(&create.table_name),
        columns: index_columns(&create.columns),
        unique:  create.unique
    }
}

fn index_columns(columns: &[sql::IndexColumn]) -> Vec<CompactString> {
    columns
        .iter()
        .map(|col| match &col.column.expr {
            sql::Expr::Identifier(ident) => ident.value.as_str().into(),
            other => index_column(&other.to_string())
        })
        .collect()
}

/// Column name from a rendered index key such as `email(20)` or `"Email"`
fn index_column(rendered: &str) -> CompactString {
    let first = rendered
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default();
    first.trim_matches(|c| c == '"' || c == '`').into()
}

pub fn convert_alter_table(
    name: &sql::ObjectName,
    operations: &[sql::AlterTableOperation]
) -> AlterTable {
    AlterTable {
        name:       object_name(name),
        operations: operations.iter().flat_map(convert_alter_operation).collect()
    }
}

fn convert_alter_operation(op: &sql::AlterTableOperation) -> Vec<AlterOperation> {
    let converted = match op {
        sql::AlterTableOperation::AddColumn {
            column_def, ..
        } => AlterOperation::AddColumn(convert_column_def(column_def)),
        sql::AlterTableOperation::DropColumn {
            column_names, ..
        } => {
            return column_names
                .iter()
                .map(|c| AlterOperation::DropColumn(c.value.as_str().into()))
                .collect();
        }
        sql::AlterTableOperation::ModifyColumn {
            col_name,
            data_type,
            ..
        } => AlterOperation::ModifyColumn {
            column:    col_name.value.as_str().into(),
            data_type: data_type.to_string().into()
        },
        sql::AlterTableOperation::ChangeColumn {
            old_name,
            new_name,
            data_type,
            ..
        } => AlterOperation::ChangeColumn {
            old_name:  old_name.value.as_str().into(),
            new_name:  new_name.value.as_str().into(),
            data_type: data_type.to_string().into()
        },
        sql::AlterTableOperation::AlterColumn {
            column_name,
            op: sql::AlterColumnOperation::SetDataType {
                data_type, ..
            }
        } => AlterOperation::ModifyColumn {
            column:    column_name.value.as_str().into(),
            data_type: data_type.to_string().into()
        },
        sql::AlterTableOperation::RenameColumn {
            old_column_name,
            new_column_name,
            ..
        } => AlterOperation::RenameColumn {
            old_name: old_column_name.value.as_str().into(),
            new_name: new_column_name.value.as_str().into()
        },
        sql::AlterTableOperation::AddConstraint {
            constraint, ..
        } => match convert_constraint(constraint) {
            Some(converted) => AlterOperation::AddConstraint(converted),
            None => AlterOperation::Other(constraint.to_string())
        },
        sql::AlterTableOperation::DropConstraint {
            name, ..
        } => AlterOperation::DropConstraint(name.value.as_str().into()),
        sql::AlterTableOperation::DropIndex {
            name
        } => AlterOperation::DropIndex(name.value.as_str().into()),
        other => AlterOperation::Other(other.to_string())
    };
    vec![converted]
}

pub fn convert_drop_index(
    names: &[sql::ObjectName],
    table: Option<&sql::ObjectName>
) -> DropIndex {
    DropIndex {
        names: names.iter().map(object_name).collect(),
        table: table.map(object_name)
    }
}

fn idents(idents: &[sql::Ident]) -> Vec<CompactString> {
    idents.iter().map(|i| i.value.as_str().into()).collect()
}

fn ident_opt(ident: Option<&sql::Ident>) -> Option<CompactString> {
    ident.map(|i| i.value.as_str().into())
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{AlterOperation, ColumnOption, Statement, TableConstraint},
        parse::{SqlDialect, parse_statement}
    };

    #[test]
    fn test_create_table_shapes() {
        let stmt = parse_statement(
            "CREATE TABLE orders (\
                id INT PRIMARY KEY, \
                customer_id INT REFERENCES customers(id), \
                note TEXT, \
                CONSTRAINT uq_note UNIQUE (note))",
            SqlDialect::Generic
        )
        .unwrap();
        let Statement::CreateTable(create) = stmt else {
            panic!("expected CREATE TABLE");
        };
        assert!(create.has_primary_key());
        assert!(matches!(
            create.columns[1].options[0],
            ColumnOption::ForeignKey { .. }
        ));
        assert_eq!(create.columns[2].data_type, "TEXT");
        assert!(matches!(
            &create.constraints[0],
            TableConstraint::Unique { name: Some(n), .. } if n == "uq_note"
        ));
    }

    #[test]
    fn test_mysql_alter_operations() {
        let stmt = parse_statement(
            "ALTER TABLE users MODIFY COLUMN age BIGINT, CHANGE nick nickname VARCHAR(64), DROP COLUMN legacy",
            SqlDialect::MySQL
        )
        .unwrap();
        let Statement::AlterTable(alter) = stmt else {
            panic!("expected ALTER TABLE");
        };
        assert!(matches!(
            &alter.operations[0],
            AlterOperation::ModifyColumn { column, data_type } if column == "age" && data_type == "BIGINT"
        ));
        assert!(matches!(
            &alter.operations[1],
            AlterOperation::ChangeColumn { new_name, .. } if new_name == "nickname"
        ));
        assert!(matches!(&alter.operations[2], AlterOperation::DropColumn(c) if c == "legacy"));
    }

    #[test]
    fn test_postgres_alter_column_type() {
        let stmt = parse_statement(
            "ALTER TABLE users ALTER COLUMN age TYPE BIGINT",
            SqlDialect::PostgreSQL
        )
        .unwrap();
        let Statement::AlterTable(alter) = stmt else {
            panic!("expected ALTER TABLE");
        };
        assert!(matches!(
            &alter.operations[0],
            AlterOperation::ModifyColumn { column, .. } if column == "age"
        ));
    }

    #[test]
    fn test_create_index_columns() {
        let stmt = parse_statement(
            "CREATE UNIQUE INDEX idx_email ON users (email DESC, tenant_id)",
            SqlDialect::Generic
        )
        .unwrap();
        let Statement::CreateIndex(create) = stmt else {
            panic!("expected CREATE INDEX");
        };
        assert!(create.unique);
        assert_eq!(create.name.as_deref(), Some("idx_email"));
        assert_eq!(create.columns, vec!["email", "tenant_id"]);
    }
}
