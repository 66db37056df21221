use crate::{
    ast::{AlterOperation, ColumnOption, CreateTable, Statement, TableConstraint},
    catalog::{is_large_object_type, normalize_type},
    context::ReviewContext,
    rules::{Reviewer, RuleCategory, RuleInfo, Severity, Suggestion}
};

fn create_table<'a>(ctx: &ReviewContext<'a>) -> Option<&'a CreateTable> {
    match ctx.statement {
        Statement::CreateTable(create) => Some(create),
        _ => None
    }
}

/// CREATE TABLE without any primary key
pub struct MissingPrimaryKey;

impl Reviewer for MissingPrimaryKey {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "missing-primary-key",
            name:     "Table without primary key",
            severity: Severity::Blocker,
            category: RuleCategory::Schema
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        match create_table(ctx) {
            Some(create) if !create.has_primary_key() => vec![self.info().suggest(format!(
                "Table `{}` has no primary key; declare one (for example an auto-increment `id`) \
                 so rows can be addressed and replicated safely",
                create.name
            ))],
            _ => vec![]
        }
    }
}

/// Secondary index count over the configured limit
pub struct TooManyIndexes;

impl Reviewer for TooManyIndexes {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "too-many-indexes",
            name:     "Too many indexes",
            severity: Severity::Minor,
            category: RuleCategory::Schema
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let Some(create) = create_table(ctx) else {
            return vec![];
        };
        let table_level = create
            .constraints
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    TableConstraint::Index {
                        ..
                    } | TableConstraint::Unique {
                        ..
                    }
                )
            })
            .count();
        let column_level = create
            .columns
            .iter()
            .filter(|col| col.options.contains(&ColumnOption::Unique))
            .count();
        let count = table_level + column_level;
        let max = ctx.thresholds().max_table_indexes;
        if count <= max {
            return vec![];
        }
        vec![self.info().suggest(format!(
            "Table `{}` declares {} secondary indexes (limit {}); every index slows down writes, \
             keep only those backing real query patterns",
            create.name, count, max
        ))]
    }
}

/// TEXT/BLOB column types
pub struct OversizedFieldType;

impl Reviewer for OversizedFieldType {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "oversized-field-type",
            name:     "Large object column",
            severity: Severity::Minor,
            category: RuleCategory::Schema
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let Some(create) = create_table(ctx) else {
            return vec![];
        };
        let info = self.info();
        create
            .columns
            .iter()
            .filter(|col| is_large_object_type(&normalize_type(&col.data_type)))
            .map(|col| {
                info.suggest(format!(
                    "Column `{}.{}` is declared {}; large objects are stored off-row and slow down scans, \
                     use a bounded VARCHAR or move the payload to a separate table",
                    create.name, col.name, col.data_type
                ))
            })
            .collect()
    }
}

/// Foreign keys declared by CREATE TABLE or added by ALTER TABLE
pub struct AvoidForeignKey;

impl AvoidForeignKey {
    fn finding(&self, table: &str, columns: &str, target: &str) -> Suggestion {
        self.info().suggest(format!(
            "Foreign key on `{}` ({}) referencing `{}` adds locking and cascades on every write; \
             enforce the relation in the application instead",
            table, columns, target
        ))
    }

    fn constraint(&self, table: &str, constraint: &TableConstraint) -> Option<Suggestion> {
        let TableConstraint::ForeignKey {
            columns,
            foreign_table,
            ..
        } = constraint
        else {
            return None;
        };
        let columns: Vec<&str> = columns.iter().map(|c| c.as_str()).collect();
        Some(self.finding(table, &columns.join(", "), &foreign_table.to_string()))
    }
}

impl Reviewer for AvoidForeignKey {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "avoid-foreign-key",
            name:     "Foreign key constraint",
            severity: Severity::Critical,
            category: RuleCategory::Schema
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let mut out = Vec::new();
        match ctx.statement {
            Statement::CreateTable(create) => {
                let table = create.name.to_string();
                for col in &create.columns {
                    for option in &col.options {
                        if let ColumnOption::ForeignKey {
                            foreign_table, ..
                        } = option
                        {
                            out.push(self.finding(&table, &col.name, &foreign_table.to_string()));
                        }
                    }
                }
                for constraint in &create.constraints {
                    if let Some(found) = self.constraint(&table, constraint) {
                        out.push(found);
                    }
                }
            }
            Statement::AlterTable(alter) => {
                let table = alter.name.to_string();
                for op in &alter.operations {
                    match op {
                        AlterOperation::AddConstraint(constraint) => {
                            if let Some(found) = self.constraint(&table, constraint) {
                                out.push(found);
                            }
                        }
                        AlterOperation::AddColumn(col) => {
                            for option in &col.options {
                                if let ColumnOption::ForeignKey {
                                    foreign_table, ..
                                } = option
                                {
                                    out.push(self.finding(
                                        &table,
                                        &col.name,
                                        &foreign_table.to_string()
                                    ));
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        out
    }
}
