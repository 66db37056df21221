use crate::{
    ast::{AlterOperation, AlterTable, Statement},
    catalog::{Table, normalize_type},
    context::ReviewContext,
    rules::{Reviewer, RuleCategory, RuleInfo, Severity, Suggestion}
};

/// ALTER TABLE together with its catalog table, when both are known
fn altered_table<'a>(ctx: &ReviewContext<'a>) -> Option<(&'a AlterTable, &'a Table)> {
    let Statement::AlterTable(alter) = ctx.statement else {
        return None;
    };
    let table = ctx.find_table(&alter.name)?;
    Some((alter, table))
}

/// Column type change on an existing table
pub struct RiskyTypeChange;

impl Reviewer for RiskyTypeChange {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "risky-type-change",
            name:     "Column type change",
            severity: Severity::Critical,
            category: RuleCategory::Migration
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let Some((alter, table)) = altered_table(ctx) else {
            return vec![];
        };
        let info = self.info();
        let mut out = Vec::new();
        for op in &alter.operations {
            let (name, declared) = match op {
                AlterOperation::ModifyColumn {
                    column,
                    data_type
                } => (column, data_type),
                AlterOperation::ChangeColumn {
                    old_name,
                    data_type,
                    ..
                } => (old_name, data_type),
                _ => continue
            };
            let Some(column) = table.column(name) else {
                continue;
            };
            let target = normalize_type(declared);
            if target == column.data_type {
                continue;
            }
            out.push(info.suggest(format!(
                "Changing `{}.{}` from {} to {} rewrites the whole table and may truncate or reject \
                 existing values; add a new column, backfill it, then switch over",
                table.name, column.name, column.data_type, target
            )));
        }
        out
    }
}

/// ADD COLUMN on a table above the large-table threshold
pub struct AddColumnLargeTable;

impl Reviewer for AddColumnLargeTable {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "add-column-large-table",
            name:     "ADD COLUMN on large table",
            severity: Severity::Critical,
            category: RuleCategory::Migration
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let Some((alter, table)) = altered_table(ctx) else {
            return vec![];
        };
        let Some(rows) = table.row_count else {
            return vec![];
        };
        let limit = ctx.thresholds().large_table_rows;
        if rows <= limit {
            return vec![];
        }
        let info = self.info();
        alter
            .operations
            .iter()
            .filter_map(|op| match op {
                AlterOperation::AddColumn(col) => Some(col),
                _ => None
            })
            .map(|col| {
                info.suggest(format!(
                    "Adding column `{}` to `{}` (~{} rows, threshold {}) may lock or copy the table; \
                     run it with an online schema change tool during low traffic",
                    col.name, table.name, rows, limit
                ))
            })
            .collect()
    }
}

/// DROP COLUMN of a column used by an index
pub struct DropColumnWithIndex;

impl Reviewer for DropColumnWithIndex {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "drop-column-with-index",
            name:     "DROP COLUMN used by index",
            severity: Severity::Critical,
            category: RuleCategory::Migration
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        let Some((alter, table)) = altered_table(ctx) else {
            return vec![];
        };
        let info = self.info();
        let mut out = Vec::new();
        for op in &alter.operations {
            let AlterOperation::DropColumn(column) = op else {
                continue;
            };
            let indexes: Vec<&str> = table
                .indexes_on(column)
                .map(|idx| idx.name.as_str())
                .collect();
            if indexes.is_empty() {
                continue;
            }
            out.push(info.suggest(format!(
                "Dropping `{}.{}` affects index(es) `{}`; review and drop or rebuild them first",
                table.name,
                column,
                indexes.join("`, `")
            )));
        }
        out
    }
}

/// DROP INDEX, standalone or inside ALTER TABLE
pub struct DropIndexVerification;

impl DropIndexVerification {
    fn finding(&self, index: &str, table: Option<&str>) -> Suggestion {
        let on = table.map(|t| format!(" on `{}`", t)).unwrap_or_default();
        self.info().suggest(format!(
            "Before dropping index `{}`{}, confirm in index usage statistics and the slow query log \
             that no query relies on it; consider making it invisible first",
            index, on
        ))
    }
}

impl Reviewer for DropIndexVerification {
    fn info(&self) -> RuleInfo {
        RuleInfo {
            id:       "drop-index-verification",
            name:     "DROP INDEX",
            severity: Severity::Critical,
            category: RuleCategory::Migration
        }
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Vec<Suggestion> {
        match ctx.statement {
            Statement::DropIndex(drop) => {
                let table = drop.table.as_ref().map(|t| t.to_string());
                drop.names
                    .iter()
                    .map(|name| self.finding(&name.to_string(), table.as_deref()))
                    .collect()
            }
            Statement::AlterTable(alter) => {
                let table = alter.name.to_string();
                alter
                    .operations
                    .iter()
                    .filter_map(|op| match op {
                        AlterOperation::DropIndex(name) => Some(self.finding(name, Some(&table))),
                        _ => None
                    })
                    .collect()
            }
            _ => vec![]
        }
    }
}
