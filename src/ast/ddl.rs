use compact_str::CompactString;
use serde::Serialize;

use super::ObjectName;

/// `CREATE TABLE name (columns, constraints)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTable {
    pub name:        ObjectName,
    pub columns:     Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>
}

impl CreateTable {
    /// Primary key declared either on a column or as a table constraint
    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(ColumnDef::is_primary_key)
            || self.constraints.iter().any(|c| {
                matches!(
                    c,
                    TableConstraint::PrimaryKey {
                        ..
                    }
                )
            })
    }
}

/// Column definition inside CREATE TABLE or ALTER TABLE.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub name:      CompactString,
    /// Declared type as written, e.g. `VARCHAR(255)`
    pub data_type: CompactString,
    pub options:   Vec<ColumnOption>
}

impl ColumnDef {
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name:      name.into(),
            data_type: data_type.into(),
            options:   Vec::new()
        }
    }

    pub fn with_option(mut self, option: ColumnOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn is_primary_key(&self) -> bool {
        self.options
            .iter()
            .any(|opt| matches!(opt, ColumnOption::PrimaryKey))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ColumnOption {
    Null,
    NotNull,
    PrimaryKey,
    Unique,
    /// Inline `REFERENCES table (columns)`
    ForeignKey {
        foreign_table:    ObjectName,
        referred_columns: Vec<CompactString>
    },
    Default(String),
    Other(String)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableConstraint {
    PrimaryKey {
        name:    Option<CompactString>,
        columns: Vec<CompactString>
    },
    Unique {
        name:    Option<CompactString>,
        columns: Vec<CompactString>
    },
    /// MySQL `INDEX`/`KEY` inside CREATE TABLE
    Index {
        name:    Option<CompactString>,
        columns: Vec<CompactString>
    },
    ForeignKey {
        name:             Option<CompactString>,
        columns:          Vec<CompactString>,
        foreign_table:    ObjectName,
        referred_columns: Vec<CompactString>
    },
    Check {
        name: Option<CompactString>,
        expr: String
    }
}

impl TableConstraint {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::PrimaryKey {
                name, ..
            }
            | Self::Unique {
                name, ..
            }
            | Self::Index {
                name, ..
            }
            | Self::ForeignKey {
                name, ..
            }
            | Self::Check {
                name, ..
            } => name.as_deref()
        }
    }
}

/// `ALTER TABLE name operation, operation, …`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlterTable {
    pub name:       ObjectName,
    pub operations: Vec<AlterOperation>
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AlterOperation {
    AddColumn(ColumnDef),
    DropColumn(CompactString),
    /// `MODIFY [COLUMN] c type` or `ALTER COLUMN c [SET DATA] TYPE type`
    ModifyColumn {
        column:    CompactString,
        data_type: CompactString
    },
    /// `CHANGE [COLUMN] old new type`
    ChangeColumn {
        old_name:  CompactString,
        new_name:  CompactString,
        data_type: CompactString
    },
    RenameColumn {
        old_name: CompactString,
        new_name: CompactString
    },
    AddConstraint(TableConstraint),
    DropConstraint(CompactString),
    DropIndex(CompactString),
    Other(String)
}

/// `CREATE [UNIQUE] INDEX [name] ON table (columns)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateIndex {
    pub name:    Option<CompactString>,
    pub table:   ObjectName,
    pub columns: Vec<CompactString>,
    pub unique:  bool
}

/// `DROP INDEX name [, name …] [ON table]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropIndex {
    pub names: Vec<ObjectName>,
    pub table: Option<ObjectName>
}
