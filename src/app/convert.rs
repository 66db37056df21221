//! Conversions from CLI value enums to library types.

use crate::{
    cli::{Dialect, Format},
    output::OutputFormat,
    parse::SqlDialect
};

/// Map a CLI dialect to the parser dialect.
///
/// ```
/// use sql_review::{app::convert_dialect, cli::Dialect, parse::SqlDialect};
///
/// assert_eq!(convert_dialect(Dialect::Postgresql), SqlDialect::PostgreSQL);
/// ```
pub fn convert_dialect(dialect: Dialect) -> SqlDialect {
    match dialect {
        Dialect::Generic => SqlDialect::Generic,
        Dialect::Mysql => SqlDialect::MySQL,
        Dialect::Postgresql => SqlDialect::PostgreSQL,
        Dialect::Sqlite => SqlDialect::SQLite
    }
}

pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_dialect_all() {
        assert_eq!(convert_dialect(Dialect::Generic), SqlDialect::Generic);
        assert_eq!(convert_dialect(Dialect::Mysql), SqlDialect::MySQL);
        assert_eq!(convert_dialect(Dialect::Postgresql), SqlDialect::PostgreSQL);
        assert_eq!(convert_dialect(Dialect::Sqlite), SqlDialect::SQLite);
    }

    #[test]
    fn test_convert_format_json() {
        assert!(matches!(convert_format(Format::Json), OutputFormat::Json));
    }

    #[test]
    fn test_convert_format_yaml() {
        assert!(matches!(convert_format(Format::Yaml), OutputFormat::Yaml));
    }
}
