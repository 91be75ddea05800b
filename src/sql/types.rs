//! Abstract column type to dialect type mapping.

use super::Dialect;
use super::dialect::AutoIncrement;
use crate::ast::BaseType;
use crate::ir::ColumnDef;

const DEFAULT_VARCHAR_LENGTH: u32 = 255;

/// Map an abstract type plus size to the dialect's spelling.
///
/// An explicit length wins over precision; substitutions only apply to bare types.
pub fn map_type(
    base: BaseType,
    length: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
    dialect: Dialect,
) -> String {
    if let Some(length) = length {
        return format!("{}({})", base.as_str(), length);
    }

    if let Some(precision) = precision {
        return match scale {
            Some(scale) => format!("{}({},{})", base.as_str(), precision, scale),
            None => format!("{}({})", base.as_str(), precision),
        };
    }

    if let Some(substitute) = dialect.substitute(base) {
        return substitute.to_string();
    }

    match base {
        BaseType::Varchar => format!("VARCHAR({})", DEFAULT_VARCHAR_LENGTH),
        other => other.as_str().to_string(),
    }
}

/// Rendered type of a column, with serial substitution applied first.
pub fn column_type(column: &ColumnDef, dialect: Dialect) -> String {
    if column.constraints.auto_increment {
        if let AutoIncrement::Serial { int, bigint } = dialect.spec().auto_increment {
            return if column.base_type == BaseType::BigInt {
                bigint.to_string()
            } else {
                int.to_string()
            };
        }
    }

    map_type(
        column.base_type,
        column.length,
        column.precision,
        column.scale,
        dialect,
    )
}

/// Keyword appended after the type for auto-increment columns, if the dialect uses one.
pub fn auto_increment_modifier(column: &ColumnDef, dialect: Dialect) -> Option<&'static str> {
    if !column.constraints.auto_increment {
        return None;
    }
    match dialect.spec().auto_increment {
        AutoIncrement::Modifier(keyword) => Some(keyword),
        AutoIncrement::Serial { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;
    use crate::validator::validate;
    use serde_json::{Value, json};

    fn column(def: Value) -> ColumnDef {
        let doc = enrich(validate(&json!({"tables": {"t": {"columns": {"c": def}}}})).unwrap());
        doc.tables["t"].columns["c"].clone()
    }

    #[test]
    fn test_varchar_default_length() {
        assert_eq!(
            map_type(BaseType::Varchar, None, None, None, Dialect::MySQL),
            "VARCHAR(255)"
        );
        assert_eq!(
            map_type(BaseType::Varchar, Some(64), None, None, Dialect::MySQL),
            "VARCHAR(64)"
        );
    }

    #[test]
    fn test_precision_and_scale() {
        assert_eq!(
            map_type(BaseType::Decimal, None, Some(10), Some(2), Dialect::MySQL),
            "DECIMAL(10,2)"
        );
        assert_eq!(
            map_type(BaseType::Decimal, None, Some(10), None, Dialect::PostgreSQL),
            "DECIMAL(10)"
        );
    }

    #[test]
    fn test_length_wins_over_precision() {
        assert_eq!(
            map_type(BaseType::Char, Some(2), Some(10), Some(2), Dialect::MySQL),
            "CHAR(2)"
        );
    }

    #[test]
    fn test_dialect_substitutions() {
        assert_eq!(map_type(BaseType::Text, None, None, None, Dialect::H2), "LONGTEXT");
        assert_eq!(
            map_type(BaseType::LongText, None, None, None, Dialect::PostgreSQL),
            "TEXT"
        );
        assert_eq!(
            map_type(BaseType::DateTime, None, None, None, Dialect::PostgreSQL),
            "TIMESTAMP"
        );
        assert_eq!(map_type(BaseType::Text, None, None, None, Dialect::MySQL), "TEXT");
    }

    #[test]
    fn test_postgres_serial_replaces_type() {
        let id = column(json!({"type": "BIGINT", "constraints": {"autoIncrement": true}}));
        assert_eq!(column_type(&id, Dialect::PostgreSQL), "BIGSERIAL");
        assert_eq!(auto_increment_modifier(&id, Dialect::PostgreSQL), None);

        let id = column(json!({"type": "INT", "precision": 11, "constraints": {"autoIncrement": true}}));
        assert_eq!(column_type(&id, Dialect::PostgreSQL), "SERIAL");
    }

    #[test]
    fn test_mysql_keeps_type_and_appends_modifier() {
        let id = column(json!({"type": "BIGINT", "constraints": {"autoIncrement": true}}));
        assert_eq!(column_type(&id, Dialect::MySQL), "BIGINT");
        assert_eq!(auto_increment_modifier(&id, Dialect::MySQL), Some("AUTO_INCREMENT"));
        assert_eq!(auto_increment_modifier(&id, Dialect::H2), Some("AUTO_INCREMENT"));
    }

    #[test]
    fn test_plain_column_has_no_modifier() {
        let name = column(json!({"type": "VARCHAR", "length": 100}));
        assert_eq!(column_type(&name, Dialect::PostgreSQL), "VARCHAR(100)");
        assert_eq!(auto_increment_modifier(&name, Dialect::MySQL), None);
    }
}
