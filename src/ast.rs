//! Raw metadata document as written by the user.
//!
//! Everything apart from the table/column skeleton is optional here. The
//! enricher turns this into the fully populated form in [`crate::ir`].

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::sql::Dialect;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub project: Option<Project>,
    pub database: Option<Database>,
    pub tables: IndexMap<String, Table>,
    pub relations: Option<Vec<Map<String, Value>>>,
    pub ui: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub default_language: Option<String>,
    pub supported_languages: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    #[serde(rename = "type")]
    pub dialect: Option<Dialect>,
    /// ORM dialect class, e.g. `org.hibernate.dialect.MySQL8Dialect`
    #[serde(rename = "dialect")]
    pub orm_dialect: Option<String>,
    pub default_timezone: Option<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub metadata: Option<TableMetadata>,
    pub columns: IndexMap<String, Column>,
    pub primary_key: Option<PrimaryKey>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub icon: Option<String>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub sort_order: Option<i64>,
    pub labels: Option<IndexMap<String, String>>,
    pub description: Option<IndexMap<String, String>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(rename = "type")]
    pub base_type: BaseType,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub constraints: Option<Constraints>,
    pub labels: Option<IndexMap<String, String>>,
    pub ui: Option<UiHints>,
    pub validation: Option<Validation>,
    pub foreign_key: Option<ForeignKey>,
    /// Keys read by other generators (`helpText`, `autofill`, ...), kept as-is
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    pub nullable: Option<bool>,
    pub primary_key: Option<bool>,
    pub auto_increment: Option<bool>,
    pub unique: Option<bool>,
    pub default: Option<DefaultValue>,
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiHints {
    pub hidden: Option<bool>,
    pub readonly: Option<bool>,
    pub input_type: Option<String>,
    /// Hints this crate does not interpret (placeholder, options, ...)
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub required: Option<bool>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub table: String,
    pub column: Option<String>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Typed column default as it appears in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PrimaryKey {
    Single { column: String },
    Composite { columns: Vec<String> },
}

impl PrimaryKey {
    /// Build the descriptor for the given key columns, `None` when empty.
    pub fn from_columns(mut columns: Vec<String>) -> Option<Self> {
        match columns.len() {
            0 => None,
            1 => Some(Self::Single {
                column: columns.remove(0),
            }),
            _ => Some(Self::Composite { columns }),
        }
    }

    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::Single { column } => vec![column.as_str()],
            Self::Composite { columns } => columns.iter().map(|c| c.as_str()).collect(),
        }
    }

    pub fn is_single_on(&self, name: &str) -> bool {
        matches!(self, Self::Single { column } if column == name)
    }
}

/// Abstract column type vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Varchar,
    Char,
    Text,
    LongText,
    TinyInt,
    SmallInt,
    Int,
    Integer,
    BigInt,
    Decimal,
    Numeric,
    Float,
    Double,
    Boolean,
    Bool,
    Date,
    Time,
    DateTime,
    Timestamp,
    Blob,
    Json,
    Uuid,
}

impl BaseType {
    /// Parse a type name, ignoring case.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "VARCHAR" => Some(Self::Varchar),
            "CHAR" => Some(Self::Char),
            "TEXT" => Some(Self::Text),
            "LONGTEXT" => Some(Self::LongText),
            "TINYINT" => Some(Self::TinyInt),
            "SMALLINT" => Some(Self::SmallInt),
            "INT" => Some(Self::Int),
            "INTEGER" => Some(Self::Integer),
            "BIGINT" => Some(Self::BigInt),
            "DECIMAL" => Some(Self::Decimal),
            "NUMERIC" => Some(Self::Numeric),
            "FLOAT" => Some(Self::Float),
            "DOUBLE" => Some(Self::Double),
            "BOOLEAN" => Some(Self::Boolean),
            "BOOL" => Some(Self::Bool),
            "DATE" => Some(Self::Date),
            "TIME" => Some(Self::Time),
            "DATETIME" => Some(Self::DateTime),
            "TIMESTAMP" => Some(Self::Timestamp),
            "BLOB" => Some(Self::Blob),
            "JSON" => Some(Self::Json),
            "UUID" => Some(Self::Uuid),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Varchar => "VARCHAR",
            Self::Char => "CHAR",
            Self::Text => "TEXT",
            Self::LongText => "LONGTEXT",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Int => "INT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Decimal => "DECIMAL",
            Self::Numeric => "NUMERIC",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Boolean => "BOOLEAN",
            Self::Bool => "BOOL",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Blob => "BLOB",
            Self::Json => "JSON",
            Self::Uuid => "UUID",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Int | Self::Integer | Self::BigInt
        )
    }

    pub fn is_fractional(self) -> bool {
        matches!(self, Self::Decimal | Self::Numeric | Self::Float | Self::Double)
    }
}

impl Serialize for BaseType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BaseType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BaseType::from_str(&s)
            .ok_or_else(|| de::Error::custom(format!("unknown column type '{}'", s)))
    }
}

/// Foreign key `ON DELETE` / `ON UPDATE` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    #[default]
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
    NoAction,
}

impl ReferentialAction {
    /// Accepts `SET NULL`, `set_null` and `SET-NULL` alike.
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| if c == '_' || c == '-' { ' ' } else { c })
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        match normalized.as_str() {
            "RESTRICT" => Some(Self::Restrict),
            "CASCADE" => Some(Self::Cascade),
            "SET NULL" => Some(Self::SetNull),
            "SET DEFAULT" => Some(Self::SetDefault),
            "NO ACTION" => Some(Self::NoAction),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
            Self::NoAction => "NO ACTION",
        }
    }
}

impl Serialize for ReferentialAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_sql())
    }
}

impl<'de> Deserialize<'de> for ReferentialAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ReferentialAction::from_str(&s)
            .ok_or_else(|| de::Error::custom(format!("unknown referential action '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_type_case_insensitive() {
        assert_eq!(BaseType::from_str("varchar"), Some(BaseType::Varchar));
        assert_eq!(BaseType::from_str("LongText"), Some(BaseType::LongText));
        assert_eq!(BaseType::from_str("GEOMETRY"), None);
    }

    #[test]
    fn test_referential_action_spellings() {
        assert_eq!(
            ReferentialAction::from_str("set_null"),
            Some(ReferentialAction::SetNull)
        );
        assert_eq!(
            ReferentialAction::from_str("NO ACTION"),
            Some(ReferentialAction::NoAction)
        );
        assert_eq!(ReferentialAction::from_str("explode"), None);
    }

    #[test]
    fn test_default_value_untagged() {
        let v: DefaultValue = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(v, DefaultValue::Bool(true));
        let v: DefaultValue = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(v, DefaultValue::Int(42));
        let v: DefaultValue = serde_json::from_value(json!(1.5)).unwrap();
        assert_eq!(v, DefaultValue::Float(1.5));
        let v: DefaultValue = serde_json::from_value(json!("active")).unwrap();
        assert_eq!(v, DefaultValue::Str("active".into()));
    }

    #[test]
    fn test_primary_key_tagged() {
        let pk: PrimaryKey =
            serde_json::from_value(json!({"type": "composite", "columns": ["a", "b"]})).unwrap();
        assert_eq!(pk.columns(), vec!["a", "b"]);
        assert_eq!(
            serde_json::to_value(PrimaryKey::Single { column: "id".into() }).unwrap(),
            json!({"type": "single", "column": "id"})
        );
    }

    #[test]
    fn test_primary_key_from_columns() {
        assert_eq!(PrimaryKey::from_columns(vec![]), None);
        assert!(
            PrimaryKey::from_columns(vec!["id".into()])
                .unwrap()
                .is_single_on("id")
        );
    }
}
