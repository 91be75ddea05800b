//! Enriched, fully populated metadata document.
//!
//! This is the canonical form shared by every consumer: the DDL emitter in this
//! crate and the downstream message/UI generators that read the exported JSON.
//! It serializes back into the same shape the validator accepts.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

pub use crate::ast::{BaseType, DefaultValue, PrimaryKey, ReferentialAction};
use crate::sql::Dialect;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedDocument {
    pub project: ProjectInfo,
    pub database: DatabaseInfo,
    pub tables: IndexMap<String, TableDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub default_language: String,
    pub supported_languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfo {
    #[serde(rename = "type")]
    pub dialect: Dialect,
    #[serde(rename = "dialect")]
    pub orm_dialect: String,
    pub default_timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDef {
    pub metadata: TableMeta,
    pub columns: IndexMap<String, ColumnDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<PrimaryKey>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMeta {
    pub icon: String,
    pub color: String,
    pub sort_order: i64,
    pub category: String,
    pub labels: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub description: IndexMap<String, String>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    #[serde(rename = "type")]
    pub base_type: BaseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    pub constraints: ConstraintSet,
    pub labels: IndexMap<String, String>,
    pub ui: UiConfig,
    pub validation: ValidationRules,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKeyRef>,
    /// Unrecognized column keys, passed through for downstream generators
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintSet {
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    pub hidden: bool,
    pub readonly: bool,
    pub input_type: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    pub required: bool,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl EnrichedDocument {
    /// Default-language entry of `labels`, or `fallback` when missing.
    pub fn default_label<'a>(
        &'a self,
        labels: &'a IndexMap<String, String>,
        fallback: &'a str,
    ) -> &'a str {
        labels
            .get(&self.project.default_language)
            .map(|s| s.as_str())
            .unwrap_or(fallback)
    }
}

impl TableDef {
    pub fn has_foreign_keys(&self) -> bool {
        self.columns.values().any(|c| c.foreign_key.is_some())
    }

    /// Foreign keys in column declaration order.
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&str, &ForeignKeyRef)> {
        self.columns
            .iter()
            .filter_map(|(name, c)| c.foreign_key.as_ref().map(|fk| (name.as_str(), fk)))
    }

    /// Declared or inferred key; a table without one falls back to its `id` column.
    pub fn effective_primary_key(&self) -> Option<PrimaryKey> {
        self.primary_key.clone().or_else(|| {
            self.columns.contains_key("id").then(|| PrimaryKey::Single {
                column: "id".to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;
    use crate::validator::validate;
    use serde_json::json;

    fn enriched(value: Value) -> EnrichedDocument {
        enrich(validate(&value).unwrap())
    }

    #[test]
    fn test_foreign_keys_in_declaration_order() {
        let doc = enriched(json!({
            "tables": {
                "order_items": {
                    "columns": {
                        "product_id": {"type": "INT", "foreignKey": {"table": "products"}},
                        "qty": {"type": "INT"},
                        "order_id": {"type": "INT", "foreignKey": {"table": "orders"}}
                    }
                }
            }
        }));
        let table = &doc.tables["order_items"];
        assert!(table.has_foreign_keys());
        let names: Vec<&str> = table.foreign_keys().map(|(c, _)| c).collect();
        assert_eq!(names, vec!["product_id", "order_id"]);
    }

    #[test]
    fn test_effective_primary_key_falls_back_to_id() {
        let doc = enriched(json!({
            "tables": {
                "tags": {"columns": {"id": {"type": "INT"}, "name": {"type": "VARCHAR"}}},
                "notes": {"columns": {"body": {"type": "TEXT"}}}
            }
        }));
        assert_eq!(doc.tables["tags"].primary_key, None);
        assert_eq!(
            doc.tables["tags"].effective_primary_key(),
            Some(PrimaryKey::Single { column: "id".into() })
        );
        assert_eq!(doc.tables["notes"].effective_primary_key(), None);
    }

    #[test]
    fn test_serializes_in_input_shape() {
        let doc = enriched(json!({
            "tables": {"users": {"columns": {"id": {"type": "bigint"}}}}
        }));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["database"]["type"], json!("mysql"));
        assert_eq!(value["tables"]["users"]["columns"]["id"]["type"], json!("BIGINT"));
        assert_eq!(
            value["tables"]["users"]["columns"]["id"]["ui"]["inputType"],
            json!("number")
        );
    }
}
