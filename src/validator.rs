//! Structural validation of a raw metadata document.
//!
//! The walk mirrors the document shape and reports the first violation with a
//! `$.tables.<table>.columns.<column>.<field>` path. Only after the walk
//! succeeds is the JSON turned into the typed [`Document`].

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::ast::{BaseType, Document, ReferentialAction};
use crate::sql::{Dialect, UnsupportedDialect};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {reason}")]
pub struct SchemaError {
    pub path: String,
    pub reason: String,
}

impl SchemaError {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    fn missing(path: &str, field: &str) -> Self {
        Self::new(&child(path, field), "required field is missing")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Schema error at {0}")]
    Schema(#[from] SchemaError),
    #[error("{source} at {path}")]
    Dialect {
        path: String,
        source: UnsupportedDialect,
    },
}

/// A document that passed [`validate`]; the only input the enricher accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocument(Document);

impl ValidatedDocument {
    pub fn document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

/// Validate a raw JSON document against the metadata contract.
pub fn validate(value: &Value) -> Result<ValidatedDocument, ValidationError> {
    let root = expect_object(value, "$")?;

    if let Some(project) = field(root, "project") {
        check_project(project, "$.project")?;
    }
    if let Some(database) = field(root, "database") {
        check_database(database, "$.database")?;
    }
    let tables = field(root, "tables").ok_or_else(|| SchemaError::missing("$", "tables"))?;
    check_tables(tables, "$.tables")?;
    if let Some(relations) = field(root, "relations") {
        let items = expect_array(relations, "$.relations")?;
        for (i, item) in items.iter().enumerate() {
            expect_object(item, &format!("$.relations[{}]", i))?;
        }
    }
    if let Some(ui) = field(root, "ui") {
        expect_object(ui, "$.ui")?;
    }

    // Every shape the typed model relies on was checked above.
    let mut normalized = value.clone();
    normalize_integers(&mut normalized);
    let document: Document =
        serde_json::from_value(normalized).map_err(|e| SchemaError::new("$", e.to_string()))?;
    debug!("validated metadata with {} table(s)", document.tables.len());
    Ok(ValidatedDocument(document))
}

fn check_project(value: &Value, path: &str) -> Result<(), SchemaError> {
    let project = expect_object(value, path)?;
    for key in ["name", "version", "description", "defaultLanguage"] {
        optional_string(project, key, path)?;
    }
    if let Some(langs) = field(project, "supportedLanguages") {
        let langs_path = child(path, "supportedLanguages");
        for (i, lang) in expect_array(langs, &langs_path)?.iter().enumerate() {
            expect_string(lang, &format!("{}[{}]", langs_path, i))?;
        }
    }
    Ok(())
}

fn check_database(value: &Value, path: &str) -> Result<(), ValidationError> {
    let database = expect_object(value, path)?;
    if let Some(kind) = optional_string(database, "type", path)? {
        kind.parse::<Dialect>()
            .map_err(|source| ValidationError::Dialect {
                path: child(path, "type"),
                source,
            })?;
    }
    for key in ["dialect", "defaultTimezone", "charset", "collation"] {
        optional_string(database, key, path)?;
    }
    Ok(())
}

fn check_tables(value: &Value, path: &str) -> Result<(), SchemaError> {
    let tables = expect_object(value, path)?;
    for (name, table) in tables {
        let table_path = child(path, name);
        expect_identifier(name, &table_path, "table name")?;
        check_table(table, &table_path)?;
    }
    Ok(())
}

fn check_table(value: &Value, path: &str) -> Result<(), SchemaError> {
    let table = expect_object(value, path)?;

    if let Some(metadata) = field(table, "metadata") {
        check_table_metadata(metadata, &child(path, "metadata"))?;
    }

    let columns_path = child(path, "columns");
    let columns = field(table, "columns").ok_or_else(|| SchemaError::missing(path, "columns"))?;
    let columns = expect_object(columns, &columns_path)?;
    for (name, column) in columns {
        let column_path = child(&columns_path, name);
        expect_identifier(name, &column_path, "column name")?;
        check_column(column, &column_path)?;
    }

    if let Some(pk) = field(table, "primaryKey") {
        check_primary_key(pk, &child(path, "primaryKey"), columns)?;
    }
    Ok(())
}

fn check_table_metadata(value: &Value, path: &str) -> Result<(), SchemaError> {
    let metadata = expect_object(value, path)?;
    for key in ["icon", "color", "category"] {
        optional_string(metadata, key, path)?;
    }
    if let Some(order) = field(metadata, "sortOrder") {
        if as_integer(order).is_none() {
            return Err(SchemaError::new(&child(path, "sortOrder"), "expected an integer"));
        }
    }
    for key in ["labels", "description"] {
        if let Some(map) = field(metadata, key) {
            expect_string_map(map, &child(path, key))?;
        }
    }
    Ok(())
}

fn check_column(value: &Value, path: &str) -> Result<(), SchemaError> {
    let column = expect_object(value, path)?;

    let type_path = child(path, "type");
    let base = field(column, "type").ok_or_else(|| SchemaError::missing(path, "type"))?;
    let base = expect_string(base, &type_path)?;
    if BaseType::from_str(base).is_none() {
        return Err(SchemaError::new(
            &type_path,
            format!("unknown column type '{}'", base),
        ));
    }

    for key in ["length", "precision", "scale"] {
        optional_size(column, key, path)?;
    }

    if let Some(constraints) = field(column, "constraints") {
        let constraints_path = child(path, "constraints");
        let constraints = expect_object(constraints, &constraints_path)?;
        for key in ["nullable", "primaryKey", "autoIncrement", "unique"] {
            optional_bool(constraints, key, &constraints_path)?;
        }
        if let Some(default) = field(constraints, "default") {
            if default.is_object() || default.is_array() {
                return Err(SchemaError::new(
                    &child(&constraints_path, "default"),
                    "expected a string, number or boolean",
                ));
            }
        }
        optional_string(constraints, "onUpdate", &constraints_path)?;
    }

    if let Some(labels) = field(column, "labels") {
        expect_string_map(labels, &child(path, "labels"))?;
    }

    if let Some(ui) = field(column, "ui") {
        let ui_path = child(path, "ui");
        let ui = expect_object(ui, &ui_path)?;
        optional_bool(ui, "hidden", &ui_path)?;
        optional_bool(ui, "readonly", &ui_path)?;
        optional_string(ui, "inputType", &ui_path)?;
    }

    if let Some(validation) = field(column, "validation") {
        let validation_path = child(path, "validation");
        let validation = expect_object(validation, &validation_path)?;
        optional_bool(validation, "required", &validation_path)?;
    }

    if let Some(fk) = field(column, "foreignKey") {
        check_foreign_key(fk, &child(path, "foreignKey"))?;
    }
    Ok(())
}

fn check_foreign_key(value: &Value, path: &str) -> Result<(), SchemaError> {
    let fk = expect_object(value, path)?;

    let table_path = child(path, "table");
    let table = field(fk, "table").ok_or_else(|| SchemaError::missing(path, "table"))?;
    expect_identifier(expect_string(table, &table_path)?, &table_path, "table name")?;

    if let Some(column) = optional_string(fk, "column", path)? {
        expect_identifier(column, &child(path, "column"), "column name")?;
    }

    for key in ["onDelete", "onUpdate"] {
        if let Some(action) = optional_string(fk, key, path)? {
            if ReferentialAction::from_str(action).is_none() {
                return Err(SchemaError::new(
                    &child(path, key),
                    format!("unknown referential action '{}'", action),
                ));
            }
        }
    }
    Ok(())
}

fn check_primary_key(
    value: &Value,
    path: &str,
    columns: &Map<String, Value>,
) -> Result<(), SchemaError> {
    let pk = expect_object(value, path)?;
    let kind_path = child(path, "type");
    let kind = field(pk, "type").ok_or_else(|| SchemaError::missing(path, "type"))?;

    let named: Vec<(String, &str)> = match expect_string(kind, &kind_path)? {
        "single" => {
            let column_path = child(path, "column");
            let column = field(pk, "column").ok_or_else(|| SchemaError::missing(path, "column"))?;
            vec![(column_path.clone(), expect_string(column, &column_path)?)]
        }
        "composite" => {
            let columns_path = child(path, "columns");
            let list = field(pk, "columns").ok_or_else(|| SchemaError::missing(path, "columns"))?;
            let list = expect_array(list, &columns_path)?;
            if list.is_empty() {
                return Err(SchemaError::new(&columns_path, "expected at least one column"));
            }
            list.iter()
                .enumerate()
                .map(|(i, c)| {
                    let item_path = format!("{}[{}]", columns_path, i);
                    expect_string(c, &item_path).map(|name| (item_path, name))
                })
                .collect::<Result<_, _>>()?
        }
        other => {
            return Err(SchemaError::new(
                &kind_path,
                format!("expected 'single' or 'composite', found '{}'", other),
            ));
        }
    };

    for (item_path, name) in named {
        if !columns.contains_key(name) {
            return Err(SchemaError::new(
                &item_path,
                format!("primary key column '{}' is not defined in this table", name),
            ));
        }
    }
    Ok(())
}

fn child(path: &str, key: &str) -> String {
    format!("{}.{}", path, key)
}

/// A present, non-null field.
fn field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| !v.is_null())
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaError> {
    value
        .as_object()
        .ok_or_else(|| SchemaError::new(path, format!("expected object, found {}", describe(value))))
}

fn expect_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, SchemaError> {
    value
        .as_array()
        .ok_or_else(|| SchemaError::new(path, format!("expected array, found {}", describe(value))))
}

fn expect_string<'a>(value: &'a Value, path: &str) -> Result<&'a str, SchemaError> {
    value
        .as_str()
        .ok_or_else(|| SchemaError::new(path, format!("expected string, found {}", describe(value))))
}

fn expect_identifier(name: &str, path: &str, what: &str) -> Result<(), SchemaError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(SchemaError::new(
            path,
            format!("{} '{}' must match [A-Za-z_][A-Za-z0-9_]*", what, name),
        ))
    }
}

fn expect_string_map(value: &Value, path: &str) -> Result<(), SchemaError> {
    for (key, entry) in expect_object(value, path)? {
        expect_string(entry, &child(path, key))?;
    }
    Ok(())
}

fn optional_string<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<&'a str>, SchemaError> {
    field(object, key)
        .map(|v| expect_string(v, &child(path, key)))
        .transpose()
}

fn optional_bool(object: &Map<String, Value>, key: &str, path: &str) -> Result<(), SchemaError> {
    match field(object, key) {
        Some(v) if !v.is_boolean() => Err(SchemaError::new(
            &child(path, key),
            format!("expected boolean, found {}", describe(v)),
        )),
        _ => Ok(()),
    }
}

fn optional_size(object: &Map<String, Value>, key: &str, path: &str) -> Result<(), SchemaError> {
    match field(object, key) {
        Some(v) if as_integer(v).is_none_or(|n| !(0..=u32::MAX as i64).contains(&n)) => {
            Err(SchemaError::new(
                &child(path, key),
                format!("expected a non-negative integer, found {}", v),
            ))
        }
        _ => Ok(()),
    }
}

/// Integer value of `value`; floats count when they have no fractional part.
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Rewrite integral floats such as `11.0` in integer-typed fields as integers.
fn normalize_integers(root: &mut Value) {
    let Some(tables) = root.get_mut("tables").and_then(Value::as_object_mut) else {
        return;
    };
    for table in tables.values_mut() {
        if let Some(metadata) = table.get_mut("metadata").and_then(Value::as_object_mut) {
            normalize_field(metadata, "sortOrder");
        }
        let Some(columns) = table.get_mut("columns").and_then(Value::as_object_mut) else {
            continue;
        };
        for column in columns.values_mut().filter_map(Value::as_object_mut) {
            for key in ["length", "precision", "scale"] {
                normalize_field(column, key);
            }
        }
    }
}

fn normalize_field(object: &mut Map<String, Value>, key: &str) {
    if let Some(value) = object.get_mut(key) {
        if value.is_f64() {
            if let Some(n) = as_integer(value) {
                *value = Value::from(n);
            }
        }
    }
}
