//! DDL rendering: CREATE TABLE bodies, indexes and foreign keys.
//!
//! Foreign keys are never rendered inline. They go to their own `ALTER TABLE`
//! batch so that every referenced table exists by the time it runs.

use super::order::order;
use super::types::{auto_increment_modifier, column_type};
use crate::ast::{DefaultValue, PrimaryKey};
use crate::context::GenerationContext;
use crate::ir::{ColumnDef, EnrichedDocument, TableDef};

/// Defaults rendered verbatim instead of quoted. Matched exactly, case included.
const KEYWORD_DEFAULTS: [&str; 3] = ["CURRENT_TIMESTAMP", "NOW()", "NULL"];

/// Rendered SQL, one field per output file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SqlArtifacts {
    pub create_tables: String,
    /// Empty when no column is unique or foreign-keyed.
    pub indexes: String,
    /// Empty when no column carries a foreign key.
    pub foreign_keys: String,
    pub combined: String,
}

/// Render all DDL for `document` in the context's dialect.
pub fn emit(document: &EnrichedDocument, ctx: &GenerationContext) -> SqlArtifacts {
    let create_tables = create_tables(document, ctx);
    let indexes = indexes(document);
    let foreign_keys = foreign_keys(document);

    let combined = [&create_tables, &indexes, &foreign_keys]
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    SqlArtifacts {
        create_tables,
        indexes,
        foreign_keys,
        combined,
    }
}

fn create_tables(document: &EnrichedDocument, ctx: &GenerationContext) -> String {
    let mut parts = vec![
        format!("-- Generated CREATE TABLE statements for {}", ctx.dialect),
        format!("-- Project: {}", document.project.name),
        format!("-- Generated at: {}", ctx.timestamp()),
        String::new(),
    ];

    for name in order(&document.tables) {
        let table = &document.tables[name];
        parts.push(table_sql(name, table, ctx));
        parts.push(String::new());
    }

    parts.join("\n")
}

fn table_sql(name: &str, table: &TableDef, ctx: &GenerationContext) -> String {
    let mut lines = table_comments(table, ctx);
    lines.push(format!("CREATE TABLE IF NOT EXISTS {} (", name));

    let primary_key = table.effective_primary_key();
    let mut clauses: Vec<String> = table
        .columns
        .iter()
        .map(|(col_name, column)| {
            let single_pk = primary_key
                .as_ref()
                .is_some_and(|pk| pk.is_single_on(col_name));
            format!("    {}", column_sql(col_name, column, single_pk, ctx))
        })
        .collect();

    if let Some(PrimaryKey::Composite { columns }) = &primary_key {
        clauses.push(format!("    PRIMARY KEY ({})", columns.join(", ")));
    }

    lines.push(clauses.join(",\n"));
    lines.push(");".to_string());
    lines.join("\n")
}

/// Label comments in supported-language order, then the description.
fn table_comments(table: &TableDef, ctx: &GenerationContext) -> Vec<String> {
    let mut seen: Vec<&str> = Vec::new();
    let mut lines = Vec::new();

    for lang in &ctx.languages {
        if let Some(label) = table.metadata.labels.get(lang) {
            if !seen.contains(&label.as_str()) {
                seen.push(label);
                lines.push(format!("-- {}", single_line(label)));
            }
        }
    }
    if let Some(description) = table.metadata.description.get(&ctx.default_language) {
        lines.push(format!("-- {}", single_line(description)));
    }
    lines
}

fn column_sql(name: &str, column: &ColumnDef, single_pk: bool, ctx: &GenerationContext) -> String {
    let dialect = ctx.dialect;
    let constraints = &column.constraints;
    let mut parts = vec![name.to_string(), column_type(column, dialect)];

    if let Some(modifier) = auto_increment_modifier(column, dialect) {
        parts.push(modifier.to_string());
    }
    if !constraints.nullable {
        parts.push("NOT NULL".to_string());
    }
    if single_pk {
        parts.push("PRIMARY KEY".to_string());
    }
    if constraints.unique {
        parts.push("UNIQUE".to_string());
    }
    if let Some(default) = &constraints.default {
        parts.push(format!("DEFAULT {}", render_default(default)));
    }
    if let Some(action) = &constraints.on_update {
        if dialect.spec().column_on_update {
            parts.push(format!("ON UPDATE {}", action));
        }
    }

    parts.join(" ")
}

pub fn render_default(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Str(s) if KEYWORD_DEFAULTS.contains(&s.as_str()) => s.clone(),
        DefaultValue::Str(s) => format!("'{}'", s.replace('\'', "''")),
        DefaultValue::Int(n) => n.to_string(),
        DefaultValue::Float(f) => f.to_string(),
        DefaultValue::Bool(true) => "TRUE".to_string(),
        DefaultValue::Bool(false) => "FALSE".to_string(),
    }
}

fn indexes(document: &EnrichedDocument) -> String {
    let mut statements = Vec::new();

    for (table_name, table) in &document.tables {
        for (col_name, column) in &table.columns {
            if column.constraints.unique {
                statements.push(format!(
                    "CREATE UNIQUE INDEX idx_{t}_{c}_unique ON {t} ({c});",
                    t = table_name,
                    c = col_name
                ));
            }
            if column.foreign_key.is_some() {
                statements.push(format!(
                    "CREATE INDEX idx_{t}_{c}_fk ON {t} ({c});",
                    t = table_name,
                    c = col_name
                ));
            }
        }
    }

    if statements.is_empty() {
        return String::new();
    }
    let mut sql = String::from("-- Generated INDEX statements\n\n");
    sql.push_str(&statements.join("\n"));
    sql.push('\n');
    sql
}

fn foreign_keys(document: &EnrichedDocument) -> String {
    let mut statements = Vec::new();

    for (table_name, table) in &document.tables {
        for (col_name, fk) in table.foreign_keys() {
            statements.push(format!(
                "ALTER TABLE {t}\n    ADD CONSTRAINT fk_{t}_{c}\n    FOREIGN KEY ({c})\n    REFERENCES {rt}({rc})\n    ON DELETE {del}\n    ON UPDATE {upd};",
                t = table_name,
                c = col_name,
                rt = fk.table,
                rc = fk.column,
                del = fk.on_delete.as_sql(),
                upd = fk.on_update.as_sql(),
            ));
        }
    }

    if statements.is_empty() {
        return String::new();
    }
    let mut sql = String::from("-- Generated FOREIGN KEY constraints\n\n");
    sql.push_str(&statements.join("\n\n"));
    sql.push('\n');
    sql
}

fn single_line(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(" ")
}
