//! Metadata enrichment: every default is decided here, once.
//!
//! The rules run in a fixed order (project, database, then each table and its
//! columns) because table and column labels depend on the resolved default
//! language.

use indexmap::IndexMap;
use log::debug;

use crate::ast::{self, BaseType, Document, PrimaryKey};
use crate::ir::{
    ColumnDef, ConstraintSet, DatabaseInfo, EnrichedDocument, ForeignKeyRef, ProjectInfo,
    TableDef, TableMeta, UiConfig, ValidationRules,
};
use crate::sql::Dialect;
use crate::validator::ValidatedDocument;

pub const DEFAULT_PROJECT_NAME: &str = "Generated CRUD System";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_LANGUAGE: &str = "ja";
pub const DEFAULT_SUPPORTED_LANGUAGES: [&str; 2] = ["ja", "en"];
pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";
pub const DEFAULT_ICON: &str = "🗄️";
pub const DEFAULT_COLOR: &str = "#4A90E2";
pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_FK_COLUMN: &str = "id";

/// Form input kinds the enricher can infer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Email,
    Tel,
    Url,
    Password,
    Date,
    DateTime,
    Number,
    Checkbox,
    Textarea,
    Text,
}

impl InputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Password => "password",
            Self::Date => "date",
            Self::DateTime => "datetime-local",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Textarea => "textarea",
            Self::Text => "text",
        }
    }
}

/// Fill every gap of a validated document. Never fails.
pub fn enrich(validated: ValidatedDocument) -> EnrichedDocument {
    let document: Document = validated.into_document();

    let project = enrich_project(document.project.unwrap_or_default());
    let database = enrich_database(document.database.unwrap_or_default());

    let tables = document
        .tables
        .into_iter()
        .map(|(name, table)| {
            let table = enrich_table(&name, table, &project.default_language);
            (name, table)
        })
        .collect();

    EnrichedDocument {
        project,
        database,
        tables,
        relations: document.relations.unwrap_or_default(),
        ui: document.ui,
    }
}

fn enrich_project(project: ast::Project) -> ProjectInfo {
    let default_language = project
        .default_language
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let mut supported_languages: Vec<String> = Vec::new();
    let declared = project.supported_languages.unwrap_or_else(|| {
        DEFAULT_SUPPORTED_LANGUAGES
            .iter()
            .map(|s| s.to_string())
            .collect()
    });
    for lang in declared {
        if !supported_languages.contains(&lang) {
            supported_languages.push(lang);
        }
    }
    if !supported_languages.contains(&default_language) {
        debug!(
            "default language '{}' missing from supported languages, appending",
            default_language
        );
        supported_languages.push(default_language.clone());
    }

    ProjectInfo {
        name: project
            .name
            .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string()),
        version: project.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        description: project.description,
        default_language,
        supported_languages,
    }
}

fn enrich_database(database: ast::Database) -> DatabaseInfo {
    let dialect = database.dialect.unwrap_or(Dialect::MySQL);
    DatabaseInfo {
        dialect,
        orm_dialect: database
            .orm_dialect
            .unwrap_or_else(|| dialect.spec().orm_dialect.to_string()),
        default_timezone: database
            .default_timezone
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
        charset: database.charset,
        collation: database.collation,
    }
}

fn enrich_table(name: &str, table: ast::Table, default_lang: &str) -> TableDef {
    let metadata = table.metadata.unwrap_or_default();
    let mut labels = metadata.labels.unwrap_or_default();
    if !labels.contains_key(default_lang) {
        labels.insert(default_lang.to_string(), title_label(name));
    }

    let meta = TableMeta {
        icon: metadata.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        color: metadata.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        sort_order: metadata.sort_order.unwrap_or(0),
        category: metadata
            .category
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        labels,
        description: metadata.description.unwrap_or_default(),
        extra: metadata.extra,
    };

    let columns: IndexMap<String, ColumnDef> = table
        .columns
        .into_iter()
        .map(|(col_name, column)| {
            let column = enrich_column(&col_name, column, default_lang);
            (col_name, column)
        })
        .collect();

    let flagged: Vec<String> = columns
        .iter()
        .filter(|(_, c)| c.constraints.primary_key)
        .map(|(n, _)| n.clone())
        .collect();
    let primary_key = PrimaryKey::from_columns(flagged).or(table.primary_key);
    debug!("table '{}': primary key {:?}", name, primary_key);

    TableDef {
        metadata: meta,
        columns,
        primary_key,
        extra: table.extra,
    }
}

fn enrich_column(name: &str, column: ast::Column, default_lang: &str) -> ColumnDef {
    let constraints = column.constraints.unwrap_or_default();
    let constraints = ConstraintSet {
        nullable: constraints.nullable.unwrap_or(true),
        primary_key: constraints.primary_key.unwrap_or(false),
        auto_increment: constraints.auto_increment.unwrap_or(false),
        unique: constraints.unique.unwrap_or(false),
        default: constraints.default,
        on_update: constraints.on_update,
    };

    let mut labels = column.labels.unwrap_or_default();
    if !labels.contains_key(default_lang) {
        labels.insert(default_lang.to_string(), title_label(name));
    }

    let hints = column.ui.unwrap_or_default();
    let ui = UiConfig {
        hidden: hints.hidden.unwrap_or(false),
        readonly: hints.readonly.unwrap_or(false),
        input_type: hints
            .input_type
            .unwrap_or_else(|| infer_input_type(name, column.base_type).as_str().to_string()),
        extra: hints.extra,
    };

    let rules = column.validation.unwrap_or_default();
    let validation = ValidationRules {
        required: !constraints.nullable || rules.required.unwrap_or(false),
        extra: rules.extra,
    };

    let foreign_key = column.foreign_key.map(|fk| ForeignKeyRef {
        table: fk.table,
        column: fk.column.unwrap_or_else(|| DEFAULT_FK_COLUMN.to_string()),
        on_delete: fk.on_delete.unwrap_or_default(),
        on_update: fk.on_update.unwrap_or_default(),
        extra: fk.extra,
    });

    ColumnDef {
        base_type: column.base_type,
        length: column.length,
        precision: column.precision,
        scale: column.scale,
        constraints,
        labels,
        ui,
        validation,
        foreign_key,
        extra: column.extra,
    }
}

/// Infer the form input kind. Column-name rules win over type rules.
pub fn infer_input_type(column: &str, base: BaseType) -> InputKind {
    let lower = column.to_lowercase();

    if lower.contains("email") {
        return InputKind::Email;
    }
    if lower.contains("phone") || lower.contains("tel") {
        return InputKind::Tel;
    }
    if lower.contains("url") || lower.contains("website") {
        return InputKind::Url;
    }
    if lower.contains("password") {
        return InputKind::Password;
    }
    if lower.contains("date") {
        return InputKind::Date;
    }
    if lower.contains("time") {
        return InputKind::DateTime;
    }

    match base {
        b if b.is_integer() || b.is_fractional() => InputKind::Number,
        BaseType::Boolean | BaseType::Bool => InputKind::Checkbox,
        BaseType::Text | BaseType::LongText => InputKind::Textarea,
        BaseType::Date => InputKind::Date,
        BaseType::DateTime | BaseType::Timestamp => InputKind::DateTime,
        _ => InputKind::Text,
    }
}

/// `order_items` -> `Order Items`.
///
/// A letter is upper-cased when it follows a non-letter and lower-cased
/// otherwise, so `user2fa` becomes `User2Fa`.
pub fn title_label(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_is_letter = false;
    for c in name.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
