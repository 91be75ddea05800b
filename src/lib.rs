pub mod ast;
pub mod context;
pub mod enrich;
pub mod ir;
pub mod output;
pub mod sql;
pub mod summary;
pub mod validator;

use wasm_bindgen::prelude::*;

use context::GenerationContext;
use ir::EnrichedDocument;
use output::WriteError;
use sql::{Dialect, SqlArtifacts, UnsupportedDialect};
use validator::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Dialect(#[from] UnsupportedDialect),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Parse, validate and enrich a metadata document.
pub fn load(source: &str) -> Result<EnrichedDocument, Error> {
    let value: serde_json::Value = serde_json::from_str(source)?;
    let validated = validator::validate(&value)?;
    Ok(enrich::enrich(validated))
}

/// Full pipeline from JSON text to SQL, stamped with the local clock.
///
/// `dialect` overrides the document's `database.type` when given.
pub fn generate(source: &str, dialect: Option<&str>) -> Result<SqlArtifacts, Error> {
    let document = load(source)?;
    let mut ctx = GenerationContext::now(&document);
    if let Some(name) = dialect {
        ctx = ctx.with_dialect(name.parse::<Dialect>()?);
    }
    Ok(sql::emit(&document, &ctx))
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Convert metadata JSON to the combined DDL script
#[wasm_bindgen(js_name = "metadataToSql")]
pub fn metadata_to_sql(source: &str, dialect: Option<String>) -> Result<String, String> {
    generate(source, dialect.as_deref())
        .map(|sql| sql.combined)
        .map_err(|e| e.to_string())
}

/// Fill in every default and return the enriched document as JSON
#[wasm_bindgen(js_name = "enrichMetadata")]
pub fn enrich_metadata(source: &str) -> Result<String, String> {
    let document = load(source).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&document).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOP: &str = r#"{
        "project": {"name": "Shop"},
        "database": {"type": "mysql"},
        "tables": {
            "orders": {"columns": {
                "id": {"type": "BIGINT", "constraints": {"primaryKey": true, "autoIncrement": true}},
                "user_id": {"type": "BIGINT", "foreignKey": {"table": "users"}}
            }},
            "users": {"columns": {
                "id": {"type": "BIGINT", "constraints": {"primaryKey": true, "autoIncrement": true}}
            }}
        }
    }"#;

    #[test]
    fn test_generate_with_dialect_override() {
        let sql = generate(SHOP, Some("postgres")).unwrap();
        assert!(sql.create_tables.contains("for postgresql"));
        assert!(sql.create_tables.contains("    id BIGSERIAL PRIMARY KEY"));
        assert!(sql.combined.contains("REFERENCES users(id)"));
    }

    #[test]
    fn test_unknown_dialect_override() {
        let err = generate(SHOP, Some("oracle")).unwrap_err();
        assert!(matches!(err, Error::Dialect(_)));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(load("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_schema_error_surfaces_path() {
        let err = load(r#"{"tables": {"users": {"columns": {"id": {}}}}}"#).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("$.tables.users.columns.id.type"));
    }

    #[test]
    fn test_wasm_entry_points() {
        let sql = metadata_to_sql(SHOP, None).unwrap();
        assert!(sql.contains("AUTO_INCREMENT"));
        assert!(metadata_to_sql("[]", None).is_err());

        let json = enrich_metadata(SHOP).unwrap();
        assert!(json.contains("\"defaultLanguage\": \"ja\""));
    }
}
