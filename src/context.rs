//! Per-run generation context.

use chrono::{Local, NaiveDateTime};

use crate::ir::EnrichedDocument;
use crate::sql::Dialect;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Inputs every emitter shares for one run: the clock reading, the target
/// dialect and the language list. Built once and passed down explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationContext {
    pub generated_at: NaiveDateTime,
    pub dialect: Dialect,
    pub default_language: String,
    pub languages: Vec<String>,
}

impl GenerationContext {
    pub fn new(document: &EnrichedDocument, generated_at: NaiveDateTime) -> Self {
        Self {
            generated_at,
            dialect: document.database.dialect,
            default_language: document.project.default_language.clone(),
            languages: document.project.supported_languages.clone(),
        }
    }

    /// Context stamped with the local wall clock.
    pub fn now(document: &EnrichedDocument) -> Self {
        Self::new(document, Local::now().naive_local())
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn timestamp(&self) -> String {
        self.generated_at.format(TIMESTAMP_FORMAT).to_string()
    }
}
