//! Artifact files on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::ir::EnrichedDocument;
use crate::sql::SqlArtifacts;

pub const ENRICHED_FILE_NAME: &str = "metadata.enriched.json";

#[derive(Debug, thiserror::Error)]
#[error("Failed to write {}: {source}", .path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    CreateTables,
    Indexes,
    ForeignKeys,
    Combined,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::CreateTables,
        ArtifactKind::Indexes,
        ArtifactKind::ForeignKeys,
        ArtifactKind::Combined,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::CreateTables => "create_tables.sql",
            Self::Indexes => "create_indexes.sql",
            Self::ForeignKeys => "create_foreign_keys.sql",
            Self::Combined => "table_definitions.sql",
        }
    }

    pub fn content(self, artifacts: &SqlArtifacts) -> &str {
        match self {
            Self::CreateTables => &artifacts.create_tables,
            Self::Indexes => &artifacts.indexes,
            Self::ForeignKeys => &artifacts.foreign_keys,
            Self::Combined => &artifacts.combined,
        }
    }
}

/// Write every non-empty artifact under `dir`, creating it if needed.
///
/// An empty section's file is removed if an earlier run left one behind, so
/// the directory always matches the latest generation.
///
/// Returns the written files in [`ArtifactKind::ALL`] order.
pub fn write_artifacts(
    artifacts: &SqlArtifacts,
    dir: &Path,
) -> Result<Vec<(ArtifactKind, PathBuf)>, WriteError> {
    create_dir(dir)?;

    let mut written = Vec::new();
    for kind in ArtifactKind::ALL {
        let content = kind.content(artifacts);
        let path = dir.join(kind.file_name());
        if content.trim().is_empty() {
            debug!("skipping empty {}", kind.file_name());
            remove_stale(&path)?;
            continue;
        }
        write_file(&path, content)?;
        written.push((kind, path));
    }
    Ok(written)
}

/// Export the enriched document as pretty-printed JSON.
pub fn write_enriched(document: &EnrichedDocument, dir: &Path) -> Result<PathBuf, WriteError> {
    create_dir(dir)?;
    let path = dir.join(ENRICHED_FILE_NAME);
    let json = serde_json::to_string_pretty(document).map_err(|e| WriteError {
        path: path.clone(),
        source: io::Error::other(e),
    })?;
    write_file(&path, &json)?;
    Ok(path)
}

fn create_dir(dir: &Path) -> Result<(), WriteError> {
    fs::create_dir_all(dir).map_err(|source| WriteError {
        path: dir.to_path_buf(),
        source,
    })
}

fn remove_stale(path: &Path) -> Result<(), WriteError> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(WriteError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), WriteError> {
    fs::write(path, content).map_err(|source| WriteError {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;
    use crate::validator::validate;
    use serde_json::json;

    fn artifacts(indexes: &str, foreign_keys: &str) -> SqlArtifacts {
        SqlArtifacts {
            create_tables: "CREATE TABLE IF NOT EXISTS t (\n    id INT\n);\n".to_string(),
            indexes: indexes.to_string(),
            foreign_keys: foreign_keys.to_string(),
            combined: "combined\n".to_string(),
        }
    }

    #[test]
    fn test_writes_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let sql = artifacts("-- idx\n", "-- fk\n");
        let written = write_artifacts(&sql, dir.path()).unwrap();
        let kinds: Vec<ArtifactKind> = written.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, ArtifactKind::ALL.to_vec());
        assert_eq!(
            fs::read_to_string(dir.path().join("create_foreign_keys.sql")).unwrap(),
            "-- fk\n"
        );
    }

    #[test]
    fn test_empty_sections_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_artifacts(&artifacts("", ""), dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("create_tables.sql").exists());
        assert!(dir.path().join("table_definitions.sql").exists());
        assert!(!dir.path().join("create_indexes.sql").exists());
        assert!(!dir.path().join("create_foreign_keys.sql").exists());
    }

    #[test]
    fn test_stale_sections_removed() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(&artifacts("-- idx\n", "-- fk\n"), dir.path()).unwrap();
        assert!(dir.path().join("create_indexes.sql").exists());

        let written = write_artifacts(&artifacts("", ""), dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(!dir.path().join("create_indexes.sql").exists());
        assert!(!dir.path().join("create_foreign_keys.sql").exists());
        assert!(dir.path().join("create_tables.sql").exists());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("sql");
        write_artifacts(&artifacts("", ""), &nested).unwrap();
        assert!(nested.join("create_tables.sql").exists());
    }

    #[test]
    fn test_write_error_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = write_artifacts(&artifacts("", ""), &blocker).unwrap_err();
        assert_eq!(err.path, blocker);
    }

    #[test]
    fn test_enriched_export() {
        let dir = tempfile::tempdir().unwrap();
        let doc = enrich(
            validate(&json!({"tables": {"users": {"columns": {"email": {"type": "VARCHAR"}}}}}))
                .unwrap(),
        );
        let path = write_enriched(&doc, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), ENRICHED_FILE_NAME);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value["tables"]["users"]["columns"]["email"]["ui"]["inputType"],
            json!("email")
        );
        assert_eq!(value["project"]["name"], json!("Generated CRUD System"));
    }
}
