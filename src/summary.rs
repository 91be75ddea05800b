//! Human-readable overview of an enriched document.

use unicode_width::UnicodeWidthStr;

use crate::ir::EnrichedDocument;

/// Render the project header and one line per table.
///
/// Labels and table names are padded by display width, so full-width labels
/// line up with ASCII ones in a terminal.
pub fn render(document: &EnrichedDocument) -> String {
    let project = &document.project;
    let mut out = String::new();

    out.push_str(&format!("Project: {}\n", project.name));
    out.push_str(&format!("Version: {}\n", project.version));
    out.push_str(&format!(
        "Languages: {} (default: {})\n",
        project.supported_languages.join(", "),
        project.default_language
    ));
    out.push_str(&format!("Dialect: {}\n", document.database.dialect));
    out.push_str(&format!("\nTables: {}\n", document.tables.len()));

    let rows: Vec<(&str, &str, &str, usize)> = document
        .tables
        .iter()
        .map(|(name, table)| {
            let label = document.default_label(&table.metadata.labels, name);
            (
                table.metadata.icon.as_str(),
                label,
                name.as_str(),
                table.columns.len(),
            )
        })
        .collect();

    let label_width = rows.iter().map(|r| r.1.width()).max().unwrap_or(0);
    let name_width = rows.iter().map(|r| r.2.width()).max().unwrap_or(0);

    for (icon, label, name, columns) in rows {
        out.push_str(&format!(
            "  {} {}  {}  {} {}\n",
            icon,
            pad(label, label_width),
            pad(name, name_width),
            columns,
            if columns == 1 { "column" } else { "columns" }
        ));
    }
    out
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;
    use crate::validator::validate;
    use serde_json::json;

    fn doc() -> EnrichedDocument {
        enrich(
            validate(&json!({
                "project": {"name": "Shop"},
                "tables": {
                    "users": {
                        "metadata": {"icon": "U", "labels": {"ja": "ユーザー"}},
                        "columns": {"id": {"type": "INT"}, "email": {"type": "VARCHAR"}}
                    },
                    "order_items": {
                        "metadata": {"icon": "O", "labels": {"ja": "Items"}},
                        "columns": {"id": {"type": "INT"}}
                    }
                }
            }))
            .unwrap(),
        )
    }

    #[test]
    fn test_header() {
        let text = render(&doc());
        assert!(text.starts_with(
            "Project: Shop\nVersion: 1.0.0\nLanguages: ja, en (default: ja)\nDialect: mysql\n\nTables: 2\n"
        ));
    }

    #[test]
    fn test_rows_align_by_display_width() {
        let text = render(&doc());
        // "ユーザー" is 8 columns wide, "Items" is 5.
        assert!(text.contains("  U ユーザー  users        2 columns\n"));
        assert!(text.contains("  O Items     order_items  1 column\n"));
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad("表", 4), "表  ");
        assert_eq!(pad("abc", 2), "abc");
    }
}
