//! Table creation order.
//!
//! Tables without foreign keys come first, tables with at least one come
//! second, each group in declaration order. This is a two-bucket partition,
//! not a topological sort: a chain `a -> b -> c` or a cycle can still end up
//! with a referrer ahead of its target. The emitter compensates by using
//! `CREATE TABLE IF NOT EXISTS` and adding every constraint in a separate
//! `ALTER TABLE` batch after all table bodies.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::ir::TableDef;

/// Creation order for `tables`.
pub fn order(tables: &IndexMap<String, TableDef>) -> Vec<&str> {
    let mut sorted: Vec<&str> = Vec::with_capacity(tables.len());
    let mut dependent: Vec<&str> = Vec::new();
    for (name, table) in tables {
        if table.has_foreign_keys() {
            dependent.push(name);
        } else {
            sorted.push(name);
        }
    }
    sorted.extend(dependent);

    for (from, to) in late_references(&sorted, tables) {
        debug!(
            "table '{}' is created before the table '{}' it references",
            from, to
        );
    }
    debug!("table order: {}", sorted.join(", "));
    sorted
}

/// Foreign keys whose target is created after (or is the same as) the referrer.
///
/// Targets not declared in the document are reported with a warning and skipped.
pub fn late_references<'a>(
    sorted: &[&'a str],
    tables: &'a IndexMap<String, TableDef>,
) -> Vec<(&'a str, &'a str)> {
    let mut created: HashSet<&str> = HashSet::new();
    let mut late = Vec::new();

    for &name in sorted {
        let Some(table) = tables.get(name) else {
            continue;
        };
        for (column, fk) in table.foreign_keys() {
            if !tables.contains_key(&fk.table) {
                warn!(
                    "{}.{} references table '{}' which is not declared",
                    name, column, fk.table
                );
            } else if !created.contains(fk.table.as_str()) {
                late.push((name, fk.table.as_str()));
            }
        }
        created.insert(name);
    }

    late
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;
    use crate::ir::EnrichedDocument;
    use crate::validator::validate;
    use serde_json::{Value, json};

    fn enriched(value: Value) -> EnrichedDocument {
        enrich(validate(&value).unwrap())
    }

    #[test]
    fn test_independent_tables_first() {
        let doc = enriched(json!({
            "tables": {
                "orders": {"columns": {"user_id": {"type": "INT", "foreignKey": {"table": "users"}}}},
                "users": {"columns": {"id": {"type": "INT"}}}
            }
        }));
        assert_eq!(order(&doc.tables), vec!["users", "orders"]);
    }

    #[test]
    fn test_buckets_keep_declaration_order() {
        let doc = enriched(json!({
            "tables": {
                "b_child": {"columns": {"a_id": {"type": "INT", "foreignKey": {"table": "a"}}}},
                "z": {"columns": {"id": {"type": "INT"}}},
                "a_child": {"columns": {"z_id": {"type": "INT", "foreignKey": {"table": "z"}}}},
                "a": {"columns": {"id": {"type": "INT"}}}
            }
        }));
        assert_eq!(order(&doc.tables), vec!["z", "a", "b_child", "a_child"]);
    }

    #[test]
    fn test_deep_chain_is_not_topologically_sorted() {
        let doc = enriched(json!({
            "tables": {
                "line_items": {"columns": {"order_id": {"type": "INT", "foreignKey": {"table": "orders"}}}},
                "orders": {"columns": {"user_id": {"type": "INT", "foreignKey": {"table": "users"}}}},
                "users": {"columns": {"id": {"type": "INT"}}}
            }
        }));
        let sorted = order(&doc.tables);
        assert_eq!(sorted, vec!["users", "line_items", "orders"]);
        assert_eq!(
            late_references(&sorted, &doc.tables),
            vec![("line_items", "orders")]
        );
    }

    #[test]
    fn test_cycle_is_tolerated() {
        let doc = enriched(json!({
            "tables": {
                "a": {"columns": {"b_id": {"type": "INT", "foreignKey": {"table": "b"}}}},
                "b": {"columns": {"a_id": {"type": "INT", "foreignKey": {"table": "a"}}}}
            }
        }));
        assert_eq!(order(&doc.tables), vec!["a", "b"]);
    }

    #[test]
    fn test_self_reference_is_late() {
        let doc = enriched(json!({
            "tables": {
                "categories": {"columns": {
                    "id": {"type": "INT"},
                    "parent_id": {"type": "INT", "foreignKey": {"table": "categories"}}
                }}
            }
        }));
        let sorted = order(&doc.tables);
        assert_eq!(
            late_references(&sorted, &doc.tables),
            vec![("categories", "categories")]
        );
    }

    #[test]
    fn test_undeclared_target_is_skipped() {
        let doc = enriched(json!({
            "tables": {
                "orders": {"columns": {"user_id": {"type": "INT", "foreignKey": {"table": "users"}}}}
            }
        }));
        let sorted = order(&doc.tables);
        assert_eq!(sorted, vec!["orders"]);
        assert!(late_references(&sorted, &doc.tables).is_empty());
    }
}
