//! Dot-path traversal over table-like nodes.
//!
//! A section path is a dot-separated sequence of keys naming a nested node,
//! e.g. `"build.env"`. Both traversal directions share the same descent;
//! they differ only in the policy applied to a missing segment: the read
//! side reports absence, the write side creates an empty table.

use toml_edit::{Item, Table, TableLike};

use crate::error::{DocumentError, Result};

/// Look up the node at `path`, one key per dot-separated segment.
///
/// Returns `None` if any segment is missing or a non-final segment holds a
/// value that cannot contain keys. Never creates intermediate structure.
pub(crate) fn lookup<'a>(root: &'a Table, path: &str) -> Option<&'a Item> {
    let mut segments = path.split('.');
    let last = segments.next_back()?;

    let mut current: &dyn TableLike = root;
    for segment in segments {
        current = current.get(segment)?.as_table_like()?;
    }
    current.get(last)
}

/// Look up the table at `path`, creating an empty table at each missing
/// segment. Returns the final table together with the number of tables
/// created, so the caller can record whether the tree changed.
///
/// Tables created for intermediate segments stay implicit (no header is
/// emitted until they hold keys of their own); the final segment's table
/// is explicit. A segment holding a plain value is an error.
pub(crate) fn lookup_or_create<'a>(
    root: &'a mut Table,
    path: &str,
) -> Result<(&'a mut dyn TableLike, usize)> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut created = 0;

    let mut current: &mut dyn TableLike = root;
    for (i, &segment) in segments.iter().enumerate() {
        current = current
            .entry(segment)
            .or_insert_with(|| {
                created += 1;
                let mut table = Table::new();
                table.set_implicit(i + 1 < segments.len());
                Item::Table(table)
            })
            .as_table_like_mut()
            .ok_or_else(|| DocumentError::NotASection {
                path: path.to_string(),
                segment: segment.to_string(),
            })?;
    }
    Ok((current, created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use toml_edit::{DocumentMut, Value};

    fn parse(input: &str) -> DocumentMut {
        input.parse().unwrap()
    }

    // -----------------------------------------------------------------------
    // Read traversal
    // -----------------------------------------------------------------------

    #[test]
    fn lookup_finds_nested_value() {
        let doc = parse("[a.b]\nc = 5\n");
        let item = lookup(doc.as_table(), "a.b").unwrap();
        assert!(item.is_table());
        assert_eq!(
            lookup(doc.as_table(), "a.b")
                .and_then(|i| i.as_table_like())
                .and_then(|t| t.get("c"))
                .and_then(Item::as_integer),
            Some(5)
        );
    }

    #[test]
    fn lookup_missing_segment_is_none() {
        let doc = parse("[a]\nx = 1\n");
        assert!(lookup(doc.as_table(), "a.b").is_none());
        assert!(lookup(doc.as_table(), "z").is_none());
    }

    #[test]
    fn lookup_through_scalar_is_none() {
        let doc = parse("a = 1\n");
        assert!(lookup(doc.as_table(), "a.b").is_none());
    }

    #[test]
    fn lookup_final_segment_may_be_scalar() {
        let doc = parse("[s]\nv = \"x\"\n");
        let item = lookup(doc.as_table(), "s.v").unwrap();
        assert_eq!(item.as_str(), Some("x"));
    }

    // -----------------------------------------------------------------------
    // Create-on-missing traversal
    // -----------------------------------------------------------------------

    #[test]
    fn creates_missing_chain() {
        let mut doc = parse("");
        let (table, created) = lookup_or_create(doc.as_table_mut(), "a.b.c").unwrap();
        assert_eq!(created, 3);
        assert!(table.is_empty());
        assert!(lookup(doc.as_table(), "a.b.c").is_some());
    }

    #[test]
    fn existing_chain_creates_nothing() {
        let mut doc = parse("[a.b]\nx = 1\n");
        let (_, created) = lookup_or_create(doc.as_table_mut(), "a.b").unwrap();
        assert_eq!(created, 0);
    }

    #[test]
    fn intermediate_tables_stay_implicit() {
        let mut doc = parse("");
        let (table, _) = lookup_or_create(doc.as_table_mut(), "a.b.c").unwrap();
        table.insert("x", Item::Value(Value::from(1_i64)));

        let rendered = doc.to_string();
        assert!(rendered.contains("[a.b.c]"));
        assert!(!rendered.contains("[a]\n"));
        assert!(!rendered.contains("[a.b]\n"));
    }

    #[test]
    fn scalar_segment_is_an_error() {
        let mut doc = parse("a = 1\n");
        let err = match lookup_or_create(doc.as_table_mut(), "a.b") {
            Err(e) => e,
            Ok(_) => panic!("expected lookup_or_create to fail on a scalar segment"),
        };
        assert!(matches!(
            err,
            DocumentError::NotASection { ref segment, .. } if segment == "a"
        ));
    }

    // -----------------------------------------------------------------------
    // Round-trip property
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        fn set_then_get_roundtrips_through_serializer(
            segments in prop::collection::vec("[a-z][a-z0-9_]{0,8}", 1..4),
            key in "[a-z][a-z0-9_]{0,8}",
            value in any::<i64>(),
        ) {
            let path = segments.join(".");
            let mut doc = DocumentMut::new();

            let (table, _) = lookup_or_create(doc.as_table_mut(), &path).unwrap();
            table.insert(&key, Item::Value(Value::from(value)));

            let reparsed: DocumentMut = doc.to_string().parse().unwrap();
            let found = lookup(reparsed.as_table(), &path)
                .and_then(|i| i.as_table_like())
                .and_then(|t| t.get(&key))
                .and_then(Item::as_integer);
            prop_assert_eq!(found, Some(value));
        }
    }
}
