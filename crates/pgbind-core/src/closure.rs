//! Foreign-key closure over a table source.

use crate::catalog::{QualifiedName, TableDef};
use crate::error::{Error, Result};
use crate::filter::ObjectFilter;
use std::collections::BTreeMap;
use tracing::debug;

/// Anything that can list the tables matching a filter.
pub trait TableSource {
    /// Introspect the tables matching `filter`.
    fn tables(&mut self, filter: &ObjectFilter) -> Result<Vec<TableDef>>;
}

/// Collect the tables matching `filter` plus every table reachable from them
/// through foreign keys, sorted by name.
///
/// Targets outside the original filter's scope are included. A round that
/// finds none of the missing targets fails instead of looping.
pub fn closure(source: &mut impl TableSource, filter: &ObjectFilter) -> Result<Vec<TableDef>> {
    let mut collected: BTreeMap<QualifiedName, TableDef> = BTreeMap::new();
    if filter.is_empty() {
        return Ok(Vec::new());
    }

    let mut working = filter.clone();
    let mut round = 0usize;
    loop {
        round += 1;
        let found = source.tables(&working)?;
        let before = collected.len();
        for table in found {
            collected.entry(table.name.clone()).or_insert(table);
        }

        // Missing target -> first table referencing it.
        let mut missing: BTreeMap<QualifiedName, QualifiedName> = BTreeMap::new();
        for table in collected.values() {
            for target in table.foreign_key_targets() {
                if !collected.contains_key(target) {
                    missing
                        .entry(target.clone())
                        .or_insert_with(|| table.name.clone());
                }
            }
        }

        debug!(
            round,
            collected = collected.len(),
            missing = missing.len(),
            "foreign-key closure round"
        );

        if round > 1 && collected.len() == before {
            if let Some((target, table)) = missing.into_iter().next() {
                return Err(Error::MissingForeignKeyTarget { table, target });
            }
            break;
        }
        if missing.is_empty() {
            break;
        }

        working = ObjectFilter::Objects(missing.into_keys().collect());
    }

    Ok(collected.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDef, ColumnType, ForeignKey, PrimitiveType};
    use std::collections::BTreeSet;

    /// In-memory catalog answering filters by name.
    struct FakeCatalog {
        tables: Vec<TableDef>,
        calls: usize,
    }

    impl FakeCatalog {
        fn new(tables: Vec<TableDef>) -> Self {
            Self { tables, calls: 0 }
        }
    }

    impl TableSource for FakeCatalog {
        fn tables(&mut self, filter: &ObjectFilter) -> Result<Vec<TableDef>> {
            self.calls += 1;
            Ok(self
                .tables
                .iter()
                .filter(|t| filter.matches(&t.name))
                .cloned()
                .collect())
        }
    }

    fn table(name: &str, targets: &[&str]) -> TableDef {
        let mut def = TableDef::new(name.parse().unwrap()).with_column(ColumnDef::new(
            1,
            "id",
            ColumnType::Primitive(PrimitiveType::Int4),
        ));
        for (i, target) in targets.iter().enumerate() {
            def = def.with_foreign_key(ForeignKey::new(
                format!("fk_{i}"),
                ["id"],
                target.parse().unwrap(),
                ["id"],
            ));
        }
        def
    }

    fn names(tables: &[TableDef]) -> Vec<String> {
        tables.iter().map(|t| t.name.to_string()).collect()
    }

    #[test]
    fn test_closure_follows_foreign_keys_across_schemas() {
        let mut source = FakeCatalog::new(vec![
            table("public.comments", &["public.posts"]),
            table("public.posts", &["auth.users"]),
            table("auth.users", &[]),
            table("auth.sessions", &["auth.users"]),
        ]);
        let filter = ObjectFilter::objects(["public.comments".parse().unwrap()]);

        let result = closure(&mut source, &filter).unwrap();
        assert_eq!(
            names(&result),
            ["auth.users", "public.comments", "public.posts"]
        );
        assert_eq!(source.calls, 3);
    }

    #[test]
    fn test_closure_handles_cycles() {
        let mut source = FakeCatalog::new(vec![
            table("public.a", &["public.b"]),
            table("public.b", &["public.a"]),
            table("public.c", &["public.c"]),
        ]);
        let filter = ObjectFilter::schemas(["public"]);

        let result = closure(&mut source, &filter).unwrap();
        assert_eq!(names(&result), ["public.a", "public.b", "public.c"]);
        assert_eq!(source.calls, 1);
    }

    #[test]
    fn test_closure_is_closed() {
        let mut source = FakeCatalog::new(vec![
            table("s.a", &["s.b", "t.c"]),
            table("s.b", &["t.d"]),
            table("t.c", &[]),
            table("t.d", &["s.a"]),
            table("t.e", &[]),
        ]);
        let filter = ObjectFilter::objects(["s.a".parse().unwrap()]);
        let result = closure(&mut source, &filter).unwrap();

        let collected: BTreeSet<_> = result.iter().map(|t| &t.name).collect();
        for table in &result {
            for target in table.foreign_key_targets() {
                assert!(collected.contains(target));
            }
        }
        assert!(!collected.contains(&"t.e".parse::<QualifiedName>().unwrap()));
    }

    #[test]
    fn test_missing_target_fails() {
        let mut source = FakeCatalog::new(vec![table("public.posts", &["public.gone"])]);
        let filter = ObjectFilter::schemas(["public"]);

        let err = closure(&mut source, &filter).unwrap_err();
        match err {
            Error::MissingForeignKeyTarget { table, target } => {
                assert_eq!(table.to_string(), "public.posts");
                assert_eq!(target.to_string(), "public.gone");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_filter_queries_nothing() {
        let mut source = FakeCatalog::new(vec![table("public.a", &[])]);
        let result = closure(&mut source, &ObjectFilter::objects([])).unwrap();
        assert!(result.is_empty());
        assert_eq!(source.calls, 0);
    }
}
