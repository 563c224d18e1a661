//! Object filters scoping catalog queries.
//!
//! A filter renders to an SQL predicate over a schema expression and a name
//! expression so that the same filter can scope tables, enums, composites and
//! domains.

use crate::catalog::QualifiedName;
use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// Selects catalog objects by schema, by qualified name or by bare name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectFilter {
    /// Every object in the given schemas.
    Schemas(BTreeSet<String>),
    /// Explicit qualified names.
    Objects(BTreeSet<QualifiedName>),
    /// Temporary tables, matched by bare name.
    TempTable(BTreeSet<String>),
    /// Union of several filters.
    Multi(Vec<ObjectFilter>),
}

impl ObjectFilter {
    /// Filter on a set of schemas.
    pub fn schemas(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ObjectFilter::Schemas(names.into_iter().map(Into::into).collect())
    }

    /// Filter on explicit qualified names.
    pub fn objects(names: impl IntoIterator<Item = QualifiedName>) -> Self {
        ObjectFilter::Objects(names.into_iter().collect())
    }

    /// Filter on temporary table names.
    pub fn temp_tables(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ObjectFilter::TempTable(names.into_iter().map(Into::into).collect())
    }

    /// Combine with another filter.
    pub fn or(self, other: ObjectFilter) -> Self {
        match self {
            ObjectFilter::Multi(mut filters) => {
                filters.push(other);
                ObjectFilter::Multi(filters)
            }
            first => ObjectFilter::Multi(vec![first, other]),
        }
    }

    /// Check if the filter can match nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            ObjectFilter::Schemas(names) => names.is_empty(),
            ObjectFilter::Objects(names) => names.is_empty(),
            ObjectFilter::TempTable(names) => names.is_empty(),
            ObjectFilter::Multi(filters) => filters.iter().all(ObjectFilter::is_empty),
        }
    }

    /// Exact number of objects the filter should match, when statically known.
    pub fn expected_count(&self) -> Option<usize> {
        match self {
            ObjectFilter::Schemas(names) if names.is_empty() => Some(0),
            ObjectFilter::Schemas(_) => None,
            ObjectFilter::Objects(names) => Some(names.len()),
            ObjectFilter::TempTable(names) => Some(names.len()),
            ObjectFilter::Multi(filters) => filters
                .iter()
                .filter(|f| !f.is_empty())
                .map(ObjectFilter::expected_count)
                .sum(),
        }
    }

    /// Check if a qualified name matches the filter.
    ///
    /// Temporary tables match on the bare name regardless of schema.
    pub fn matches(&self, name: &QualifiedName) -> bool {
        match self {
            ObjectFilter::Schemas(names) => names.contains(&name.schema),
            ObjectFilter::Objects(names) => names.contains(name),
            ObjectFilter::TempTable(names) => names.contains(&name.name),
            ObjectFilter::Multi(filters) => filters.iter().any(|f| f.matches(name)),
        }
    }

    /// Explicitly requested names that are absent from `found`.
    ///
    /// Schema filters request no individual names and never report missing
    /// objects.
    pub fn missing<'a>(&self, found: impl IntoIterator<Item = &'a QualifiedName>) -> Vec<String> {
        let found: Vec<&QualifiedName> = found.into_iter().collect();
        let mut missing = BTreeSet::new();
        self.collect_missing(&found, &mut missing);
        missing.into_iter().collect()
    }

    fn collect_missing(&self, found: &[&QualifiedName], missing: &mut BTreeSet<String>) {
        match self {
            ObjectFilter::Schemas(_) => {}
            ObjectFilter::Objects(names) => {
                for name in names {
                    if !found.contains(&name) {
                        missing.insert(name.to_string());
                    }
                }
            }
            ObjectFilter::TempTable(names) => {
                for name in names {
                    if !found.iter().any(|f| &f.name == name) {
                        missing.insert(name.clone());
                    }
                }
            }
            ObjectFilter::Multi(filters) => {
                for filter in filters {
                    filter.collect_missing(found, missing);
                }
            }
        }
    }

    /// Render an SQL predicate over the given schema and name expressions.
    ///
    /// Rendering an empty filter is an error; guard with [`is_empty`].
    ///
    /// [`is_empty`]: ObjectFilter::is_empty
    pub fn render(&self, schema_expr: &str, name_expr: &str) -> Result<String> {
        if self.is_empty() {
            return Err(Error::EmptyFilter);
        }

        let sql = match self {
            ObjectFilter::Schemas(names) => {
                format!("{} IN ({})", schema_expr, literal_list(names.iter()))
            }
            ObjectFilter::Objects(names) => {
                let pairs: Vec<String> = names
                    .iter()
                    .map(|n| format!("({}, {})", literal(&n.schema), literal(&n.name)))
                    .collect();
                format!("({}, {}) IN ({})", schema_expr, name_expr, pairs.join(", "))
            }
            ObjectFilter::TempTable(names) => format!(
                "{} LIKE 'pg\\_temp%' AND {} IN ({})",
                schema_expr,
                name_expr,
                literal_list(names.iter())
            ),
            ObjectFilter::Multi(filters) => {
                let parts = filters
                    .iter()
                    .filter(|f| !f.is_empty())
                    .map(|f| f.render(schema_expr, name_expr).map(|p| format!("({p})")))
                    .collect::<Result<Vec<_>>>()?;
                parts.join(" OR ")
            }
        };
        Ok(sql)
    }
}

/// Quote a string literal, doubling embedded quotes.
fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn literal_list<'a>(values: impl Iterator<Item = &'a String>) -> String {
    values.map(|v| literal(v)).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qn(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_objects_never_renders() {
        let filter = ObjectFilter::objects([]);
        assert!(filter.is_empty());
        assert_eq!(filter.expected_count(), Some(0));
        assert!(matches!(filter.render("s", "n"), Err(Error::EmptyFilter)));
    }

    #[test]
    fn test_multi_of_empty_members_is_empty() {
        let filter = ObjectFilter::schemas(Vec::<String>::new()).or(ObjectFilter::objects([]));
        assert!(filter.is_empty());
        assert!(ObjectFilter::Multi(Vec::new()).is_empty());
    }

    #[test]
    fn test_render_schemas() {
        let filter = ObjectFilter::schemas(["public", "audit"]);
        assert_eq!(
            filter.render("n.nspname", "c.relname").unwrap(),
            "n.nspname IN ('audit', 'public')"
        );
    }

    #[test]
    fn test_render_objects_sorted_and_escaped() {
        let filter = ObjectFilter::objects([qn("public.users"), qn("app.o'brien")]);
        assert_eq!(
            filter.render("s", "n").unwrap(),
            "(s, n) IN (('app', 'o''brien'), ('public', 'users'))"
        );
    }

    #[test]
    fn test_render_multi_skips_empty_members() {
        let filter = ObjectFilter::schemas(["public"])
            .or(ObjectFilter::objects([]))
            .or(ObjectFilter::objects([qn("audit.log")]));
        assert_eq!(
            filter.render("s", "n").unwrap(),
            "(s IN ('public')) OR ((s, n) IN (('audit', 'log')))"
        );
    }

    #[test]
    fn test_render_temp_tables() {
        let filter = ObjectFilter::temp_tables(["scratch"]);
        assert_eq!(
            filter.render("s", "n").unwrap(),
            "s LIKE 'pg\\_temp%' AND n IN ('scratch')"
        );
    }

    #[test]
    fn test_expected_count() {
        assert_eq!(ObjectFilter::schemas(["public"]).expected_count(), None);

        let filter = ObjectFilter::objects([qn("a.b"), qn("a.c")])
            .or(ObjectFilter::temp_tables(["scratch"]))
            .or(ObjectFilter::schemas(Vec::<String>::new()));
        assert_eq!(filter.expected_count(), Some(3));

        let filter = ObjectFilter::objects([qn("a.b")]).or(ObjectFilter::schemas(["public"]));
        assert_eq!(filter.expected_count(), None);
    }

    #[test]
    fn test_missing() {
        let filter = ObjectFilter::objects([qn("public.users"), qn("public.posts")])
            .or(ObjectFilter::temp_tables(["scratch"]));
        let found = [qn("public.users"), qn("pg_temp_3.scratch")];
        assert_eq!(filter.missing(found.iter()), vec!["public.posts".to_string()]);
    }

    #[test]
    fn test_matches() {
        let filter = ObjectFilter::schemas(["public"]).or(ObjectFilter::temp_tables(["scratch"]));
        assert!(filter.matches(&qn("public.users")));
        assert!(filter.matches(&qn("pg_temp_7.scratch")));
        assert!(!filter.matches(&qn("audit.log")));
    }
}
