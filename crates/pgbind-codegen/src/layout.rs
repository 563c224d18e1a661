//! Module tree layout: which file and Rust path each entity gets.

use crate::error::{Error, Result};
use crate::naming::{ident, pascal_case, snake_case, unique_names};
use pgbind_core::{DatabaseConfig, DatabaseSpec, QualifiedName};
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::{BTreeMap, BTreeSet};

/// Module holding named statements.
pub(crate) const STATEMENTS: &str = "statements";

/// Entity category, one directory per schema each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Category {
    Tables,
    Enums,
    Composites,
    Domains,
}

impl Category {
    pub(crate) const ALL: [Category; 4] = [
        Category::Tables,
        Category::Enums,
        Category::Composites,
        Category::Domains,
    ];

    pub(crate) fn dir(&self) -> &'static str {
        match self {
            Category::Tables => "tables",
            Category::Enums => "enums",
            Category::Composites => "composites",
            Category::Domains => "domains",
        }
    }
}

/// Location of one generated entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntityPath {
    pub schema_module: String,
    pub category: Category,
    pub module: String,
    pub type_name: String,
}

impl EntityPath {
    /// Output file, relative to the root.
    pub(crate) fn file(&self) -> String {
        format!(
            "{}/{}/{}.rs",
            self.schema_module,
            self.category.dir(),
            self.module
        )
    }
}

/// Names for every schema, entity and statement of one database.
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    root: TokenStream,
    schemas: BTreeMap<String, String>,
    entities: BTreeMap<(Category, QualifiedName), EntityPath>,
    statements: BTreeMap<String, String>,
}

impl Layout {
    /// Assign names. Only generated entities get a path; enums and domains
    /// replaced by configured Rust types are left out.
    pub(crate) fn new(spec: &DatabaseSpec, config: &DatabaseConfig) -> Result<Self> {
        let root: syn::Path = syn::parse_str(config.module_path()).map_err(|e| {
            Error::configuration(format!(
                "module path '{}' is not a Rust path: {e}",
                config.module_path()
            ))
        })?;

        let mut selected: Vec<(Category, &QualifiedName)> = Vec::new();
        selected.extend(spec.tables.iter().map(|t| (Category::Tables, &t.name)));
        selected.extend(
            spec.enums
                .iter()
                .map(|e| &e.name)
                .filter(|n| !config.enum_overrides.contains_key(n))
                .map(|n| (Category::Enums, n)),
        );
        selected.extend(spec.composites.iter().map(|c| (Category::Composites, &c.name)));
        selected.extend(
            spec.domains
                .iter()
                .map(|d| &d.name)
                .filter(|n| !config.domain_overrides.contains_key(n) && !config.types.contains_key(n))
                .map(|n| (Category::Domains, n)),
        );

        // The root module also holds `statements`.
        let schema_names: BTreeSet<&str> = selected.iter().map(|(_, n)| n.schema.as_str()).collect();
        let schema_modules = unique_names(
            std::iter::once(STATEMENTS.to_string())
                .chain(schema_names.iter().map(|s| snake_case(s))),
        );
        let schemas: BTreeMap<String, String> = schema_names
            .iter()
            .map(|s| s.to_string())
            .zip(schema_modules.into_iter().skip(1))
            .collect();

        let mut groups: BTreeMap<(Category, &str), Vec<&QualifiedName>> = BTreeMap::new();
        for (category, name) in selected {
            groups.entry((category, name.schema.as_str())).or_default().push(name);
        }
        let mut entities = BTreeMap::new();
        for ((category, schema), mut names) in groups {
            names.sort();
            let modules = unique_names(names.iter().map(|n| snake_case(&n.name)));
            let types = unique_names(names.iter().map(|n| pascal_case(&n.name)));
            for ((name, module), type_name) in names.into_iter().zip(modules).zip(types) {
                entities.insert(
                    (category, name.clone()),
                    EntityPath {
                        schema_module: schemas[schema].clone(),
                        category,
                        module,
                        type_name,
                    },
                );
            }
        }

        let mut statement_names: Vec<&str> =
            spec.statements.iter().map(|s| s.name.as_str()).collect();
        statement_names.sort_unstable();
        let statements = statement_names
            .iter()
            .map(|s| s.to_string())
            .zip(unique_names(statement_names.iter().map(|s| snake_case(s))))
            .collect();

        Ok(Self {
            root: quote!(#root),
            schemas,
            entities,
            statements,
        })
    }

    /// Path of the generated root module.
    pub(crate) fn root(&self) -> &TokenStream {
        &self.root
    }

    /// Schema name to module name.
    pub(crate) fn schemas(&self) -> &BTreeMap<String, String> {
        &self.schemas
    }

    /// Location of a generated entity.
    pub(crate) fn entity(&self, category: Category, name: &QualifiedName) -> Option<&EntityPath> {
        self.entities.get(&(category, name.clone()))
    }

    /// Generated entities of one schema module and category, by module name.
    pub(crate) fn entities_in(&self, schema_module: &str, category: Category) -> Vec<&EntityPath> {
        let mut found: Vec<&EntityPath> = self
            .entities
            .values()
            .filter(|e| e.schema_module == schema_module && e.category == category)
            .collect();
        found.sort_by(|a, b| a.module.cmp(&b.module));
        found
    }

    /// Module name of a statement.
    pub(crate) fn statement(&self, name: &str) -> Option<&str> {
        self.statements.get(name).map(String::as_str)
    }

    /// Statement module names, sorted.
    pub(crate) fn statement_modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = self.statements.values().map(String::as_str).collect();
        modules.sort_unstable();
        modules
    }

    /// Absolute Rust path of a generated type.
    pub(crate) fn type_path(&self, entity: &EntityPath) -> TokenStream {
        let root = &self.root;
        let schema = ident(&entity.schema_module);
        let category = ident(entity.category.dir());
        let module = ident(&entity.module);
        let ty = ident(&entity.type_name);
        quote!(#root::#schema::#category::#module::#ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgbind_core::{ColumnDef, ColumnType, EnumDef, PrimitiveType, TableDef};

    fn qn(s: &str) -> QualifiedName {
        s.parse().unwrap()
    }

    fn table(name: &str) -> TableDef {
        TableDef::new(qn(name)).with_column(ColumnDef::new(
            1,
            "id",
            ColumnType::Primitive(PrimitiveType::Int4),
        ))
    }

    #[test]
    fn test_entity_paths() {
        let spec = DatabaseSpec::new()
            .with_table(table("public.user_accounts"))
            .with_enum(EnumDef::new(qn("Billing.PlanKind"), ["free"]));
        let layout = Layout::new(&spec, &DatabaseConfig::new("src/db")).unwrap();

        let users = layout
            .entity(Category::Tables, &qn("public.user_accounts"))
            .unwrap();
        assert_eq!(users.file(), "public/tables/user_accounts.rs");
        assert_eq!(users.type_name, "UserAccounts");

        let plan = layout.entity(Category::Enums, &qn("Billing.PlanKind")).unwrap();
        assert_eq!(plan.file(), "billing/enums/plan_kind.rs");
        assert_eq!(
            layout.type_path(plan).to_string(),
            "crate :: db :: billing :: enums :: plan_kind :: PlanKind"
        );
    }

    #[test]
    fn test_colliding_names_are_suffixed() {
        let spec = DatabaseSpec::new()
            .with_table(table("public.order items"))
            .with_table(table("public.order_items"));
        let layout = Layout::new(&spec, &DatabaseConfig::new("src/db")).unwrap();
        let modules: Vec<&str> = layout
            .entities_in("public", Category::Tables)
            .iter()
            .map(|e| e.module.as_str())
            .collect();
        assert_eq!(modules, ["order_items", "order_items_2"]);
    }

    #[test]
    fn test_schema_named_statements() {
        let spec = DatabaseSpec::new().with_table(table("statements.log"));
        let layout = Layout::new(&spec, &DatabaseConfig::new("src/db")).unwrap();
        assert_eq!(layout.schemas()["statements"], "statements_2");
    }

    #[test]
    fn test_overridden_enum_has_no_path() {
        let spec = DatabaseSpec::new().with_enum(EnumDef::new(qn("public.mood"), ["ok"]));
        let mut config = DatabaseConfig::new("src/db");
        config
            .enum_overrides
            .insert(qn("public.mood"), "crate::Mood".to_string());
        let layout = Layout::new(&spec, &config).unwrap();
        assert!(layout.entity(Category::Enums, &qn("public.mood")).is_none());
    }

    #[test]
    fn test_invalid_module_path() {
        let mut config = DatabaseConfig::new("src/db");
        config.module = Some("crate::not a path".to_string());
        let err = Layout::new(&DatabaseSpec::new(), &config).unwrap_err();
        assert!(err.is_configuration());
    }
}
