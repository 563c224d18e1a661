use super::{doc, inner_doc, lit, render_file};
use crate::error::{Error, Result};
use crate::layout::EntityPath;
use crate::naming::{ident, screaming_case, snake_case, unique_names};
use crate::types::{optional, parse_type, read_cast, TypeMap};
use crate::GeneratedFile;
use pgbind_core::{ColumnDef, DatabaseConfig, TableDef};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use std::collections::BTreeSet;

/// One column with its generated names and Rust type.
struct ColumnItem<'a> {
    def: &'a ColumnDef,
    constant: Ident,
    field: Ident,
    /// Rust type of a non-null value.
    inner: TokenStream,
}

impl ColumnItem<'_> {
    fn value_type(&self) -> TokenStream {
        optional(self.inner.clone(), self.def.nullable)
    }

    fn rename(&self) -> Option<TokenStream> {
        (self.field.to_string() != self.def.name).then(|| {
            let name = lit(&self.def.name);
            quote!(#[sqlx(rename = #name)])
        })
    }
}

fn column_items<'a>(
    table: &'a TableDef,
    config: &DatabaseConfig,
    types: &TypeMap<'_>,
) -> Result<Vec<ColumnItem<'a>>> {
    // `ALL` is the column list constant.
    let constants = unique_names(
        std::iter::once("ALL".to_string()).chain(table.columns.iter().map(|c| screaming_case(&c.name))),
    );
    let fields = unique_names(table.columns.iter().map(|c| snake_case(&c.name)));

    table
        .columns
        .iter()
        .zip(constants.into_iter().skip(1))
        .zip(fields)
        .map(|((def, constant), field)| {
            let inner = match config.column_override(&table.name, &def.name) {
                Some(rust) => parse_type(rust, &format!("override of {}.{}", table.name, def.name))?,
                None => types.rust_type(&def.column_type)?,
            };
            Ok(ColumnItem {
                def,
                constant: ident(&constant),
                field: ident(&field),
                inner,
            })
        })
        .collect()
}

/// Columns carried by the change event type: the configured list, or the
/// key columns (primary and foreign), or every column when there are none.
fn event_columns<'a, 'b>(
    table: &TableDef,
    config: &DatabaseConfig,
    items: &'b [ColumnItem<'a>],
) -> Result<Vec<&'b ColumnItem<'a>>> {
    let wanted: BTreeSet<&str> = match config.event_columns.get(&table.name) {
        Some(columns) => {
            for column in columns {
                if table.column(column).is_none() {
                    return Err(Error::configuration(format!(
                        "event column {column} is not a column of {}",
                        table.name
                    )));
                }
            }
            columns.iter().map(String::as_str).collect()
        }
        None => table
            .primary_key_columns()
            .iter()
            .chain(table.foreign_keys.iter().flat_map(|fk| fk.columns.iter()))
            .map(String::as_str)
            .collect(),
    };
    if wanted.is_empty() {
        return Ok(items.iter().collect());
    }
    Ok(items
        .iter()
        .filter(|item| wanted.contains(item.def.name.as_str()))
        .collect())
}

fn key_items<'a, 'b>(table: &TableDef, items: &'b [ColumnItem<'a>]) -> Vec<&'b ColumnItem<'a>> {
    table
        .primary_key_columns()
        .iter()
        .filter_map(|pk| items.iter().find(|item| &item.def.name == pk))
        .collect()
}

/// Emit the bindings of one table.
pub(crate) fn emit_table(
    table: &TableDef,
    entity: &EntityPath,
    config: &DatabaseConfig,
    types: &TypeMap<'_>,
) -> Result<GeneratedFile> {
    let items = column_items(table, config, types)?;
    let row = ident(&entity.type_name);
    let create = format_ident!("{}Create", row);
    let update = format_ident!("{}Update", row);
    let schema = lit(&table.name.schema);
    let name = lit(&table.name.name);

    let column_consts = items.iter().map(|item| {
        let constant = &item.constant;
        let column = lit(&item.def.name);
        let sql_type = lit(&item.def.column_type.sql_type());
        let read_as = read_cast(&item.def.column_type).map(|cast| {
            let cast = lit(&cast);
            quote!(.read_as(#cast))
        });
        let doc = doc(&format!("`{}`", item.def.name));
        quote! {
            #doc
            pub const #constant: ::pgbind_runtime::Column = ::pgbind_runtime::Column::new(#column, #sql_type)#read_as;
        }
    });
    let constants: Vec<&Ident> = items.iter().map(|i| &i.constant).collect();
    let fields: Vec<&Ident> = items.iter().map(|i| &i.field).collect();

    let row_fields = items.iter().map(|item| {
        let field = &item.field;
        let ty = item.value_type();
        let rename = item.rename();
        quote! { #rename pub #field: #ty }
    });
    let builder_fields: Vec<TokenStream> = items
        .iter()
        .map(|item| {
            let field = &item.field;
            let ty = &item.inner;
            quote! { pub #field: ::pgbind_runtime::Field<#ty> }
        })
        .collect();

    let keys = key_items(table, &items);
    // Key parameters follow `executor`.
    let key_names: Vec<Ident> = unique_names(
        std::iter::once("executor".to_string())
            .chain(keys.iter().map(|item| item.field.to_string().trim_start_matches("r#").to_string())),
    )
    .iter()
    .skip(1)
    .map(|n| ident(n))
    .collect();
    let key_params: Vec<TokenStream> = keys
        .iter()
        .zip(&key_names)
        .map(|(item, param)| {
            let ty = &item.inner;
            quote!(#param: &#ty)
        })
        .collect();
    let key_pairs: Vec<TokenStream> = keys
        .iter()
        .zip(&key_names)
        .map(|(item, param)| {
            let constant = &item.constant;
            quote!((columns::#constant, ::pgbind_runtime::ToValue::to_value(#param)))
        })
        .collect();
    let key_constants: Vec<&Ident> = keys.iter().map(|i| &i.constant).collect();

    let keyed_methods = (!keys.is_empty()).then(|| {
        quote! {
            /// Fetch a row by primary key.
            pub async fn find_by_pk<'e, E>(executor: E, #(#key_params),*) -> ::pgbind_runtime::Result<::std::option::Option<Self>>
            where
                E: ::sqlx::PgExecutor<'e>,
            {
                let key = [#(#key_pairs),*];
                ::pgbind_runtime::query::select_by_key(&TABLE, columns::ALL, &key)
                    .fetch_optional_as(executor)
                    .await
            }

            /// Delete a row by primary key; returns the number of rows deleted.
            pub async fn delete_by_pk<'e, E>(executor: E, #(#key_params),*) -> ::pgbind_runtime::Result<u64>
            where
                E: ::sqlx::PgExecutor<'e>,
            {
                let key = [#(#key_pairs),*];
                ::pgbind_runtime::query::delete_by_key(&TABLE, &key)
                    .execute(executor)
                    .await
            }

            /// Update `rows` by primary key, one keyed statement per row.
            pub async fn batch_update(
                conn: &mut ::sqlx::PgConnection,
                rows: &[Self],
            ) -> ::pgbind_runtime::Result<u64> {
                let rows: ::std::vec::Vec<::pgbind_runtime::Row> = rows.iter().map(Self::to_row).collect();
                ::pgbind_runtime::batch_update(conn, &TABLE, &[#(columns::#key_constants),*], &rows).await
            }
        }
    });

    let update_by_pk = (!keys.is_empty()).then(|| {
        quote! {
            /// Apply the set fields to the row with this primary key.
            pub async fn update_by_pk<'e, E>(&self, executor: E, #(#key_params),*) -> ::pgbind_runtime::Result<::std::option::Option<#row>>
            where
                E: ::sqlx::PgExecutor<'e>,
            {
                let key = [#(#key_pairs),*];
                ::pgbind_runtime::query::update(&TABLE, columns::ALL, &self.assignments(), &key)?
                    .fetch_optional_as(executor)
                    .await
            }
        }
    });

    let event = if config.is_event_table(&table.name) {
        Some(emit_event(table, config, &items, &row)?)
    } else {
        None
    };

    let file_doc = inner_doc(&format!("Table `{}`.", table.name));
    let row_doc = doc(&format!("A row of `{}`.", table.name));
    let tokens = quote! {
        #file_doc

        /// The table.
        pub const TABLE: ::pgbind_runtime::Table = ::pgbind_runtime::Table::new(#schema, #name);

        /// Column descriptors.
        pub mod columns {
            #(#column_consts)*

            /// Every column, in table order.
            pub const ALL: &[::pgbind_runtime::Column] = &[#(#constants),*];
        }

        #row_doc
        #[derive(Debug, Clone, PartialEq, ::sqlx::FromRow)]
        pub struct #row {
            #(#row_fields,)*
        }

        impl #row {
            /// Column values of this row.
            pub fn to_row(&self) -> ::pgbind_runtime::Row {
                ::pgbind_runtime::Row::new()
                    #(.with(columns::#constants, &self.#fields))*
            }

            /// Make the rows of `partition` equal `rows`.
            pub async fn sync<'e, E>(
                executor: E,
                partition: &::pgbind_runtime::Row,
                rows: &[Self],
            ) -> ::pgbind_runtime::Result<::pgbind_runtime::SyncOutcome>
            where
                E: ::sqlx::PgExecutor<'e>,
            {
                let rows: ::std::vec::Vec<::pgbind_runtime::Row> = rows.iter().map(Self::to_row).collect();
                ::pgbind_runtime::sync(executor, &TABLE, partition, &rows).await
            }

            #keyed_methods
        }

        /// Values for a new row. Omitted fields take the column default.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct #create {
            #(#builder_fields,)*
        }

        impl #create {
            /// Set fields as `(column, value)` pairs.
            pub fn assignments(&self) -> ::std::vec::Vec<(::pgbind_runtime::Column, ::pgbind_runtime::Value)> {
                let mut out = ::std::vec::Vec::new();
                #(self.#fields.push_to(columns::#constants, &mut out);)*
                out
            }

            /// Insert the row and return it as stored.
            pub async fn insert<'e, E>(&self, executor: E) -> ::pgbind_runtime::Result<#row>
            where
                E: ::sqlx::PgExecutor<'e>,
            {
                ::pgbind_runtime::query::insert(&TABLE, columns::ALL, &self.assignments())
                    .fetch_one_as(executor)
                    .await
            }
        }

        /// Changes to a row. Omitted fields keep their current value.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct #update {
            #(#builder_fields,)*
        }

        impl #update {
            /// Set fields as `(column, value)` pairs.
            pub fn assignments(&self) -> ::std::vec::Vec<(::pgbind_runtime::Column, ::pgbind_runtime::Value)> {
                let mut out = ::std::vec::Vec::new();
                #(self.#fields.push_to(columns::#constants, &mut out);)*
                out
            }

            #update_by_pk
        }

        #event
    };

    render_file(entity.file(), tokens)
}

fn emit_event(
    table: &TableDef,
    config: &DatabaseConfig,
    items: &[ColumnItem<'_>],
    row: &Ident,
) -> Result<TokenStream> {
    let event = format_ident!("{}Event", row);
    let columns = event_columns(table, config, items)?;
    let declarations = columns.iter().map(|item| {
        let field = &item.field;
        let ty = item.value_type();
        quote!(pub #field: #ty)
    });
    let reads = columns.iter().map(|item| {
        let field = &item.field;
        let column = lit(&item.def.name);
        if item.def.nullable {
            quote!(#field: ::pgbind_runtime::event::payload_optional(payload, #column)?)
        } else {
            quote!(#field: ::pgbind_runtime::event::payload_required(&TABLE, payload, #column)?)
        }
    });
    let doc = doc(&format!(
        "Change event image of `{}`: {}.",
        table.name,
        columns
            .iter()
            .map(|c| format!("`{}`", c.def.name))
            .collect::<Vec<_>>()
            .join(", ")
    ));

    Ok(quote! {
        #doc
        #[derive(Debug, Clone, PartialEq)]
        pub struct #event {
            #(#declarations,)*
        }

        impl ::pgbind_runtime::EventEntity for #event {
            const TABLE: ::pgbind_runtime::Table = TABLE;

            fn from_payload(payload: &::pgbind_runtime::Payload) -> ::pgbind_runtime::Result<Self> {
                Ok(Self {
                    #(#reads,)*
                })
            }
        }
    })
}
