use super::{doc, inner_doc, lit, render_file};
use crate::error::Result;
use crate::layout::STATEMENTS;
use crate::naming::{ident, pascal_case, snake_case, unique_names};
use crate::types::{borrowed, optional, TypeMap};
use crate::GeneratedFile;
use pgbind_core::{Cardinality, StatementDef};
use quote::{format_ident, quote};

/// Emit the function and result row type of a named statement.
///
/// `:one` must yield exactly one row, `:many` yields a lazy stream, and
/// statements without result columns report the affected row count.
pub(crate) fn emit_statement(
    def: &StatementDef,
    module: &str,
    types: &TypeMap<'_>,
) -> Result<GeneratedFile> {
    let function = ident(module);
    let row = format_ident!("{}Row", pascal_case(&def.name));
    let name = lit(&def.name);
    let sql = lit(&def.positional_sql);
    let returns_rows = def.cardinality != Cardinality::Exec && !def.columns.is_empty();

    let mut text = format!("Statement `{}` (`:{}`).\n\n```sql\n", def.name, def.cardinality);
    text.push_str(def.sql.trim());
    text.push_str("\n```");
    let file_doc = inner_doc(&text);

    // Parameters follow `executor`.
    let params: Vec<String> = unique_names(
        std::iter::once("executor".to_string())
            .chain(def.variables.iter().map(|v| snake_case(&v.name))),
    )
    .into_iter()
    .skip(1)
    .collect();
    let lifetime: syn::Lifetime = syn::parse_quote!('e);
    let stream = returns_rows && def.cardinality == Cardinality::Many;
    let mut param_decls = Vec::new();
    let mut binds = Vec::new();
    for (variable, param) in def.variables.iter().zip(&params) {
        let param = ident(param);
        let ty = borrowed(types, &variable.column_type, stream.then_some(&lifetime))?;
        let ty = optional(ty, variable.nullable);
        param_decls.push(quote!(#param: #ty));
        binds.push(quote!(.bind(#param)));
    }

    let row_type = if returns_rows {
        let fields = unique_names(def.columns.iter().map(|c| snake_case(&c.name)));
        let mut declarations = Vec::new();
        for (column, field) in def.columns.iter().zip(&fields) {
            let field_ident = ident(field);
            let ty = types.value_type(&column.column_type, column.nullable)?;
            let rename = (field_ident.to_string() != column.name).then(|| {
                let column = lit(&column.name);
                quote!(#[sqlx(rename = #column)])
            });
            declarations.push(quote! { #rename pub #field_ident: #ty });
        }
        let row_doc = doc(&format!("A result row of `{}`.", def.name));
        Some(quote! {
            #row_doc
            #[derive(Debug, Clone, PartialEq, ::sqlx::FromRow)]
            pub struct #row {
                #(#declarations,)*
            }
        })
    } else {
        None
    };

    let function_tokens = match (returns_rows, def.cardinality) {
        (true, Cardinality::Many) => quote! {
            /// Stream the result rows. Nothing runs until the stream is polled.
            pub fn #function<'e, E>(
                executor: E,
                #(#param_decls,)*
            ) -> ::futures::stream::BoxStream<'e, ::pgbind_runtime::Result<#row>>
            where
                E: ::sqlx::PgExecutor<'e> + 'e,
            {
                let query = ::sqlx::query_as::<_, #row>(SQL)#(#binds)*;
                ::pgbind_runtime::statement::fetch_many(NAME, query, executor)
            }
        },
        (true, _) => quote! {
            /// Fetch the single result row.
            pub async fn #function<'c, E>(
                executor: E,
                #(#param_decls,)*
            ) -> ::pgbind_runtime::Result<#row>
            where
                E: ::sqlx::PgExecutor<'c>,
            {
                let query = ::sqlx::query_as::<_, #row>(SQL)#(#binds)*;
                ::pgbind_runtime::statement::fetch_exactly_one(NAME, query, executor).await
            }
        },
        (false, _) => quote! {
            /// Execute the statement; returns the number of rows affected.
            pub async fn #function<'c, E>(
                executor: E,
                #(#param_decls,)*
            ) -> ::pgbind_runtime::Result<u64>
            where
                E: ::sqlx::PgExecutor<'c>,
            {
                let query = ::sqlx::query(SQL)#(#binds)*;
                ::pgbind_runtime::statement::execute(NAME, query, executor).await
            }
        },
    };

    let tokens = quote! {
        #file_doc

        /// Statement name.
        pub const NAME: &str = #name;

        /// Statement text with positional parameters.
        pub const SQL: &str = #sql;

        #row_type

        #function_tokens
    };

    render_file(format!("{STATEMENTS}/{module}.rs"), tokens)
}
