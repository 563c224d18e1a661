//! Type matching for generated enum and composite `sqlx` impls.
//!
//! Declared types carry a qualified name (`schema.name`) so the server can
//! resolve them on encode. Types reported by the server when decoding carry
//! only the bare catalog name, so both spellings are accepted.

use sqlx::postgres::PgTypeInfo;
use sqlx::TypeInfo;

fn name_matches(found: &str, schema: &str, name: &str) -> bool {
    if found == name {
        return true;
    }
    match found.split_once('.') {
        Some((s, n)) => unquote(s) == schema && unquote(n) == name,
        None => false,
    }
}

fn unquote(ident: &str) -> String {
    ident
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .map(|s| s.replace("\"\"", "\""))
        .unwrap_or_else(|| ident.to_string())
}

/// Check if `ty` is the user-defined type `schema.name`.
pub fn type_matches(ty: &PgTypeInfo, schema: &str, name: &str) -> bool {
    name_matches(ty.name(), schema, name)
}

/// Check if `ty` is an array of the user-defined type `schema.name`.
///
/// Only the type name is inspected; declared types have no resolved kind.
pub fn array_type_matches(ty: &PgTypeInfo, schema: &str, name: &str) -> bool {
    let found = ty.name();
    if let Some(element) = found.strip_suffix("[]") {
        return name_matches(element, schema, name);
    }
    // Array types are catalogued as `_name`.
    match found.split_once('.') {
        Some((s, n)) => unquote(s) == schema && unquote(n).strip_prefix('_') == Some(name),
        None => found.strip_prefix('_') == Some(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_and_reported_names() {
        assert!(type_matches(&PgTypeInfo::with_name("public.mood"), "public", "mood"));
        assert!(type_matches(&PgTypeInfo::with_name("mood"), "public", "mood"));
        assert!(type_matches(
            &PgTypeInfo::with_name("\"public\".\"mood\""),
            "public",
            "mood"
        ));
        assert!(!type_matches(&PgTypeInfo::with_name("audit.mood"), "public", "mood"));
        assert!(!type_matches(&PgTypeInfo::with_name("text"), "public", "mood"));
    }

    #[test]
    fn test_array_names() {
        assert!(array_type_matches(&PgTypeInfo::with_name("_mood"), "public", "mood"));
        assert!(array_type_matches(&PgTypeInfo::with_name("public._mood"), "public", "mood"));
        assert!(array_type_matches(&PgTypeInfo::with_name("public.mood[]"), "public", "mood"));
        assert!(!array_type_matches(&PgTypeInfo::with_name("mood"), "public", "mood"));
    }
}
