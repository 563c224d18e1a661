//! Identifier derivation for generated code.
//!
//! Catalog names may contain any character, start with a digit or collide
//! with Rust keywords. Everything here is a pure function of its input.

use proc_macro2::{Ident, Span};
use std::collections::BTreeSet;

/// Keywords that can be written as raw identifiers.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers; these get a `_` suffix.
const NON_RAW: &[&str] = &["self", "Self", "super", "crate"];

/// Split a name into lowercase words at non-alphanumeric characters and
/// lower-to-upper case transitions.
fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn unreserve(name: String) -> String {
    if NON_RAW.contains(&name.as_str()) {
        format!("{name}_")
    } else {
        name
    }
}

/// `snake_case` form, used for modules, functions and fields.
///
/// # Examples
/// ```
/// # use pgbind_codegen::naming::snake_case;
/// assert_eq!(snake_case("UserAccounts"), "user_accounts");
/// assert_eq!(snake_case("2fa codes"), "_2fa_codes");
/// assert_eq!(snake_case("self"), "self_");
/// ```
pub fn snake_case(name: &str) -> String {
    let words = words(name);
    if words.is_empty() {
        return "unnamed".to_string();
    }
    let joined = words.join("_");
    if joined.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{joined}")
    } else {
        unreserve(joined)
    }
}

/// `PascalCase` form, used for types and enum variants.
///
/// # Examples
/// ```
/// # use pgbind_codegen::naming::pascal_case;
/// assert_eq!(pascal_case("user_accounts"), "UserAccounts");
/// assert_eq!(pascal_case("in-progress"), "InProgress");
/// assert_eq!(pascal_case("3d"), "T3d");
/// ```
pub fn pascal_case(name: &str) -> String {
    let joined: String = words(name)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if joined.is_empty() {
        "Unnamed".to_string()
    } else if joined.starts_with(|c: char| c.is_ascii_digit()) {
        format!("T{joined}")
    } else {
        unreserve(joined)
    }
}

/// `SCREAMING_SNAKE_CASE` form, used for constants.
pub fn screaming_case(name: &str) -> String {
    let words = words(name);
    if words.is_empty() {
        return "UNNAMED".to_string();
    }
    let joined = words.join("_").to_ascii_uppercase();
    if joined.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{joined}")
    } else {
        joined
    }
}

/// Make every name unique by appending `_2`, `_3`, ... to repeats.
///
/// Order is preserved; the first occurrence keeps its name.
pub fn unique_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let names: Vec<String> = names.into_iter().collect();
    let mut taken: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        let mut n = 2;
        while taken.contains(&candidate) {
            candidate = format!("{name}_{n}");
            n += 1;
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// An identifier token, raw if `name` is a keyword.
pub fn ident(name: &str) -> Ident {
    if KEYWORDS.contains(&name) {
        Ident::new_raw(name, Span::call_site())
    } else {
        Ident::new(name, Span::call_site())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("users"), "users");
        assert_eq!(snake_case("userAccounts"), "user_accounts");
        assert_eq!(snake_case("HTTPRequest"), "httprequest");
        assert_eq!(snake_case("order items"), "order_items");
        assert_eq!(snake_case("a--b"), "a_b");
        assert_eq!(snake_case("9lives"), "_9lives");
        assert_eq!(snake_case("$$"), "unnamed");
        assert_eq!(snake_case("crate"), "crate_");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("users"), "Users");
        assert_eq!(pascal_case("order_items"), "OrderItems");
        assert_eq!(pascal_case("not-started"), "NotStarted");
        assert_eq!(pascal_case("ALREADY"), "Already");
        assert_eq!(pascal_case("self"), "Self_");
        assert_eq!(pascal_case(""), "Unnamed");
        assert_eq!(pascal_case("1st"), "T1st");
    }

    #[test]
    fn test_screaming_case() {
        assert_eq!(screaming_case("created_at"), "CREATED_AT");
        assert_eq!(screaming_case("self"), "SELF");
        assert_eq!(screaming_case("1st"), "_1ST");
    }

    #[test]
    fn test_unique_names() {
        let names = unique_names(
            ["a", "b", "a", "a", "a_2"].into_iter().map(String::from),
        );
        assert_eq!(names, ["a", "b", "a_2", "a_3", "a_2_2"]);
    }

    #[test]
    fn test_keywords_become_raw() {
        assert_eq!(ident("type").to_string(), "r#type");
        assert_eq!(ident("users").to_string(), "users");
        assert_eq!(ident(&snake_case("self")).to_string(), "self_");
    }
}
