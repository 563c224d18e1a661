//! Text forms of composite records and arrays.
//!
//! Records look like `(a,"b c",,"")`: a NULL field is an empty unquoted
//! segment and the empty string is `""`. Arrays look like `{1,NULL,"x y"}`.
//! Only one-dimensional arrays are handled.

use crate::codec::TextCodec;
use crate::error::{Error, Result};

/// Format the fields of a record literal.
pub fn format_record(fields: &[Option<String>]) -> String {
    let mut out = String::from("(");
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if let Some(value) = field {
            if record_needs_quotes(value) {
                out.push('"');
                for c in value.chars() {
                    match c {
                        '"' => out.push_str("\"\""),
                        '\\' => out.push_str("\\\\"),
                        c => out.push(c),
                    }
                }
                out.push('"');
            } else {
                out.push_str(value);
            }
        }
    }
    out.push(')');
    out
}

fn record_needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| matches!(c, '"' | '\\' | '(' | ')' | ',') || c.is_whitespace())
}

/// Parse a record literal into its fields.
pub fn parse_record(text: &str) -> Result<Vec<Option<String>>> {
    let invalid = |message: &str| Error::invalid_literal("record", format!("{message} in {text:?}"));

    let body = text
        .trim()
        .strip_prefix('(')
        .ok_or_else(|| invalid("missing '('"))?;
    let mut chars = body.chars().peekable();
    let mut fields = Vec::new();

    loop {
        let mut value = String::new();
        let mut quoted = false;
        let mut seen = false;

        loop {
            match chars.peek().copied() {
                None => return Err(invalid("missing ')'")),
                Some(',') | Some(')') if !quoted => break,
                Some('"') => {
                    chars.next();
                    seen = true;
                    if quoted && chars.peek() == Some(&'"') {
                        chars.next();
                        value.push('"');
                    } else {
                        quoted = !quoted;
                    }
                }
                Some('\\') => {
                    chars.next();
                    seen = true;
                    match chars.next() {
                        Some(c) => value.push(c),
                        None => return Err(invalid("dangling escape")),
                    }
                }
                Some(c) => {
                    chars.next();
                    seen = true;
                    value.push(c);
                }
            }
        }

        fields.push(seen.then_some(value));

        match chars.next() {
            Some(',') => continue,
            Some(')') => break,
            _ => return Err(invalid("unexpected end")),
        }
    }

    if chars.any(|c| !c.is_whitespace()) {
        return Err(invalid("trailing characters"));
    }
    Ok(fields)
}

/// Parse a record literal with exactly `N` fields.
pub fn parse_record_exact<const N: usize>(
    type_name: &'static str,
    text: &str,
) -> Result<[Option<String>; N]> {
    let mut fields = parse_record(text)?;
    // `()` reads as one NULL field; a record type without fields prints it too.
    if N == 0 && fields.len() == 1 && fields[0].is_none() {
        fields.clear();
    }
    let count = fields.len();
    fields.try_into().map_err(|_| {
        Error::invalid_literal(type_name, format!("expected {N} fields, found {count}"))
    })
}

/// Decode a record field that must not be NULL.
pub fn decode_required<T: TextCodec>(
    type_name: &'static str,
    field: &str,
    value: Option<String>,
) -> Result<T> {
    match value {
        Some(text) => T::decode_text(&text),
        None => Err(Error::invalid_literal(
            type_name,
            format!("field {field} is NULL"),
        )),
    }
}

/// Decode a nullable record field.
pub fn decode_optional<T: TextCodec>(value: Option<String>) -> Result<Option<T>> {
    value.map(|text| T::decode_text(&text)).transpose()
}

/// Format the elements of a one-dimensional array literal.
pub fn format_array(elements: &[Option<String>]) -> String {
    let mut out = String::from("{");
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        match element {
            None => out.push_str("NULL"),
            Some(value) if array_needs_quotes(value) => {
                out.push('"');
                for c in value.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
            }
            Some(value) => out.push_str(value),
        }
    }
    out.push('}');
    out
}

fn array_needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.eq_ignore_ascii_case("null")
        || value
            .chars()
            .any(|c| matches!(c, '"' | '\\' | '{' | '}' | ',') || c.is_whitespace())
}

/// Parse a one-dimensional array literal.
pub fn parse_array(text: &str) -> Result<Vec<Option<String>>> {
    let invalid = |message: &str| Error::invalid_literal("array", format!("{message} in {text:?}"));

    let mut body = text.trim();
    // Explicit bounds, e.g. `[0:1]={a,b}`.
    if body.starts_with('[') {
        let eq = body.find('=').ok_or_else(|| invalid("malformed dimensions"))?;
        body = body[eq + 1..].trim_start();
    }
    let body = body
        .strip_prefix('{')
        .and_then(|b| b.strip_suffix('}'))
        .ok_or_else(|| invalid("missing braces"))?;
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut elements = Vec::new();
    let mut chars = body.chars().peekable();
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        if chars.peek() == Some(&'"') {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(c) => value.push(c),
                        None => return Err(invalid("dangling escape")),
                    },
                    Some(c) => value.push(c),
                    None => return Err(invalid("unterminated quoted element")),
                }
            }
            elements.push(Some(value));
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
        } else {
            let mut value = String::new();
            while let Some(&c) = chars.peek() {
                match c {
                    ',' => break,
                    '{' => return Err(invalid("multidimensional arrays are not supported")),
                    '\\' => {
                        chars.next();
                        match chars.next() {
                            Some(c) => value.push(c),
                            None => return Err(invalid("dangling escape")),
                        }
                    }
                    c => {
                        chars.next();
                        value.push(c);
                    }
                }
            }
            let value = value.trim_end();
            if value.eq_ignore_ascii_case("null") {
                elements.push(None);
            } else {
                elements.push(Some(value.to_string()));
            }
        }

        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(_) => return Err(invalid("expected ','")),
        }
    }
    Ok(elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_format_record_quoting() {
        let fields = [some("plain"), None, some(""), some("a,b"), some("say \"hi\""), some("c:\\d")];
        assert_eq!(
            format_record(&fields),
            r#"(plain,,"","a,b","say ""hi""","c:\\d")"#
        );
    }

    #[test]
    fn test_parse_record() {
        let fields = parse_record(r#"(plain,,"","a,b","say ""hi""","c:\\d", x y )"#).unwrap();
        assert_eq!(
            fields,
            vec![
                some("plain"),
                None,
                some(""),
                some("a,b"),
                some("say \"hi\""),
                some("c:\\d"),
                some(" x y "),
            ]
        );
    }

    #[test]
    fn test_record_roundtrip_with_parentheses() {
        let fields = vec![some("(nested)"), some("tab\there"), None];
        assert_eq!(parse_record(&format_record(&fields)).unwrap(), fields);
    }

    #[test]
    fn test_parse_record_exact_arity() {
        let [a, b] = parse_record_exact::<2>("point", "(1,2)").unwrap();
        assert_eq!((a, b), (some("1"), some("2")));
        assert!(parse_record_exact::<3>("point", "(1,2)").is_err());
    }

    #[test]
    fn test_zero_field_record() {
        let text = format_record(&[]);
        assert_eq!(text, "()");
        let fields: [Option<String>; 0] = parse_record_exact("empty", &text).unwrap();
        assert!(fields.is_empty());
        assert!(parse_record_exact::<0>("empty", "(a)").is_err());
        assert_eq!(parse_record_exact::<1>("one", "()").unwrap(), [None::<String>]);
    }

    #[test]
    fn test_parse_record_rejects_garbage() {
        assert!(parse_record("1,2)").is_err());
        assert!(parse_record("(1,2").is_err());
        assert!(parse_record("(1,2) x").is_err());
    }

    #[test]
    fn test_single_null_field() {
        assert_eq!(parse_record("()").unwrap(), vec![None]);
    }

    #[test]
    fn test_format_array() {
        let elements = [some("a"), None, some(""), some("NULL"), some("x y"), some("q\"")];
        assert_eq!(
            format_array(&elements),
            r#"{a,NULL,"","NULL","x y","q\""}"#
        );
    }

    #[test]
    fn test_parse_array() {
        let parsed = parse_array(r#"{a, NULL,"","NULL","x y","q\""}"#).unwrap();
        assert_eq!(
            parsed,
            vec![some("a"), None, some(""), some("NULL"), some("x y"), some("q\"")]
        );
        assert_eq!(parse_array("{}").unwrap(), Vec::<Option<String>>::new());
        assert_eq!(parse_array("[0:1]={1,2}").unwrap(), vec![some("1"), some("2")]);
    }

    #[test]
    fn test_parse_array_rejects_nested() {
        assert!(parse_array("{{1,2},{3,4}}").is_err());
    }

    #[test]
    fn test_decode_required_null() {
        let err = decode_required::<i32>("point", "x", None).unwrap_err();
        assert!(err.to_string().contains("field x is NULL"));
        assert_eq!(decode_optional::<i32>(None).unwrap(), None);
        assert_eq!(decode_optional::<i32>(some("5")).unwrap(), Some(5));
    }
}
