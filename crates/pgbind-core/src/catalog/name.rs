//! Schema-qualified identifiers.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A schema-qualified object name. Always carries both parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName {
    /// Schema (namespace) name.
    pub schema: String,
    /// Object name within the schema.
    pub name: String,
}

impl QualifiedName {
    /// Create a qualified name.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Render as a quoted SQL identifier, e.g. `"public"."users"`.
    pub fn to_sql(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.name))
    }
}

/// Quote an SQL identifier, doubling embedded quotes.
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

impl FromStr for QualifiedName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((schema, name)) if !schema.is_empty() && !name.is_empty() => {
                Ok(QualifiedName::new(schema, name))
            }
            _ => Err(Error::InvalidName(s.to_string())),
        }
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QualifiedName> for String {
    fn from(value: QualifiedName) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qualified_name() {
        let name: QualifiedName = "public.users".parse().unwrap();
        assert_eq!(name.schema, "public");
        assert_eq!(name.name, "users");
        assert_eq!(name.to_string(), "public.users");
    }

    #[test]
    fn test_bare_name_rejected() {
        assert!("users".parse::<QualifiedName>().is_err());
        assert!(".users".parse::<QualifiedName>().is_err());
        assert!("public.".parse::<QualifiedName>().is_err());
    }

    #[test]
    fn test_to_sql_quotes() {
        let name = QualifiedName::new("app", "odd\"name");
        assert_eq!(name.to_sql(), "\"app\".\"odd\"\"name\"");
    }

    #[test]
    fn test_ordering_is_schema_first() {
        let mut names = vec![
            QualifiedName::new("b", "a"),
            QualifiedName::new("a", "z"),
            QualifiedName::new("a", "b"),
        ];
        names.sort();
        assert_eq!(names[0], QualifiedName::new("a", "b"));
        assert_eq!(names[2], QualifiedName::new("b", "a"));
    }

    #[test]
    fn test_serde_as_string() {
        let name = QualifiedName::new("public", "users");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"public.users\"");
        let back: QualifiedName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
