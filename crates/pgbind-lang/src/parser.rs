//! Parser splitting a script into named statements.

use crate::error::ParseError;
use crate::lexer::{tokenize, SpannedToken, Token};
use crate::span::Span;
use pgbind_core::Cardinality;
use std::collections::HashSet;

/// A named parameter of a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name without the colon.
    pub name: String,
    /// Whether any occurrence was written as `:name?`.
    pub nullable: bool,
    /// Span of the first occurrence.
    pub span: Span,
}

/// A named statement parsed from a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatement {
    /// Statement name from the header.
    pub name: String,
    /// Declared cardinality.
    pub cardinality: Cardinality,
    /// SQL as written, with named parameters.
    pub sql: String,
    /// SQL with named parameters rewritten to `$n`.
    pub positional_sql: String,
    /// Parameters in order of first appearance; `$n` is index n-1.
    pub parameters: Vec<Parameter>,
    /// Span of the header.
    pub span: Span,
}

impl ParsedStatement {
    /// Parameter names in positional order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }
}

/// Statement being assembled from tokens.
struct Pending {
    name: String,
    cardinality: Cardinality,
    header: Span,
    body: Option<Span>,
    parameters: Vec<Parameter>,
    /// Parameter occurrences: (span, 1-based index).
    occurrences: Vec<(Span, usize)>,
}

impl Pending {
    fn extend_body(&mut self, span: Span) {
        self.body = Some(match self.body {
            Some(body) => body.merge(span),
            None => span,
        });
    }

    fn bind(&mut self, raw: &str, span: Span) {
        let (name, nullable) = match raw.strip_suffix('?') {
            Some(name) => (name, true),
            None => (raw, false),
        };
        let index = match self.parameters.iter().position(|p| p.name == name) {
            Some(i) => {
                self.parameters[i].nullable |= nullable;
                i + 1
            }
            None => {
                self.parameters.push(Parameter {
                    name: name.to_string(),
                    nullable,
                    span,
                });
                self.parameters.len()
            }
        };
        self.occurrences.push((span, index));
    }

    fn finish(self, source: &str) -> Result<ParsedStatement, ParseError> {
        let body = self.body.ok_or_else(|| {
            ParseError::new(format!("statement '{}' has no SQL", self.name), self.header)
        })?;

        let mut positional = String::with_capacity(body.len());
        let mut cursor = body.start;
        for (span, index) in &self.occurrences {
            positional.push_str(&source[cursor..span.start]);
            positional.push_str(&format!("${}", index));
            cursor = span.end;
        }
        positional.push_str(&source[cursor..body.end]);

        Ok(ParsedStatement {
            name: self.name,
            cardinality: self.cardinality,
            sql: source[body.start..body.end].to_string(),
            positional_sql: positional,
            parameters: self.parameters,
            span: self.header,
        })
    }
}

/// Parser for statement scripts.
pub struct Parser<'source> {
    source: &'source str,
    tokens: Vec<SpannedToken>,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Result<Self, ParseError> {
        Ok(Self {
            source,
            tokens: tokenize(source)?,
        })
    }

    /// Parse every statement in the script.
    pub fn parse_script(self) -> Result<Vec<ParsedStatement>, ParseError> {
        let mut statements = Vec::new();
        let mut names = HashSet::new();
        let mut pending: Option<Pending> = None;

        for tok in &self.tokens {
            match &tok.token {
                Token::Header => {
                    if let Some(done) = pending.take() {
                        statements.push(done.finish(self.source)?);
                    }
                    let (name, cardinality) = self.parse_header(tok.span)?;
                    if !names.insert(name.clone()) {
                        return Err(ParseError::new(
                            format!("duplicate statement name '{}'", name),
                            tok.span,
                        ));
                    }
                    pending = Some(Pending {
                        name,
                        cardinality,
                        header: tok.span,
                        body: None,
                        parameters: Vec::new(),
                        occurrences: Vec::new(),
                    });
                }
                token if token.is_comment() => {
                    // Comments inside a body are kept; leading ones are not.
                    if let Some(p) = pending.as_mut() {
                        if p.body.is_some() {
                            p.extend_body(tok.span);
                        }
                    }
                }
                Token::Semicolon => {
                    if let Some(done) = pending.take() {
                        statements.push(done.finish(self.source)?);
                    } else {
                        return Err(outside_statement(tok.span));
                    }
                }
                Token::Positional => {
                    return Err(ParseError::new(
                        format!(
                            "positional parameter '{}' is not supported",
                            &self.source[tok.span.start..tok.span.end]
                        ),
                        tok.span,
                    )
                    .with_hint("use a named parameter such as :id"));
                }
                Token::Param(name) => {
                    let p = pending.as_mut().ok_or_else(|| outside_statement(tok.span))?;
                    p.extend_body(tok.span);
                    p.bind(name, tok.span);
                }
                _ => {
                    let p = pending.as_mut().ok_or_else(|| outside_statement(tok.span))?;
                    p.extend_body(tok.span);
                }
            }
        }

        if let Some(done) = pending.take() {
            statements.push(done.finish(self.source)?);
        }

        Ok(statements)
    }

    /// Parse `-- name: <ident> :<cardinality>`.
    fn parse_header(&self, span: Span) -> Result<(String, Cardinality), ParseError> {
        let text = &self.source[span.start..span.end];
        let rest = text
            .trim_start_matches('-')
            .trim_start()
            .trim_start_matches("name:");
        let parts: Vec<&str> = rest.split_whitespace().collect();

        let (name, cardinality) = match parts.as_slice() {
            [name, cardinality] => (*name, *cardinality),
            _ => {
                return Err(ParseError::new("malformed statement header", span)
                    .with_hint("expected `-- name: <identifier> :one|:many|:exec`"))
            }
        };

        if !is_identifier(name) {
            return Err(ParseError::new(
                format!("invalid statement name '{}'", name),
                span,
            )
            .with_hint("statement names must be identifiers: letters, digits and underscores"));
        }

        let cardinality = match cardinality {
            ":one" => Cardinality::One,
            ":many" => Cardinality::Many,
            ":exec" => Cardinality::Exec,
            other => {
                return Err(ParseError::new(
                    format!("unknown cardinality '{}'", other),
                    span,
                )
                .with_hint("use :one, :many or :exec"))
            }
        };

        Ok((name.to_string(), cardinality))
    }
}

fn outside_statement(span: Span) -> ParseError {
    ParseError::new("SQL outside of a named statement", span)
        .with_hint("start each statement with `-- name: <identifier> :one|:many|:exec`")
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse a statement script.
pub fn parse_script(source: &str) -> Result<Vec<ParsedStatement>, ParseError> {
    Parser::new(source)?.parse_script()
}
