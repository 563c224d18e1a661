//! Lexer for statement scripts using logos.
//!
//! The lexer only distinguishes what the parser needs to find statement
//! boundaries and named parameters: headers, comments, literals and quoted
//! identifiers (which may contain anything), parameters, casts and
//! semicolons. Everything else is an opaque word, number or symbol.

use crate::error::ParseError;
use crate::span::Span;
use logos::Logos;

/// Token types of a statement script.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    /// `-- name: <ident> :<cardinality>`
    #[regex(r"--[ \t]*name:[^\r\n]*", priority = 20)]
    Header,

    #[regex(r"--[^\r\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    // Standard and escape string literals
    #[regex(r"'([^']|'')*'")]
    #[regex(r"[eE]'([^'\\]|\\.|'')*'")]
    StringLit,

    #[regex(r#""([^"]|"")*""#)]
    QuotedIdent,

    #[regex(r"\$([A-Za-z_][A-Za-z0-9_]*)?\$", dollar_quoted)]
    DollarQuoted,

    /// `$1`; rejected by the parser.
    #[regex(r"\$[0-9]+")]
    Positional,

    #[token("::")]
    Cast,

    /// Named parameter; carries the text after the colon, including a
    /// trailing `?` marking a nullable parameter.
    #[regex(r":[A-Za-z_][A-Za-z0-9_]*\??", |lex| lex.slice()[1..].to_string())]
    Param(String),

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[regex(r"[A-Za-z_][A-Za-z0-9_$]*")]
    Word,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r"[(),.\[\]+\-*/<>=~!@#%^&|`?{}]")]
    Symbol,
}

/// Consume a dollar-quoted body up to and including the closing tag.
fn dollar_quoted(lex: &mut logos::Lexer<Token>) -> bool {
    let tag = lex.slice().to_string();
    match lex.remainder().find(&tag) {
        Some(end) => {
            lex.bump(end + tag.len());
            true
        }
        None => false,
    }
}

impl Token {
    /// Check if this token is a comment.
    pub fn is_comment(&self) -> bool {
        matches!(self, Token::LineComment | Token::BlockComment)
    }
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Tokenize a script, failing on the first character that starts no token.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span: Span = lexer.span().into();
        match result {
            Ok(token) => tokens.push(SpannedToken { token, span }),
            Err(()) => return Err(unexpected(source, span)),
        }
    }

    Ok(tokens)
}

fn unexpected(source: &str, span: Span) -> ParseError {
    let first = source[span.start..].chars().next().unwrap_or(' ');
    match first {
        '\'' => ParseError::new("unterminated string literal", span),
        '"' => ParseError::new("unterminated quoted identifier", span),
        '$' => ParseError::new("unterminated dollar-quoted string", span),
        '/' => ParseError::new("unterminated block comment", span),
        other => ParseError::new(format!("unexpected character '{}'", other), span),
    }
}
