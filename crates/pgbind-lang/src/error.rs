//! Error types for statement script parsing.

use crate::span::{offset_to_line_col, Span};
use thiserror::Error;

/// Error during lexing/parsing of a statement script.
#[derive(Debug, Error)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// Source span where the error occurred.
    pub span: Span,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Add a hint to the error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// 1-based line and column of the error start.
    pub fn location(&self, source: &str) -> (usize, usize) {
        offset_to_line_col(source, self.span.start)
    }

    /// Format the error with source context.
    pub fn format_with_source(&self, source: &str) -> String {
        let (line, col) = self.location(source);
        let mut result = format!("error: {}\n", self.message);
        result.push_str(&format!("  --> line {}:{}\n", line, col));

        if let Some(source_line) = source.lines().nth(line - 1) {
            result.push_str(&format!("   |\n{:3}| {}\n   |", line, source_line));

            for _ in 0..col {
                result.push(' ');
            }
            result.push('^');

            let span_len = self.span.end.saturating_sub(self.span.start);
            let remaining = source_line.chars().count().saturating_sub(col) + 1;
            for _ in 1..span_len.min(remaining) {
                result.push('~');
            }
            result.push('\n');
        }

        if let Some(hint) = &self.hint {
            result.push_str(&format!("   = hint: {}\n", hint));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_source() {
        let source = "-- name: a :one\nSELECT $1;\n";
        let err = ParseError::new("positional parameter", Span::new(23, 25))
            .with_hint("use :name");
        let formatted = err.format_with_source(source);
        assert!(formatted.contains("line 2:8"));
        assert!(formatted.contains("SELECT $1;"));
        assert!(formatted.contains("^~"));
        assert!(formatted.contains("hint: use :name"));
    }
}
