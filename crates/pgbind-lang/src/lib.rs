//! pgbind statement scripts
//!
//! This crate parses the SQL scripts that declare named statements for code
//! generation.
//!
//! # Script Syntax
//!
//! ```text
//! -- name: user_by_email :one
//! SELECT id, email FROM users WHERE email = :email;
//!
//! -- name: posts_by_author :many
//! SELECT * FROM posts WHERE author_id = :author ORDER BY created_at;
//!
//! -- name: archive_posts :exec
//! UPDATE posts SET archived = true WHERE created_at < :before
//! ```
//!
//! A statement ends at `;` or at the next header. Named parameters are
//! rewritten to positional ones (`$1`, `$2`, ...) in order of first
//! appearance; a repeated name reuses its index. Parameters inside string
//! literals, quoted identifiers, dollar-quoted bodies and comments are left
//! alone, as are `::` casts. A parameter written `:name?` accepts NULL.
//!
//! # Usage
//!
//! ```rust
//! use pgbind_lang::parse_script;
//!
//! let statements = parse_script("-- name: one :one\nSELECT :x::int4 + :x").unwrap();
//! assert_eq!(statements[0].positional_sql, "SELECT $1::int4 + $1");
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

pub use error::ParseError;
pub use parser::{parse_script, Parameter, ParsedStatement};
pub use span::Span;
