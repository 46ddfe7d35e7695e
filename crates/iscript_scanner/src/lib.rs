//! iscript_scanner: lexer for IndentScript source text.
//!
//! Produces a fully materialized token stream from source characters, with:
//! - INDENT/DEDENT synthesis from leading-whitespace width (space = 1,
//!   tab = 4), balanced over the whole stream
//! - NEWLINE collapse (no two adjacent NEWLINE tokens)
//! - string, f-string, template, number, identifier/keyword, operator,
//!   bracket and punctuation tokens
//!
//! The scanner does not raise; malformed input degrades to best-effort
//! tokens.

mod char_codes;
mod scanner;

pub use scanner::Scanner;

use iscript_ast::token::Token;

/// Tokenize a source string. Convenience wrapper over [`Scanner`].
pub fn tokenize(source: &str) -> Vec<Token> {
    Scanner::new(source).scan_tokens()
}
