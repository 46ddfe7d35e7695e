//! iscript_ast: token and tree definitions for the IndentScript transpiler.
//!
//! This crate defines the two data models that tie the pipeline together:
//! the token record emitted by the scanner and consumed by the parser, and
//! the statement tree emitted by the parser and consumed by the generator.
//! Expression nodes are opaque token slices; see [`node::Expression`].

pub mod node;
pub mod token;

pub use node::*;
pub use token::{is_reserved_word, Token, TokenKind};
