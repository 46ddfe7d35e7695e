//! iscript_parser: recursive descent parser for IndentScript.
//!
//! Consumes the scanner's token stream and builds an arena-allocated
//! statement tree. Expression nodes are left as opaque token runs; see the
//! `iscript_ast` crate for the tree model.

mod parser;

pub use parser::Parser;
