//! Parser for glossmark markup

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::{parse, TagSpec};
