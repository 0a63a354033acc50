//! Parser for the template directive language

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::{parse, parse_strict, parse_with_mode};
