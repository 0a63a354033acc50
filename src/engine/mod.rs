//! Document apply engine
//!
//! Loads a target file into a [`Document`], runs a template's operations
//! against it in source order and writes the result back.

mod apply;
mod document;
pub mod encoding;
mod error;
pub mod path;

pub use apply::{
    apply, apply_operation, load_document, prepare, render, resolve_target, write_document,
    Applied,
};
pub use document::Document;
pub use encoding::TextEncoding;
pub use error::TemplateError;
pub use path::expand_path;
