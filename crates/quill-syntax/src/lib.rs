//! Total parser and document tree for Quill markup.
//!
//! Quill documents are text interleaved with backslash directives of the
//! form `\name[arguments]{content}`. This crate turns source text into a tree
//! of [`Content`] nodes in two steps:
//!
//! 1. [`parse`] scans the source once and emits a flat stream of
//!    [`Instruction`]s. Parsing never fails; anything that does not match the
//!    grammar is kept as text.
//! 2. [`build_ast`] replays the stream into an owned tree whose nodes refer
//!    back to the source through [`SourceSpan`]s.
//!
//! The instruction stream is also the input of the markup self-highlighter in
//! [`highlight`].
//!
//! # Example
//!
//! ```
//! use quill_syntax::{parse_and_build, print_ast};
//!
//! let source = "Hello \\b{world}";
//! let content = parse_and_build(source);
//! assert_eq!(
//!     print_ast(source, &content),
//!     "Text \"Hello \"\nDirective \\b\n  Block\n    Text \"world\"\n"
//! );
//! ```

pub mod ast;
mod builder;
pub mod chars;
pub mod highlight;
mod instruction;
mod parser;
mod print;
mod span;
pub mod unicode;

pub use ast::{Argument, Content, Directive, Display, Escaped, Generated, GeneratedKind, Text};
pub use builder::{build_ast, parse_and_build};
pub use highlight::{HighlightKind, HighlightOptions, HighlightSpan};
pub use instruction::{Instruction, InstructionKind, is_well_formed};
pub use parser::{MAX_NESTING_DEPTH, parse, parse_bytes};
pub use print::print_ast;
pub use span::SourceSpan;
