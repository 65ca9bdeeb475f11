//! CLI command implementations.

pub(crate) mod ast;
pub(crate) mod highlight;
pub(crate) mod render;

pub(crate) use ast::AstArgs;
pub(crate) use highlight::HighlightArgs;
pub(crate) use render::RenderArgs;
