//! Core types shared by the translator, the AST and the runtime harness.
//!
//! - [`Span`]: source positions carried by AST nodes and diagnostics
//! - [`DataType`], [`ArrayType`], [`Range`], [`PrimitiveKind`]: the type system
//! - [`CompilationError`], [`ArtifactError`], [`RuntimeError`], [`PascalError`]: errors

mod data_type;
mod error;
mod span;

pub use data_type::{ArrayType, DataType, PrimitiveKind, Range};
pub use error::{ArtifactError, CompilationError, PascalError, RuntimeError};
pub use span::Span;
