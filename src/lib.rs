//! Single-pass translator from a Pascal-like AST to stack bytecode.
//!
//! The work is split across crates:
//! - [`core`]: spans, the type system and the error hierarchy
//! - [`ast`]: arena-allocated program trees and a builder for them
//! - [`compiler`]: symbol tables, the emitter and the translator
//!
//! This crate adds [`runtime`], a loader and stack machine used to execute
//! translated units.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use pascalc::ast::{AstBuilder, BinaryOp};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let program = b.program(
//!     "hello",
//!     &[],
//!     &[],
//!     &[b.write(&[b.binary(b.int(6), BinaryOp::Mul, b.int(7))])],
//! );
//!
//! let output = pascalc::compile_and_run(&program, "").unwrap();
//! assert_eq!(output, "42\n");
//! ```

pub mod runtime;

pub use pascalc_ast as ast;
pub use pascalc_compiler as compiler;
pub use pascalc_core as core;

pub use pascalc_compiler::{CompiledUnit, Translator, translate};
pub use pascalc_core::{CompilationError, PascalError, RuntimeError};

/// Translate a program and run it, returning everything it writes.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_and_run(program: &ast::Program<'_>, input: &str) -> Result<String, PascalError> {
    let compiled = translate(program)?;
    runtime::run_to_string(compiled.binary(), input)
}
