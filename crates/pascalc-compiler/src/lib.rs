//! Pascal Unit Compiler
//!
//! A single-pass translator from a parsed program to a stack bytecode unit.
//! Scope resolution, type checking and instruction emission happen in one
//! walk over the AST.
//!
//! ## Modules
//!
//! - [`bytecode`]: Bytecode types (OpCode, BytecodeChunk, ConstantPool)
//! - [`emit`]: Bytecode emitter with forward-referenceable labels
//! - [`unit`]: Compiled units and the builder that assembles them
//! - [`artifact`]: Binary encoding of units
//! - [`symbols`]: Globals, function overloads, locals and loop targets
//! - [`type_resolver`]: Type resolution from AST to [`DataType`]s
//! - [`expr`]: Expression compiler
//! - [`stmt`]: Statement compiler for control flow, assignment and I/O
//! - [`translator`]: Program-level translation
//!
//! ## Example
//!
//! ```
//! use bumpalo::Bump;
//! use pascalc_ast::AstBuilder;
//! use pascalc_compiler::translate;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let program = b.program("hello", &[], &[], &[b.write(&[b.int(42)])]);
//!
//! let compiled = translate(&program).unwrap();
//! assert_eq!(compiled.name(), "Hello");
//! assert!(compiled.unit().entry().is_some());
//! ```
//!
//! [`DataType`]: pascalc_core::DataType

pub mod artifact;
pub mod bytecode;
pub mod emit;
pub mod expr;
mod function_compiler;
pub mod stmt;
pub mod symbols;
pub mod translator;
pub mod type_resolver;
pub mod unit;

pub use bytecode::{BytecodeChunk, Constant, ConstantPool, OpCode};
pub use emit::{BytecodeEmitter, EmitError, Label};
pub use expr::ExprCompiler;
pub use function_compiler::FunctionCompiler;
pub use stmt::StmtCompiler;
pub use symbols::{FunctionSignature, Storage, SymbolTable, Variable};
pub use translator::{CompiledUnit, Translator, translate};
pub use type_resolver::resolve_type;
pub use unit::{FieldDef, FieldId, MethodDef, MethodId, Unit, UnitBuilder};

// Re-export CompilationError from core for convenience
pub use pascalc_core::CompilationError;
