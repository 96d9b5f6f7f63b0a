//! Abstract syntax tree for Pascal-like program units.
//!
//! All nodes are allocated in a [`bumpalo::Bump`] arena and borrow from it
//! for the `'ast` lifetime; they are `Copy` and immutable once built.
//!
//! - [`Program`], [`VarDecl`], [`FunctionDecl`]: declarations
//! - [`Stmt`]: statements
//! - [`Expr`]: expressions
//! - [`AstBuilder`]: construction helpers

pub mod builder;
pub mod decl;
pub mod expr;
pub mod node;
pub mod ops;
pub mod stmt;
pub mod types;

pub use builder::AstBuilder;
pub use decl::*;
pub use expr::*;
pub use node::*;
pub use ops::*;
pub use stmt::*;
pub use types::*;
