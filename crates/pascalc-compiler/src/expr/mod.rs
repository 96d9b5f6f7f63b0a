//! Expression compiler.
//!
//! The [`ExprCompiler`] emits the code of an expression and synthesizes its
//! type in the same walk:
//! - `infer()` - Emits the expression and returns its type
//! - `check()` - Emits the expression and verifies it has an expected type
//!
//! There is no implicit conversion between any two types, so `check` is an
//! exact structural comparison.

mod binary;
mod calls;
mod identifiers;
mod indexing;
mod literals;
mod unary;

use std::fmt::Display;

use pascalc_ast::Expr;
use pascalc_core::{CompilationError, DataType, Span};

use crate::emit::{BytecodeEmitter, EmitError, Label};
use crate::symbols::SymbolTable;

pub(crate) use identifiers::{emit_load, emit_store, require_array};
pub(crate) use indexing::compile_element_address;

type Result<T> = std::result::Result<T, CompilationError>;

/// Compiles expressions to bytecode.
pub struct ExprCompiler<'a, 'pool> {
    /// Symbols visible from the current body
    symbols: &'a SymbolTable,
    /// Bytecode emitter
    emitter: &'a mut BytecodeEmitter<'pool>,
}

impl<'a, 'pool> ExprCompiler<'a, 'pool> {
    /// Create a new expression compiler.
    pub fn new(symbols: &'a SymbolTable, emitter: &'a mut BytecodeEmitter<'pool>) -> Self {
        Self { symbols, emitter }
    }

    /// Emit an expression and return its type.
    pub fn infer(&mut self, expr: &Expr<'_>) -> Result<DataType> {
        match expr {
            Expr::Literal(lit) => literals::compile_literal(self, lit),
            Expr::Name(name) => identifiers::compile_name(self, name),
            Expr::Call(call) => calls::compile_call(self, call),
            Expr::Binary(bin) => binary::compile_binary(self, bin),
            Expr::Unary(un) => unary::compile_unary(self, un),
            Expr::Paren(p) => self.infer(p.expr),
        }
    }

    /// Emit an expression that must have type `expected`.
    ///
    /// `context` names the construct in the error message.
    pub fn check(
        &mut self,
        expr: &Expr<'_>,
        expected: &DataType,
        context: impl Display,
    ) -> Result<()> {
        let actual = self.infer(expr)?;
        if &actual != expected {
            return Err(CompilationError::type_mismatch(
                context,
                expected,
                &actual,
                expr.span(),
            ));
        }
        Ok(())
    }

    pub(crate) fn symbols(&self) -> &'a SymbolTable {
        self.symbols
    }

    pub(crate) fn emitter(&mut self) -> &mut BytecodeEmitter<'pool> {
        self.emitter
    }

    /// Push an integer, reporting a full constant pool against `span`.
    pub(crate) fn emit_int(&mut self, value: i32, span: Span) -> Result<()> {
        self.emitter.emit_int(value).map_err(|e| emit_error(e, span))
    }

    /// Bind a label, reporting emitter failures against `span`.
    pub(crate) fn bind(&mut self, label: Label, span: Span) -> Result<()> {
        self.emitter.bind_label(label).map_err(|e| emit_error(e, span))
    }
}

/// Wrap an emitter failure as a compilation error.
pub(crate) fn emit_error(err: EmitError, span: Span) -> CompilationError {
    CompilationError::Emit {
        message: err.to_string(),
        span,
    }
}
