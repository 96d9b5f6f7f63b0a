//! Function compiler for generating bytecode from function bodies.
//!
//! This module provides [`FunctionCompiler`] which compiles one method
//! body to bytecode. It handles:
//!
//! - Binding parameters to the first local slots
//! - Declaring locals and allocating array locals
//! - Compiling the body statements
//! - Appending the implicit return
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = FunctionCompiler::new(&mut symbols, &mut constants, "sq", DataType::INTEGER, span);
//! compiler.setup_parameters(&params)?;
//! compiler.declare_locals(decl.locals)?;
//! compiler.compile_body(&decl.body)?;
//! let (local_count, chunk) = compiler.finish()?;
//! ```

use pascalc_ast::{Block, Ident, VarDecl};
use pascalc_core::{ArrayType, CompilationError, DataType, Span};

use crate::bytecode::{BytecodeChunk, ConstantPool, OpCode};
use crate::emit::{BytecodeEmitter, EmitError};
use crate::expr::emit_error;
use crate::stmt::StmtCompiler;
use crate::symbols::SymbolTable;
use crate::type_resolver::{cell_count, resolve_type};
use crate::unit::MAIN;

type Result<T> = std::result::Result<T, CompilationError>;

/// Compiles a single method body to bytecode.
pub struct FunctionCompiler<'a, 'pool> {
    /// Symbols of the unit; the local scope belongs to this body
    symbols: &'a mut SymbolTable,
    /// Bytecode emitter
    emitter: BytecodeEmitter<'pool>,
    /// Method name
    name: String,
    /// `None` for the entry routine
    return_type: Option<DataType>,
    /// Declaration span, for errors raised while finishing
    span: Span,
}

impl<'a, 'pool> FunctionCompiler<'a, 'pool> {
    /// Start compiling a user function.
    pub fn new(
        symbols: &'a mut SymbolTable,
        constants: &'pool mut ConstantPool,
        name: &str,
        return_type: DataType,
        span: Span,
    ) -> Self {
        symbols.begin_function(name, return_type.clone());
        Self {
            symbols,
            emitter: BytecodeEmitter::new(constants),
            name: name.to_string(),
            return_type: Some(return_type),
            span,
        }
    }

    /// Start compiling the entry routine. It has no parameters, no result
    /// and sees only globals and functions.
    pub fn entry(symbols: &'a mut SymbolTable, constants: &'pool mut ConstantPool, span: Span) -> Self {
        symbols.begin_entry();
        Self {
            symbols,
            emitter: BytecodeEmitter::new(constants),
            name: MAIN.to_string(),
            return_type: None,
            span,
        }
    }

    /// Bind parameters to the first local slots, in order.
    pub fn setup_parameters(&mut self, params: &[(Ident<'_>, DataType)]) -> Result<()> {
        for (ident, ty) in params {
            self.check_name(ident, "parameter")?;
            self.symbols.add_local(ident.name, ty.clone(), ident.span)?;
        }
        Ok(())
    }

    /// Declare locals after the parameters. Array locals get their backing
    /// store here.
    pub fn declare_locals(&mut self, decls: &[VarDecl<'_>]) -> Result<()> {
        for decl in decls {
            let ty = resolve_type(&decl.ty)?;
            for ident in decl.names {
                self.check_name(ident, "local variable")?;
                let slot = self.symbols.add_local(ident.name, ty.clone(), ident.span)?;
                if let Some(array) = ty.as_array() {
                    self.emitter.set_line(ident.span.line);
                    emit_allocation(&mut self.emitter, array)
                        .map_err(|e| emit_error(e, ident.span))?;
                    self.emitter.emit_set_local(slot);
                }
            }
        }
        Ok(())
    }

    /// Compile the body statements.
    pub fn compile_body(&mut self, body: &Block<'_>) -> Result<()> {
        let mut stmt_compiler = StmtCompiler::new(self.symbols, &mut self.emitter);
        for stmt in body.stmts {
            stmt_compiler.compile(stmt)?;
        }
        Ok(())
    }

    /// Append the implicit return, close the local scope and resolve jumps.
    ///
    /// A function that ends without assigning its result returns the zero
    /// value of its type. Returns the slot count and the code.
    pub fn finish(mut self) -> Result<(u16, BytecodeChunk)> {
        match &self.return_type {
            Some(DataType::Array(_)) => {
                self.emitter.emit_null();
                self.emitter.emit_return();
            }
            Some(DataType::Primitive(_)) => {
                self.emitter.emit(OpCode::PushZero);
                self.emitter.emit_return();
            }
            None => self.emitter.emit_return_void(),
        }

        let local_count = self.symbols.local_count();
        self.symbols.end_function();

        let chunk = self.emitter.finish().map_err(|e| emit_error(e, self.span))?;
        Ok((local_count, chunk))
    }

    /// A function's parameters and locals may not reuse its name, which
    /// designates the result.
    fn check_name(&self, ident: &Ident<'_>, kind: &str) -> Result<()> {
        if self.return_type.is_some() && ident.name == self.name {
            return Err(CompilationError::IllegalName {
                name: ident.name.to_string(),
                message: format!("a {kind} cannot share the name of its function"),
                span: ident.span,
            });
        }
        Ok(())
    }
}

/// Push a new zero-filled backing store sized for `array`.
pub(crate) fn emit_allocation(
    emitter: &mut BytecodeEmitter<'_>,
    array: &ArrayType,
) -> std::result::Result<(), EmitError> {
    emitter.emit_int(cell_count(array))?;
    emitter.emit(OpCode::NewArray);
    Ok(())
}
