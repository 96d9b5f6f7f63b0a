//! Statement compiler.
//!
//! The [`StmtCompiler`] compiles statements of one method body, handling:
//! - Assignments to variables, array elements and the function result
//! - If/else, while and counting for loops with break/continue support
//! - Blocks and call statements
//! - `read` and `write`
//!
//! A statement that fails to compile leaves no code behind: the emitter is
//! rewound to where the statement started.
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = StmtCompiler::new(&mut symbols, &mut emitter);
//! compiler.compile(&stmt)?;
//! ```

mod assign;
mod block;
mod for_stmt;
mod if_stmt;
mod io;
mod while_stmt;

use pascalc_ast::{QualifiedName, Stmt};
use pascalc_core::{CompilationError, DataType, Span};

use crate::bytecode::OpCode;
use crate::emit::{BytecodeEmitter, Label};
use crate::expr::{ExprCompiler, compile_element_address, emit_error, emit_store, require_array};
use crate::symbols::{SymbolTable, Target, Variable};

type Result<T> = std::result::Result<T, CompilationError>;

/// Compiles statements to bytecode.
pub struct StmtCompiler<'a, 'pool> {
    /// Symbols of the unit and the current body
    symbols: &'a mut SymbolTable,
    /// Bytecode emitter for the current body
    emitter: &'a mut BytecodeEmitter<'pool>,
}

impl<'a, 'pool> StmtCompiler<'a, 'pool> {
    /// Create a new statement compiler.
    pub fn new(symbols: &'a mut SymbolTable, emitter: &'a mut BytecodeEmitter<'pool>) -> Self {
        Self { symbols, emitter }
    }

    /// Compile a statement.
    pub fn compile(&mut self, stmt: &Stmt<'_>) -> Result<()> {
        self.emitter.set_line(stmt.span().line);
        let checkpoint = self.emitter.checkpoint();

        let result = match stmt {
            Stmt::Assign(assign) => self.compile_assign(assign),
            Stmt::If(if_stmt) => self.compile_if(if_stmt),
            Stmt::While(while_stmt) => self.compile_while(while_stmt),
            Stmt::For(for_stmt) => self.compile_for(for_stmt),
            Stmt::Block(block) => self.compile_block(block),
            Stmt::Call(call) => self.compile_call_stmt(call),
            Stmt::Read(read) => self.compile_read(read),
            Stmt::Write(write) => self.compile_write(write),
            Stmt::Break(brk) => self.compile_break(brk),
            Stmt::Continue(cont) => self.compile_continue(cont),
        };

        if result.is_err() {
            self.emitter.rewind(checkpoint);
        }
        result
    }

    /// Create an expression compiler over the current symbols.
    fn expr_compiler(&mut self) -> ExprCompiler<'_, 'pool> {
        ExprCompiler::new(self.symbols, self.emitter)
    }

    fn bind(&mut self, label: Label, span: Span) -> Result<()> {
        self.emitter.bind_label(label).map_err(|e| emit_error(e, span))
    }

    /// Compile a loop body with `continue_label` and `break_label` as the
    /// innermost loop targets.
    fn compile_loop_body(
        &mut self,
        body: &Stmt<'_>,
        continue_label: Label,
        break_label: Label,
    ) -> Result<()> {
        self.symbols.enter_loop(continue_label, break_label);
        let result = self.compile(body);
        self.symbols.exit_loop();
        result
    }

    /// Resolve a name that is written to. Writing to the enclosing
    /// function's result is only allowed through a plain assignment.
    fn resolve_variable_target(&self, target: &QualifiedName<'_>, context: &str) -> Result<Variable> {
        match self.symbols.resolve_target(target.name()) {
            Some(Target::Variable(var)) => Ok(var.clone()),
            Some(Target::FunctionResult(_)) => Err(CompilationError::IllegalName {
                name: target.name().to_string(),
                message: format!("the function result cannot be used as {context}"),
                span: target.span,
            }),
            None => Err(unresolved_variable(target)),
        }
    }

    /// The type of the storage `target` designates inside `var`.
    fn target_type(var: &Variable, target: &QualifiedName<'_>) -> Result<DataType> {
        if target.is_indexed() {
            Ok(require_array(var, target.span)?.element_type())
        } else {
            Ok(var.ty.clone())
        }
    }

    /// Store into a variable or array element.
    ///
    /// For an element the array reference and bounds-checked offset are
    /// pushed first; `value` then pushes the value, given the type the
    /// storage expects.
    fn compile_store<F>(&mut self, var: &Variable, target: &QualifiedName<'_>, value: F) -> Result<()>
    where
        F: FnOnce(&mut ExprCompiler<'_, 'pool>, &DataType) -> Result<()>,
    {
        let mut exprs = self.expr_compiler();
        if target.is_indexed() {
            let array = require_array(var, target.span)?;
            compile_element_address(&mut exprs, var, array, target.indices, target.span)?;
            value(&mut exprs, &array.element_type())?;
            exprs.emitter().emit(OpCode::ArrayStore);
        } else {
            value(&mut exprs, &var.ty)?;
            emit_store(exprs.emitter(), var);
        }
        Ok(())
    }
}

fn unresolved_variable(target: &QualifiedName<'_>) -> CompilationError {
    CompilationError::UnresolvedSymbol {
        name: target.name().to_string(),
        message: format!("variable '{}' not found", target.name()),
        span: target.span,
    }
}
