//! Blocks, call statements, break and continue.

use pascalc_ast::{Block, BreakStmt, CallExpr, ContinueStmt, Expr};
use pascalc_core::CompilationError;

use crate::bytecode::OpCode;

use super::{Result, StmtCompiler};

impl<'a, 'pool> StmtCompiler<'a, 'pool> {
    /// Compile the statements of a block in order.
    pub fn compile_block(&mut self, block: &Block<'_>) -> Result<()> {
        for stmt in block.stmts {
            self.compile(stmt)?;
        }
        Ok(())
    }

    /// Compile a call made for its side effects. The result is discarded.
    pub fn compile_call_stmt(&mut self, call: &CallExpr<'_>) -> Result<()> {
        let expr = Expr::Call(call);
        self.expr_compiler().infer(&expr)?;
        self.emitter.emit(OpCode::Pop);
        Ok(())
    }

    /// Jump to the end of the innermost loop.
    pub fn compile_break(&mut self, brk: &BreakStmt) -> Result<()> {
        let target = self
            .symbols
            .innermost_loop()
            .ok_or(CompilationError::IllegalControlFlow {
                keyword: "break",
                span: brk.span,
            })?;
        self.emitter.emit_jump(OpCode::Jump, target.break_label);
        Ok(())
    }

    /// Jump to the continue point of the innermost loop.
    pub fn compile_continue(&mut self, cont: &ContinueStmt) -> Result<()> {
        let target = self
            .symbols
            .innermost_loop()
            .ok_or(CompilationError::IllegalControlFlow {
                keyword: "continue",
                span: cont.span,
            })?;
        self.emitter.emit_jump(OpCode::Jump, target.continue_label);
        Ok(())
    }
}
