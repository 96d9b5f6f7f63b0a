//! If/else statement compilation.

use pascalc_ast::IfStmt;
use pascalc_core::DataType;

use crate::bytecode::OpCode;

use super::{Result, StmtCompiler};

impl<'a, 'pool> StmtCompiler<'a, 'pool> {
    /// Compile an if statement. The condition must be boolean.
    ///
    /// Bytecode layout:
    /// ```text
    /// [condition]
    /// JumpIfZero -> else (or end)
    /// [then branch]
    /// Jump -> end          (only with an else branch)
    /// else:
    /// [else branch]
    /// end:
    /// ```
    pub fn compile_if(&mut self, if_stmt: &IfStmt<'_>) -> Result<()> {
        self.expr_compiler()
            .check(if_stmt.condition, &DataType::BOOLEAN, "if condition")?;

        let end = self.emitter.new_label();
        match if_stmt.else_branch {
            Some(else_branch) => {
                let else_label = self.emitter.new_label();
                self.emitter.emit_jump(OpCode::JumpIfZero, else_label);
                self.compile(if_stmt.then_branch)?;
                self.emitter.emit_jump(OpCode::Jump, end);
                self.bind(else_label, if_stmt.span)?;
                self.compile(else_branch)?;
            }
            None => {
                self.emitter.emit_jump(OpCode::JumpIfZero, end);
                self.compile(if_stmt.then_branch)?;
            }
        }
        self.bind(end, if_stmt.span)
    }
}
