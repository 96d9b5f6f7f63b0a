//! While loop compilation.

use pascalc_ast::WhileStmt;
use pascalc_core::DataType;

use crate::bytecode::OpCode;

use super::{Result, StmtCompiler};

impl<'a, 'pool> StmtCompiler<'a, 'pool> {
    /// Compile a while loop. The condition must be boolean.
    ///
    /// Bytecode layout:
    /// ```text
    /// continue:
    /// [condition]
    /// JumpIfZero -> break
    /// [body]
    /// Jump -> continue
    /// break:
    /// ```
    pub fn compile_while(&mut self, while_stmt: &WhileStmt<'_>) -> Result<()> {
        let continue_label = self.emitter.new_label();
        let break_label = self.emitter.new_label();

        self.bind(continue_label, while_stmt.span)?;
        self.expr_compiler()
            .check(while_stmt.condition, &DataType::BOOLEAN, "while condition")?;
        self.emitter.emit_jump(OpCode::JumpIfZero, break_label);

        self.compile_loop_body(while_stmt.body, continue_label, break_label)?;

        self.emitter.emit_jump(OpCode::Jump, continue_label);
        self.bind(break_label, while_stmt.span)
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::{ConstantPool, OpCode};
    use crate::emit::BytecodeEmitter;
    use crate::stmt::StmtCompiler;
    use crate::symbols::SymbolTable;
    use bumpalo::Bump;
    use pascalc_ast::AstBuilder;

    #[test]
    fn break_and_continue_targets() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut symbols = SymbolTable::new();
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        let mut compiler = StmtCompiler::new(&mut symbols, &mut emitter);

        let body = b.block(&[b.continue_(), b.break_()]);
        compiler.compile(&b.while_(b.bool(true), body)).unwrap();
        assert_eq!(symbols.loop_depth(), 0);

        let chunk = emitter.finish().unwrap();
        chunk.assert_opcodes(&[
            OpCode::PushOne,
            OpCode::JumpIfZero,
            OpCode::Jump,
            OpCode::Jump,
            OpCode::Jump,
        ]);
        // continue -> 0, break -> end of the loop (21)
        assert_eq!(chunk.read_u32(2), Some(21));
        assert_eq!(chunk.read_u32(7), Some(0));
        assert_eq!(chunk.read_u32(12), Some(21));
        assert_eq!(chunk.read_u32(17), Some(0));
    }

    #[test]
    fn loop_stack_popped_on_error() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut symbols = SymbolTable::new();
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        let mut compiler = StmtCompiler::new(&mut symbols, &mut emitter);

        let stmt = b.while_(b.bool(true), b.write(&[b.var("nope")]));
        assert!(compiler.compile(&stmt).is_err());
        assert_eq!(symbols.loop_depth(), 0);
    }
}
