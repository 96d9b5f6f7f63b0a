//! Assignment compilation.

use pascalc_ast::AssignStmt;
use pascalc_core::CompilationError;

use crate::symbols::Target;

use super::{Result, StmtCompiler, unresolved_variable};

impl<'a, 'pool> StmtCompiler<'a, 'pool> {
    /// Compile `target := value`.
    ///
    /// Assigning to the enclosing function's name sets its result and
    /// returns immediately. Otherwise the value is stored into the variable
    /// or array element, whose declared type it must match exactly.
    pub fn compile_assign(&mut self, assign: &AssignStmt<'_>) -> Result<()> {
        let target = &assign.target;
        let name = target.name();

        let var = match self.symbols.resolve_target(name) {
            Some(Target::FunctionResult(return_type)) => {
                if target.is_indexed() {
                    return Err(CompilationError::IllegalName {
                        name: name.to_string(),
                        message: "the function result cannot be indexed".to_string(),
                        span: target.span,
                    });
                }
                let return_type = return_type.clone();
                self.expr_compiler().check(
                    assign.value,
                    &return_type,
                    format_args!("result of '{name}'"),
                )?;
                self.emitter.emit_return();
                return Ok(());
            }
            Some(Target::Variable(var)) => var.clone(),
            None => return Err(unresolved_variable(target)),
        };

        self.compile_store(&var, target, |exprs, ty| {
            exprs.check(assign.value, ty, format_args!("assignment to '{name}'"))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::{ConstantPool, OpCode};
    use crate::emit::BytecodeEmitter;
    use crate::stmt::StmtCompiler;
    use crate::symbols::SymbolTable;
    use crate::unit::FieldId;
    use bumpalo::Bump;
    use pascalc_ast::AstBuilder;
    use pascalc_core::{ArrayType, CompilationError, DataType, PrimitiveKind, Range, Span};

    #[test]
    fn scalar_assignment() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut symbols = SymbolTable::new();
        symbols.declare_global("g", DataType::INTEGER, FieldId(0), Span::default()).unwrap();
        symbols.begin_function("f", DataType::BOOLEAN);
        symbols.add_local("x", DataType::INTEGER, Span::default()).unwrap();
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        let mut compiler = StmtCompiler::new(&mut symbols, &mut emitter);

        compiler.compile(&b.assign(b.name("x"), b.int(1))).unwrap();
        compiler.compile(&b.assign(b.name("g"), b.var("x"))).unwrap();

        emitter.finish().unwrap().assert_opcodes(&[
            OpCode::PushOne,
            OpCode::SetLocal,
            OpCode::GetLocal,
            OpCode::SetGlobal,
        ]);
    }

    #[test]
    fn boolean_into_integer_emits_nothing() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut symbols = SymbolTable::new();
        symbols.declare_global("n", DataType::INTEGER, FieldId(0), Span::default()).unwrap();
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        let mut compiler = StmtCompiler::new(&mut symbols, &mut emitter);

        let err = compiler.compile(&b.assign(b.name("n"), b.bool(true))).unwrap_err();
        assert!(matches!(err, CompilationError::TypeMismatch { .. }));
        assert_eq!(emitter.code_size(), 0);
    }

    #[test]
    fn result_write_returns() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut symbols = SymbolTable::new();
        symbols.begin_function("sq", DataType::INTEGER);
        symbols.add_local("n", DataType::INTEGER, Span::default()).unwrap();
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        let mut compiler = StmtCompiler::new(&mut symbols, &mut emitter);

        let value = b.binary(b.var("n"), pascalc_ast::BinaryOp::Mul, b.var("n"));
        compiler.compile(&b.assign(b.name("sq"), value)).unwrap();
        let err = compiler.compile(&b.assign(b.name("sq"), b.bool(false))).unwrap_err();
        assert!(err.to_string().contains("result of 'sq'"));

        emitter.finish().unwrap().assert_opcodes(&[
            OpCode::GetLocal,
            OpCode::GetLocal,
            OpCode::Mul,
            OpCode::Return,
        ]);
    }

    #[test]
    fn element_assignment_checks_element_type() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let flags = ArrayType::new(PrimitiveKind::Boolean, vec![Range::new(0, 3).unwrap()]).unwrap();
        let mut symbols = SymbolTable::new();
        symbols
            .declare_global("flags", DataType::Array(flags), FieldId(0), Span::default())
            .unwrap();
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        let mut compiler = StmtCompiler::new(&mut symbols, &mut emitter);

        compiler
            .compile(&b.assign(b.element("flags", &[b.int(2)]), b.bool(true)))
            .unwrap();
        assert!(matches!(
            compiler.compile(&b.assign(b.element("flags", &[b.int(2)]), b.int(1))),
            Err(CompilationError::TypeMismatch { .. })
        ));

        let chunk = emitter.finish().unwrap();
        assert_eq!(chunk.opcodes().first(), Some(&OpCode::GetGlobal));
        assert_eq!(chunk.opcodes().last(), Some(&OpCode::ArrayStore));
        chunk.assert_contains_opcodes(&[OpCode::Fault, OpCode::PushOne, OpCode::ArrayStore]);
    }

    #[test]
    fn unknown_target() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut symbols = SymbolTable::new();
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        let mut compiler = StmtCompiler::new(&mut symbols, &mut emitter);

        assert!(matches!(
            compiler.compile(&b.assign(b.name("ghost"), b.int(1))),
            Err(CompilationError::UnresolvedSymbol { .. })
        ));
    }
}
