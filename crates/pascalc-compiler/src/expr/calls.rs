//! Function call compilation.

use pascalc_ast::CallExpr;
use pascalc_core::{CompilationError, DataType};

use super::{ExprCompiler, Result};
use crate::symbols::type_list;

/// Compile a call. Arguments are pushed left to right, then the overload
/// whose parameter types match exactly is invoked.
pub fn compile_call(compiler: &mut ExprCompiler<'_, '_>, call: &CallExpr<'_>) -> Result<DataType> {
    let name = call.callee.name;

    let mut arg_types = Vec::with_capacity(call.args.len());
    for arg in call.args {
        arg_types.push(compiler.infer(arg)?);
    }

    let symbols = compiler.symbols();
    let signature = symbols
        .resolve_function(name, &arg_types)
        .ok_or_else(|| CompilationError::UnresolvedSymbol {
            name: name.to_string(),
            message: if symbols.has_function(name) {
                format!("no overload of '{name}' takes ({})", type_list(&arg_types))
            } else {
                format!("function '{name}' not found")
            },
            span: call.span,
        })?;

    let argc = u8::try_from(arg_types.len()).map_err(|_| CompilationError::ArityMismatch {
        message: format!("too many arguments in call to '{name}'"),
        expected: u8::MAX as usize,
        got: arg_types.len(),
        span: call.span,
    })?;

    tracing::trace!(function = name, method = %signature.method, "call");
    compiler.emitter().emit_call(signature.method.0, argc);
    Ok(signature.return_type.clone())
}

#[cfg(test)]
mod tests {
    use crate::bytecode::{ConstantPool, OpCode};
    use crate::emit::BytecodeEmitter;
    use crate::expr::ExprCompiler;
    use crate::symbols::SymbolTable;
    use crate::unit::MethodId;
    use bumpalo::Bump;
    use pascalc_ast::AstBuilder;
    use pascalc_core::{CompilationError, DataType, Span};

    fn overloaded() -> SymbolTable {
        let mut symbols = SymbolTable::new();
        symbols
            .declare_function("f", vec![DataType::INTEGER], DataType::INTEGER, MethodId(2), Span::default())
            .unwrap();
        symbols
            .declare_function(
                "f",
                vec![DataType::INTEGER, DataType::INTEGER],
                DataType::BOOLEAN,
                MethodId(3),
                Span::default(),
            )
            .unwrap();
        symbols
    }

    #[test]
    fn picks_overload_by_argument_types() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let symbols = overloaded();
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        let mut compiler = ExprCompiler::new(&symbols, &mut emitter);

        assert_eq!(compiler.infer(&b.call("f", &[b.int(1)])), Ok(DataType::INTEGER));
        assert_eq!(
            compiler.infer(&b.call("f", &[b.int(1), b.int(2)])),
            Ok(DataType::BOOLEAN)
        );

        let chunk = emitter.finish().unwrap();
        chunk.assert_opcodes(&[
            OpCode::PushOne,
            OpCode::Call,
            OpCode::PushOne,
            OpCode::Constant,
            OpCode::Call,
        ]);
        assert_eq!(chunk.read_u16(2), Some(2));
    }

    #[test]
    fn no_matching_overload() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let symbols = overloaded();
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        let mut compiler = ExprCompiler::new(&symbols, &mut emitter);

        let err = compiler.infer(&b.call("f", &[b.bool(true)])).unwrap_err();
        assert!(matches!(err, CompilationError::UnresolvedSymbol { .. }));
        assert!(err.to_string().contains("no overload of 'f' takes (boolean)"));

        let err = compiler.infer(&b.call("g", &[])).unwrap_err();
        assert!(err.to_string().contains("function 'g' not found"));
    }
}
