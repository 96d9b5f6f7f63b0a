//! Variable references: plain names and array elements.

use pascalc_ast::QualifiedName;
use pascalc_core::{ArrayType, CompilationError, DataType, Span};

use super::{ExprCompiler, Result, compile_element_address};
use crate::bytecode::OpCode;
use crate::emit::BytecodeEmitter;
use crate::symbols::{Storage, Variable};

/// Compile a variable or array element read.
pub fn compile_name(compiler: &mut ExprCompiler<'_, '_>, name: &QualifiedName<'_>) -> Result<DataType> {
    let var = compiler
        .symbols()
        .resolve_variable(name.name())
        .ok_or_else(|| CompilationError::UnresolvedSymbol {
            name: name.name().to_string(),
            message: format!("variable '{}' not found", name.name()),
            span: name.span,
        })?;

    if !name.is_indexed() {
        emit_load(compiler.emitter(), var);
        return Ok(var.ty.clone());
    }

    let array = require_array(var, name.span)?;
    compile_element_address(compiler, var, array, name.indices, name.span)?;
    compiler.emitter().emit(OpCode::ArrayLoad);
    Ok(array.element_type())
}

/// The array type of `var`, or a mismatch if it is a scalar.
pub(crate) fn require_array(var: &Variable, span: Span) -> Result<&ArrayType> {
    var.ty.as_array().ok_or_else(|| CompilationError::TypeMismatch {
        message: format!("'{}' has type {} and cannot be indexed", var.name, var.ty),
        span,
    })
}

/// Push the value of a variable.
pub(crate) fn emit_load(emitter: &mut BytecodeEmitter<'_>, var: &Variable) {
    match var.storage {
        Storage::Local(slot) => emitter.emit_get_local(slot),
        Storage::Global(field) => emitter.emit_get_global(field.0),
    }
}

/// Pop the top of stack into a variable.
pub(crate) fn emit_store(emitter: &mut BytecodeEmitter<'_>, var: &Variable) {
    match var.storage {
        Storage::Local(slot) => emitter.emit_set_local(slot),
        Storage::Global(field) => emitter.emit_set_global(field.0),
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::{ConstantPool, OpCode};
    use crate::emit::BytecodeEmitter;
    use crate::expr::ExprCompiler;
    use crate::symbols::SymbolTable;
    use crate::unit::FieldId;
    use bumpalo::Bump;
    use pascalc_ast::AstBuilder;
    use pascalc_core::{CompilationError, DataType, Span};

    #[test]
    fn locals_shadow_globals() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut symbols = SymbolTable::new();
        symbols.declare_global("x", DataType::BOOLEAN, FieldId(0), Span::default()).unwrap();
        symbols.declare_global("g", DataType::BOOLEAN, FieldId(1), Span::default()).unwrap();
        symbols.begin_function("f", DataType::INTEGER);
        symbols.add_local("x", DataType::INTEGER, Span::default()).unwrap();

        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        let mut compiler = ExprCompiler::new(&symbols, &mut emitter);

        assert_eq!(compiler.infer(&b.var("x")), Ok(DataType::INTEGER));
        assert_eq!(compiler.infer(&b.var("g")), Ok(DataType::BOOLEAN));

        emitter.finish().unwrap().assert_opcodes(&[OpCode::GetLocal, OpCode::GetGlobal]);
    }

    #[test]
    fn unknown_variable() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let symbols = SymbolTable::new();
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        let mut compiler = ExprCompiler::new(&symbols, &mut emitter);

        let err = compiler.infer(&b.at(2, 4).var("nope")).unwrap_err();
        assert!(matches!(err, CompilationError::UnresolvedSymbol { ref name, .. } if name == "nope"));
        assert_eq!(err.span(), Span::point(2, 4));
    }

    #[test]
    fn indexing_a_scalar_fails() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let mut symbols = SymbolTable::new();
        symbols.declare_global("n", DataType::INTEGER, FieldId(0), Span::default()).unwrap();
        let mut constants = ConstantPool::new();
        let mut emitter = BytecodeEmitter::new(&mut constants);
        let mut compiler = ExprCompiler::new(&symbols, &mut emitter);

        let err = compiler.infer(&b.index("n", &[b.int(1)])).unwrap_err();
        assert!(matches!(err, CompilationError::TypeMismatch { .. }));
    }
}
