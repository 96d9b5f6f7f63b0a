//! `read` and `write` statements.

use pascalc_ast::{ReadStmt, WriteStmt};
use pascalc_core::{CompilationError, PrimitiveKind};

use crate::bytecode::OpCode;

use super::{Result, StmtCompiler};

impl<'a, 'pool> StmtCompiler<'a, 'pool> {
    /// Print each value on its own line, left to right.
    pub fn compile_write(&mut self, write: &WriteStmt<'_>) -> Result<()> {
        for value in write.values {
            let ty = self.expr_compiler().infer(value)?;
            if !ty.is_primitive() {
                return Err(CompilationError::TypeMismatch {
                    message: format!("cannot write a value of type {ty}"),
                    span: value.span(),
                });
            }
            self.emitter.emit(OpCode::Print);
        }
        Ok(())
    }

    /// Fill each target from one input line, parsed per its declared type.
    /// Array elements are bounds-checked before the store.
    pub fn compile_read(&mut self, read: &ReadStmt<'_>) -> Result<()> {
        for target in read.targets {
            let var = self.resolve_variable_target(target, "a read target")?;
            self.compile_store(&var, target, |exprs, ty| {
                let op = match ty.as_primitive() {
                    Some(PrimitiveKind::Integer) => OpCode::ReadInt,
                    Some(PrimitiveKind::Boolean) => OpCode::ReadBool,
                    None => {
                        return Err(CompilationError::TypeMismatch {
                            message: format!("cannot read into '{}' of type {ty}", target.name()),
                            span: target.span,
                        });
                    }
                };
                exprs.emitter().emit(op);
                Ok(())
            })?;
        }
        Ok(())
    }
}
