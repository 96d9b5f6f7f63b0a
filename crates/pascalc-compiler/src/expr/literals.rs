//! Literal expression compilation.

use pascalc_ast::{LiteralExpr, LiteralKind};
use pascalc_core::DataType;

use super::{ExprCompiler, Result};

/// Compile a literal.
pub fn compile_literal(compiler: &mut ExprCompiler<'_, '_>, lit: &LiteralExpr) -> Result<DataType> {
    match lit.kind {
        LiteralKind::Int(value) => {
            compiler.emit_int(value, lit.span)?;
            Ok(DataType::INTEGER)
        }
        LiteralKind::Bool(value) => {
            compiler.emitter().emit_bool(value);
            Ok(DataType::BOOLEAN)
        }
    }
}
