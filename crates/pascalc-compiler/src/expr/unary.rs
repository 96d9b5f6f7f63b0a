//! Unary operator compilation.

use pascalc_ast::{Expr, UnaryExpr, UnaryOp};
use pascalc_core::DataType;

use super::{ExprCompiler, Result};
use crate::bytecode::OpCode;

/// Compile a unary operation.
///
/// A chain of `not` collapses to one parity check: the operand is emitted
/// once and inverted only when the chain length is odd.
pub fn compile_unary(compiler: &mut ExprCompiler<'_, '_>, expr: &UnaryExpr<'_>) -> Result<DataType> {
    match expr.op {
        UnaryOp::Not => {
            let (depth, operand) = strip_not_chain(expr);
            compiler.check(operand, &DataType::BOOLEAN, "operand of 'not'")?;
            if depth % 2 == 1 {
                let emitter = compiler.emitter();
                emitter.emit(OpCode::PushOne);
                emitter.emit(OpCode::BitXor);
            }
            Ok(DataType::BOOLEAN)
        }
        UnaryOp::Neg => {
            compiler.check(expr.operand, &DataType::INTEGER, "operand of unary '-'")?;
            compiler.emitter().emit(OpCode::Neg);
            Ok(DataType::INTEGER)
        }
        UnaryOp::Plus => {
            compiler.check(expr.operand, &DataType::INTEGER, "operand of unary '+'")?;
            Ok(DataType::INTEGER)
        }
    }
}

/// Count directly nested `not`s (through parentheses) and return the
/// innermost operand.
fn strip_not_chain<'e, 'ast>(expr: &'e UnaryExpr<'ast>) -> (usize, &'e Expr<'ast>) {
    let mut depth = 1;
    let mut operand = expr.operand;
    loop {
        match operand {
            Expr::Unary(inner) if inner.op == UnaryOp::Not => {
                depth += 1;
                operand = inner.operand;
            }
            Expr::Paren(p) => operand = p.expr,
            _ => return (depth, operand),
        }
    }
}
