//! Binary operator compilation.
//!
//! Both operands are always evaluated, left first. Comparisons have no
//! dedicated opcode; they become a compare-and-branch that leaves 1 or 0:
//!
//! ```text
//! [left] [right]
//! JumpIfXx -> t
//! PushZero
//! Jump -> end
//! t:   PushOne
//! end:
//! ```

use pascalc_ast::{BinaryExpr, BinaryOp};
use pascalc_core::{CompilationError, DataType, PrimitiveKind};

use super::{ExprCompiler, Result};
use crate::bytecode::OpCode;

/// Compile a binary operation.
pub fn compile_binary(compiler: &mut ExprCompiler<'_, '_>, expr: &BinaryExpr<'_>) -> Result<DataType> {
    use BinaryOp::*;

    match expr.op {
        Or | And => {
            compiler.check(expr.left, &DataType::BOOLEAN, format_args!("left operand of '{}'", expr.op))?;
            compiler.check(expr.right, &DataType::BOOLEAN, format_args!("right operand of '{}'", expr.op))?;
            compiler.emitter().emit(if expr.op == Or { OpCode::BitOr } else { OpCode::BitAnd });
            Ok(DataType::BOOLEAN)
        }
        Add | Sub | Mul | Div | Mod => {
            compile_integer_operands(compiler, expr)?;
            compiler.emitter().emit(arithmetic_opcode(expr.op));
            Ok(DataType::INTEGER)
        }
        Equal | NotEqual => {
            let left = compiler.infer(expr.left)?;
            let right = compiler.infer(expr.right)?;
            let comparable = matches!(
                left.as_primitive(),
                Some(PrimitiveKind::Integer | PrimitiveKind::Boolean)
            );
            if !comparable || left != right {
                return Err(CompilationError::TypeMismatch {
                    message: format!("cannot compare {left} with {right} using '{}'", expr.op),
                    span: expr.span,
                });
            }
            emit_comparison(compiler, expr)
        }
        Less | LessEqual | Greater | GreaterEqual => {
            compile_integer_operands(compiler, expr)?;
            emit_comparison(compiler, expr)
        }
    }
}

fn compile_integer_operands(compiler: &mut ExprCompiler<'_, '_>, expr: &BinaryExpr<'_>) -> Result<()> {
    compiler.check(expr.left, &DataType::INTEGER, format_args!("left operand of '{}'", expr.op))?;
    compiler.check(expr.right, &DataType::INTEGER, format_args!("right operand of '{}'", expr.op))
}

fn emit_comparison(compiler: &mut ExprCompiler<'_, '_>, expr: &BinaryExpr<'_>) -> Result<DataType> {
    let is_true = compiler.emitter().new_label();
    let end = compiler.emitter().new_label();

    let emitter = compiler.emitter();
    emitter.emit_jump(comparison_opcode(expr.op), is_true);
    emitter.emit(OpCode::PushZero);
    emitter.emit_jump(OpCode::Jump, end);

    compiler.bind(is_true, expr.span)?;
    compiler.emitter().emit(OpCode::PushOne);
    compiler.bind(end, expr.span)?;
    Ok(DataType::BOOLEAN)
}

fn arithmetic_opcode(op: BinaryOp) -> OpCode {
    match op {
        BinaryOp::Sub => OpCode::Sub,
        BinaryOp::Mul => OpCode::Mul,
        BinaryOp::Div => OpCode::Div,
        BinaryOp::Mod => OpCode::Mod,
        _ => OpCode::Add,
    }
}

fn comparison_opcode(op: BinaryOp) -> OpCode {
    match op {
        BinaryOp::Equal => OpCode::JumpIfEq,
        BinaryOp::NotEqual => OpCode::JumpIfNe,
        BinaryOp::Less => OpCode::JumpIfLt,
        BinaryOp::LessEqual => OpCode::JumpIfLe,
        BinaryOp::Greater => OpCode::JumpIfGt,
        _ => OpCode::JumpIfGe,
    }
}
